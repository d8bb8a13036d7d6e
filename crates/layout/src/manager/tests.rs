use std::sync::Arc;

use pretty_assertions::assert_eq;
use umbra_settings::{LAYOUTS_SECTION, SettingsStore};

use super::*;
use crate::{DockArea, HeadlessWindow};

fn manager() -> LayoutManager {
	let mut manager = LayoutManager::new(Arc::new(SettingsStore::in_memory()));
	for layout in default_layouts() {
		manager.register_layout(layout).unwrap();
	}
	manager
}

#[test]
fn default_layouts_carry_restore_shortcuts() {
	let shortcuts: Vec<_> = default_layouts()
		.into_iter()
		.map(|layout| (layout.identity, layout.shortcut.unwrap()))
		.collect();
	assert_eq!(shortcuts[0], ("one".to_owned(), "1".to_owned()));
	assert_eq!(shortcuts[5], ("developmentCentric".to_owned(), "9".to_owned()));
	assert_eq!(shortcuts[6], ("preferencesCentric".to_owned(), "0".to_owned()));
}

#[test]
fn duplicate_registration_is_rejected() {
	let mut manager = manager();
	let err = manager.register_layout(Layout::new("one", None)).unwrap_err();
	assert_eq!(err, LayoutError::Registration("one".into()));
	assert!(manager.register_layout(Layout::new(STARTUP_LAYOUT, None)).is_err());
}

#[test]
fn unregister_missing_layout_fails() {
	let mut manager = manager();
	assert!(manager.unregister_layout("two").is_ok());
	assert!(!manager.is_layout_registered("two"));
	assert_eq!(manager.unregister_layout("two").unwrap_err(), LayoutError::Missing("two".into()));
}

#[test]
fn store_writes_all_snapshot_keys() {
	let mut manager = manager();
	let mut window = HeadlessWindow::new();
	window.set_active_category(2);
	window.set_central_widget_visible(false);

	assert!(manager.store_layout("three", &window).unwrap());

	let keys = manager.settings.keys(LAYOUTS_SECTION);
	for suffix in ["geometry", "windowState", "centralWidget", "activeLabel"] {
		assert!(keys.contains(&format!("three_{suffix}")), "missing three_{suffix}");
	}
	assert_eq!(manager.settings.get_key(LAYOUTS_SECTION, "three_activeLabel").to_int(), Some(2));
	assert_eq!(manager.current_layout(), Some("three"));
	assert_eq!(manager.take_events(), vec![LayoutEvent::Stored("three".into())]);
}

#[test]
fn unknown_layout_is_missing() {
	let mut manager = manager();
	let mut window = HeadlessWindow::new();
	assert_eq!(manager.store_layout("nope", &window).unwrap_err(), LayoutError::Missing("nope".into()));
	assert!(manager.restore_layout("nope", &mut window, &[]).is_err());
}

#[test]
fn restoring_unstored_layout_is_a_no_op() {
	let mut manager = manager();
	let mut window = HeadlessWindow::new();
	window.add_dock_widget("log", DockArea::Bottom);
	window.set_active_category(3);
	let before = window.clone();

	assert!(!manager.restore_layout("four", &mut window, &["log".to_owned()]).unwrap());
	assert_eq!(window, before);
	assert!(manager.take_events().is_empty());
}

#[test]
fn restore_hides_widgets_not_in_snapshot_state() {
	let mut manager = manager();
	manager.set_visible_by_default(vec!["console".to_owned()]);
	let mut window = HeadlessWindow::new();
	window.add_dock_widget("console", DockArea::Bottom);
	manager.store_layout("one", &window).unwrap();

	// Docks added after the snapshot have no saved state and stay hidden.
	window.add_dock_widget("browser", DockArea::Left);
	let ui = vec!["console".to_owned(), "browser".to_owned()];
	assert!(manager.restore_layout("one", &mut window, &ui).unwrap());

	assert!(window.is_widget_visible("console"));
	assert!(!window.is_widget_visible("browser"));
}

#[test]
fn geometry_preference_round_trips() {
	let manager = manager();
	assert!(!manager.restore_geometry_on_layout_change());
	manager.set_restore_geometry_on_layout_change(true);
	assert!(manager.restore_geometry_on_layout_change());
}

#[test]
fn undrained_events_keep_only_the_newest() {
	let mut manager = manager();
	let window = HeadlessWindow::new();
	for _ in 0..PENDING_EVENTS {
		manager.store_layout("one", &window).unwrap();
	}
	manager.store_layout("two", &window).unwrap();

	let events = manager.take_events();
	assert_eq!(events.len(), PENDING_EVENTS);
	assert_eq!(events.last(), Some(&LayoutEvent::Stored("two".into())));
	assert!(manager.take_events().is_empty());
}
