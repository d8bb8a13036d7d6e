use std::sync::Arc;

use pretty_assertions::assert_eq;
use umbra_layout::{DockArea, Geometry, HeadlessWindow, LayoutManager, Window, default_layouts};
use umbra_settings::SettingsStore;

fn setup() -> (LayoutManager, HeadlessWindow) {
	let mut manager = LayoutManager::new(Arc::new(SettingsStore::in_memory()));
	for layout in default_layouts() {
		manager.register_layout(layout).unwrap();
	}
	let mut window = HeadlessWindow::new();
	window.add_dock_widget("D", DockArea::Right);
	window.add_dock_widget("E", DockArea::Left);
	(manager, window)
}

#[test]
fn restoring_a_stored_layout_brings_back_hidden_docks() {
	let (mut manager, mut window) = setup();
	manager.store_layout("one", &window).unwrap();

	window.hide_widget("D");
	assert!(!window.is_widget_visible("D"));

	let docks = window.dock_widgets();
	assert!(manager.restore_layout("one", &mut window, &docks).unwrap());
	assert!(window.is_widget_visible("D"));
	assert!(window.is_widget_visible("E"));
}

#[test]
fn restore_then_store_is_idempotent() {
	let (mut manager, mut window) = setup();
	window.hide_widget("E");
	window.raise_widget("D");
	window.set_active_category(1);
	manager.store_layout("two", &window).unwrap();
	let first = (window.save_state(), window.save_geometry());

	let docks = window.dock_widgets();
	manager.restore_layout("two", &mut window, &docks).unwrap();
	manager.store_layout("two", &window).unwrap();

	assert_eq!((window.save_state(), window.save_geometry()), first);
	assert_eq!(window.active_category(), 1);
}

#[test]
fn dock_areas_follow_the_snapshot() {
	let (mut manager, mut window) = setup();
	manager.store_layout("five", &window).unwrap();
	window.move_dock_widget("D", DockArea::Top);

	let docks = window.dock_widgets();
	manager.restore_layout("five", &mut window, &docks).unwrap();
	assert_eq!(window.dock_area("D"), Some(DockArea::Right));
}

#[test]
fn layout_change_leaves_geometry_unless_requested() {
	let (mut manager, mut window) = setup();
	manager.store_layout("one", &window).unwrap();

	let moved = Geometry { x: 40, y: 30, width: 900, height: 600 };
	window.set_geometry(moved);
	let docks = window.dock_widgets();
	manager.restore_layout("one", &mut window, &docks).unwrap();
	assert_eq!(window.geometry(), moved);

	manager.set_restore_geometry_on_layout_change(true);
	manager.restore_layout("one", &mut window, &docks).unwrap();
	assert_eq!(window.geometry(), Geometry::default());
}

#[test]
fn startup_layout_always_restores_geometry() {
	let (mut manager, mut window) = setup();
	assert!(!manager.restore_geometry_on_layout_change());
	manager.store_startup_layout(&window).unwrap();

	window.set_geometry(Geometry { x: 5, y: 5, width: 320, height: 240 });
	window.hide_widget("D");
	let docks = window.dock_widgets();
	assert!(manager.restore_startup_layout(&mut window, &docks).unwrap());

	assert_eq!(window.geometry(), Geometry::default());
	assert!(window.is_widget_visible("D"));
}
