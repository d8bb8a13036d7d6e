//! Named layout snapshots persisted in the settings store.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use umbra_settings::{LAYOUTS_SECTION, SETTINGS_SECTION, SettingsStore};

use crate::{LayoutError, Result, Window};

/// Reserved layout saved at shutdown and restored at boot.
pub const STARTUP_LAYOUT: &str = "startup";

const RESTORE_GEOMETRY_KEY: &str = "restoreGeometryOnLayoutChange";

/// A registered layout slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
	/// Display name.
	pub name: String,
	/// Identity used as the settings key prefix.
	pub identity: String,
	/// Shortcut restoring the layout.
	pub shortcut: Option<String>,
}

impl Layout {
	/// Creates a layout whose display name is its identity.
	pub fn new(identity: impl Into<String>, shortcut: Option<&str>) -> Self {
		let identity = identity.into();
		Self {
			name: identity.clone(),
			identity,
			shortcut: shortcut.map(str::to_owned),
		}
	}
}

/// The stock layout slots: five numbered user slots and two category layouts.
pub fn default_layouts() -> Vec<Layout> {
	vec![
		Layout::new("one", Some("1")),
		Layout::new("two", Some("2")),
		Layout::new("three", Some("3")),
		Layout::new("four", Some("4")),
		Layout::new("five", Some("5")),
		Layout::new("developmentCentric", Some("9")),
		Layout::new("preferencesCentric", Some("0")),
	]
}

/// Events kept for [`LayoutManager::take_events`]; the oldest is dropped
/// beyond this.
pub const PENDING_EVENTS: usize = 64;

/// Notification emitted after a snapshot operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutEvent {
	/// A layout was stored.
	Stored(String),
	/// A layout was restored.
	Restored(String),
}

/// Captures and restores named window-state snapshots.
///
/// Snapshot keys live in the `Layouts` section as `<name>_geometry`,
/// `<name>_windowState`, `<name>_centralWidget` and `<name>_activeLabel`.
pub struct LayoutManager {
	settings: Arc<SettingsStore>,
	layouts: BTreeMap<String, Layout>,
	current_layout: Option<String>,
	visible_by_default: Vec<String>,
	events: VecDeque<LayoutEvent>,
}

impl LayoutManager {
	/// Creates a manager writing to `settings`.
	pub fn new(settings: Arc<SettingsStore>) -> Self {
		Self {
			settings,
			layouts: BTreeMap::new(),
			current_layout: None,
			visible_by_default: Vec::new(),
			events: VecDeque::new(),
		}
	}

	/// Registers a layout slot.
	pub fn register_layout(&mut self, layout: Layout) -> Result<()> {
		if layout.identity == STARTUP_LAYOUT || self.layouts.contains_key(&layout.identity) {
			return Err(LayoutError::Registration(layout.identity));
		}
		tracing::debug!(layout = %layout.identity, "layout.register");
		self.layouts.insert(layout.identity.clone(), layout);
		Ok(())
	}

	/// Removes a layout slot. Stored snapshots are kept.
	pub fn unregister_layout(&mut self, identity: &str) -> Result<Layout> {
		self.layouts.remove(identity).ok_or_else(|| LayoutError::Missing(identity.to_owned()))
	}

	/// Returns true when `identity` is registered.
	pub fn is_layout_registered(&self, identity: &str) -> bool {
		self.layouts.contains_key(identity)
	}

	/// Registered layouts sorted by identity.
	pub fn list_layouts(&self) -> Vec<&Layout> {
		self.layouts.values().collect()
	}

	/// Last stored or restored layout.
	pub fn current_layout(&self) -> Option<&str> {
		self.current_layout.as_deref()
	}

	/// Widgets left visible when a layout is restored.
	pub fn set_visible_by_default(&mut self, widgets: Vec<String>) {
		self.visible_by_default = widgets;
	}

	/// Whether geometry is applied on every layout change.
	pub fn restore_geometry_on_layout_change(&self) -> bool {
		self.settings.get_key(SETTINGS_SECTION, RESTORE_GEOMETRY_KEY).to_bool().unwrap_or(false)
	}

	/// Sets the geometry preference.
	pub fn set_restore_geometry_on_layout_change(&self, enabled: bool) {
		self.settings.set_key(SETTINGS_SECTION, RESTORE_GEOMETRY_KEY, enabled);
	}

	/// Returns true when a snapshot for `identity` has been stored.
	pub fn has_snapshot(&self, identity: &str) -> bool {
		self.settings.key_exists(LAYOUTS_SECTION, &key(identity, "windowState"))
	}

	/// Captures `window` under `identity`.
	pub fn store_layout(&mut self, identity: &str, window: &dyn Window) -> Result<bool> {
		self.ensure_known(identity)?;
		tracing::debug!(layout = identity, "layout.store");

		let settings = &self.settings;
		settings.set_key(LAYOUTS_SECTION, &key(identity, "geometry"), window.save_geometry());
		settings.set_key(LAYOUTS_SECTION, &key(identity, "windowState"), window.save_state());
		settings.set_key(LAYOUTS_SECTION, &key(identity, "centralWidget"), window.is_central_widget_visible());
		settings.set_key(LAYOUTS_SECTION, &key(identity, "activeLabel"), window.active_category());

		self.current_layout = Some(identity.to_owned());
		self.push_event(LayoutEvent::Stored(identity.to_owned()));
		Ok(true)
	}

	/// Applies the snapshot stored under `identity` to `window`.
	///
	/// Widgets in `ui_widgets` that are not visible by default are hidden
	/// first; the stored window state then re-shows whatever it recorded.
	/// Geometry is applied only when the user preference asks for it.
	/// Returns false when nothing was stored under `identity` yet.
	pub fn restore_layout(&mut self, identity: &str, window: &mut dyn Window, ui_widgets: &[String]) -> Result<bool> {
		let force_geometry = self.restore_geometry_on_layout_change();
		self.restore(identity, window, ui_widgets, force_geometry)
	}

	/// Stores the reserved startup layout.
	pub fn store_startup_layout(&mut self, window: &dyn Window) -> Result<bool> {
		self.store_layout(STARTUP_LAYOUT, window)
	}

	/// Restores the reserved startup layout, geometry included regardless
	/// of the layout-change preference.
	pub fn restore_startup_layout(&mut self, window: &mut dyn Window, ui_widgets: &[String]) -> Result<bool> {
		self.restore(STARTUP_LAYOUT, window, ui_widgets, true)
	}

	/// Drains pending layout events.
	pub fn take_events(&mut self) -> Vec<LayoutEvent> {
		self.events.drain(..).collect()
	}

	fn restore(&mut self, identity: &str, window: &mut dyn Window, ui_widgets: &[String], geometry: bool) -> Result<bool> {
		self.ensure_known(identity)?;
		let settings = &self.settings;
		let Some(state) = settings.get_key(LAYOUTS_SECTION, &key(identity, "windowState")).to_bytes() else {
			tracing::debug!(layout = identity, "layout.restore.no_snapshot");
			return Ok(false);
		};
		tracing::debug!(layout = identity, geometry, "layout.restore");

		for widget in ui_widgets.iter().filter(|widget| !self.visible_by_default.contains(widget)) {
			window.hide_widget(widget);
		}
		if !window.restore_state(&state) {
			tracing::warn!(layout = identity, "layout.restore.state_rejected");
		}
		if geometry
			&& let Some(blob) = settings.get_key(LAYOUTS_SECTION, &key(identity, "geometry")).to_bytes()
			&& !window.restore_geometry(&blob)
		{
			tracing::warn!(layout = identity, "layout.restore.geometry_rejected");
		}

		let central = settings.get_key(LAYOUTS_SECTION, &key(identity, "centralWidget")).to_bool().unwrap_or(true);
		window.set_central_widget_visible(central);
		let active = settings.get_key(LAYOUTS_SECTION, &key(identity, "activeLabel")).to_int().unwrap_or(0);
		window.set_active_category(active);

		self.current_layout = Some(identity.to_owned());
		self.push_event(LayoutEvent::Restored(identity.to_owned()));
		Ok(true)
	}

	fn push_event(&mut self, event: LayoutEvent) {
		if self.events.len() == PENDING_EVENTS {
			self.events.pop_front();
		}
		self.events.push_back(event);
	}

	fn ensure_known(&self, identity: &str) -> Result<()> {
		if identity == STARTUP_LAYOUT || self.layouts.contains_key(identity) {
			Ok(())
		} else {
			Err(LayoutError::Missing(identity.to_owned()))
		}
	}
}

impl std::fmt::Debug for LayoutManager {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LayoutManager")
			.field("layouts", &self.layouts.keys().collect::<Vec<_>>())
			.field("current_layout", &self.current_layout)
			.finish()
	}
}

fn key(identity: &str, suffix: &str) -> String {
	format!("{identity}_{suffix}")
}

#[cfg(test)]
mod tests;
