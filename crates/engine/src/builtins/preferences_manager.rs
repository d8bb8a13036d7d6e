//! Application-wide preferences panel.

use std::rc::Rc;
use std::str::FromStr;

use umbra_components::{Capabilities, Component, ComponentError, ComponentHandle, ComponentProfile, HookResult, handle};
use umbra_layout::DockArea;
use umbra_settings::SETTINGS_SECTION;

use super::{ComponentFactoryReg, OwnedActions, bound, component_action};
use crate::{EngineContext, LogFormat};

pub(crate) const NAME: &str = "factory.preferences_manager";
pub(crate) const MANIFEST: &str = r#"name = "factory.preferences_manager"
title = "Preferences Manager"
category = "ui"
rank = 10
version = "1.0.0"
interface = "factory.preferences_manager"
description = "Application preferences and the panels other components contribute to them."
"#;

/// Dock widget of the panel.
pub const WIDGET: &str = "Preferences_Manager";

const VERBOSITY_KEY: &str = "verbosityLevel";
const FORMATTER_KEY: &str = "loggingFormatter";

inventory::submit! {
	ComponentFactoryReg { interface: NAME, build }
}

fn build(_profile: &ComponentProfile) -> Result<ComponentHandle<EngineContext>, ComponentError> {
	Ok(handle(PreferencesManager::default()))
}

/// Holds the `Settings` section preferences and hosts contributed sections.
#[derive(Default)]
pub struct PreferencesManager {
	context: Option<EngineContext>,
	actions: OwnedActions,
	sections: Vec<String>,
}

impl PreferencesManager {
	/// Persisted verbosity, 0 to 4.
	pub fn verbosity_level(&self) -> i64 {
		self.settings_value(|settings| settings.get_key(SETTINGS_SECTION, VERBOSITY_KEY).to_int())
			.unwrap_or(3)
	}

	/// Persists `level` (clamped to 0..=4) and applies it to the live filter.
	pub fn set_verbosity_level(&self, level: i64) -> bool {
		let level = level.clamp(0, 4);
		let Ok(shared) = bound(self.context.as_ref()) else {
			return false;
		};
		shared.settings().set_key(SETTINGS_SECTION, VERBOSITY_KEY, level);
		let applied = shared.logging().is_some_and(|logging| logging.set_verbosity(level));
		tracing::info!(level, applied, "preferences.verbosity");
		true
	}

	/// Persisted logging formatter name.
	pub fn logging_formatter(&self) -> String {
		self.settings_value(|settings| settings.get_key(SETTINGS_SECTION, FORMATTER_KEY).to_text())
			.unwrap_or_else(|| LogFormat::default().as_str().to_owned())
	}

	/// Persists a formatter; takes effect on the next start. False for unknown names.
	pub fn set_logging_formatter(&self, name: &str) -> bool {
		let Ok(format) = LogFormat::from_str(name) else {
			tracing::warn!(formatter = name, "preferences.formatter.unknown");
			return false;
		};
		let Ok(shared) = bound(self.context.as_ref()) else {
			return false;
		};
		shared.settings().set_key(SETTINGS_SECTION, FORMATTER_KEY, format.as_str());
		true
	}

	/// Whether switching layouts also restores window geometry.
	pub fn restore_geometry_on_layout_change(&self) -> bool {
		bound(self.context.as_ref()).is_ok_and(|shared| shared.layouts().restore_geometry_on_layout_change())
	}

	/// Sets the geometry preference.
	pub fn set_restore_geometry_on_layout_change(&self, enabled: bool) {
		if let Ok(shared) = bound(self.context.as_ref()) {
			shared.layouts().set_restore_geometry_on_layout_change(enabled);
		}
	}

	/// Resets the `Settings` section to the baked-in table.
	pub fn restore_defaults(&self) -> bool {
		let Ok(shared) = bound(self.context.as_ref()) else {
			return false;
		};
		restore_defaults(&shared);
		true
	}

	/// Adds a contributed preferences section; false if present.
	pub fn add_section(&mut self, title: &str) -> bool {
		if self.sections.iter().any(|section| section == title) {
			return false;
		}
		self.sections.push(title.to_owned());
		true
	}

	/// Removes a contributed section; false if unknown.
	pub fn remove_section(&mut self, title: &str) -> bool {
		let before = self.sections.len();
		self.sections.retain(|section| section != title);
		self.sections.len() != before
	}

	/// Contributed sections in insertion order.
	pub fn sections(&self) -> &[String] {
		&self.sections
	}

	fn settings_value<T>(&self, read: impl FnOnce(&umbra_settings::SettingsStore) -> Option<T>) -> Option<T> {
		let shared = bound(self.context.as_ref()).ok()?;
		read(shared.settings())
	}
}

fn restore_defaults(shared: &crate::EngineShared) {
	shared.settings().set_default_preferences();
	let level = shared.settings().get_key(SETTINGS_SECTION, VERBOSITY_KEY).to_int().unwrap_or(3);
	if let Some(logging) = shared.logging() {
		logging.set_verbosity(level);
	}
	shared.notify("Preferences restored to defaults!");
}

impl Component<EngineContext> for PreferencesManager {
	fn capabilities(&self) -> Capabilities {
		Capabilities::UI
	}

	fn deactivatable(&self) -> bool {
		false
	}

	fn activate(&mut self, context: &EngineContext) -> HookResult {
		self.context = Some(context.clone());
		Ok(())
	}

	fn deactivate(&mut self) -> HookResult {
		self.context = None;
		Ok(())
	}

	fn add_widget(&mut self) -> HookResult {
		let shared = bound(self.context.as_ref())?;
		shared.window().add_dock_widget(WIDGET, DockArea::Right);
		Ok(())
	}

	fn remove_widget(&mut self) -> HookResult {
		let shared = bound(self.context.as_ref())?;
		shared.window().remove_dock_widget(WIDGET);
		Ok(())
	}

	fn initialize_ui(&mut self) -> HookResult {
		let shared = bound(self.context.as_ref())?;
		let context = self.context.clone().ok_or_else(|| ComponentError::failed("component is not activated"))?;
		let mut registry = shared.actions();
		self.actions.register(
			&mut registry,
			&component_action(NAME, "Restore Defaults"),
			None,
			Rc::new(move || {
				if let Ok(shared) = context.shared() {
					restore_defaults(&shared);
				}
			}),
		)
	}

	fn uninitialize_ui(&mut self) -> HookResult {
		let shared = bound(self.context.as_ref())?;
		self.actions.unregister(&mut shared.actions());
		Ok(())
	}
}
