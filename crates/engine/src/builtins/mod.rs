//! Components shipped with the engine.
//!
//! Factories register through `inventory`, so downstream crates can add their
//! own with [`inventory::submit!`] and a [`ComponentFactoryReg`]. Manifests of
//! the built-ins are written into the user component directory on boot when
//! missing.

mod components_manager_ui;
mod preferences_manager;
mod script_editor;
mod tcp_client;
mod tcp_server;

use std::fs;
use std::path::Path;
use std::rc::Rc;

use umbra_actions::{ActionsRegistry, Slot};
use umbra_components::{ComponentError, ComponentHandle, ComponentProfile, FactoryRegistry, HookResult, MANIFEST_FILE};

pub use self::components_manager_ui::{ComponentRow, ComponentsManagerUi};
pub use self::preferences_manager::PreferencesManager;
pub use self::script_editor::{ActionEvaluator, ConsoleEntry, Evaluation, Evaluator, ScriptEditor};
pub use self::tcp_client::TcpClientComponent;
pub use self::tcp_server::TcpServerComponent;
use crate::{EngineContext, EngineError, EngineShared, Result};

/// Components whose failure aborts boot.
pub const REQUISITE_COMPONENTS: &[&str] = &[preferences_manager::NAME, components_manager_ui::NAME];

/// A component factory collected at link time.
pub struct ComponentFactoryReg {
	/// Manifest `interface` value served by this factory.
	pub interface: &'static str,
	/// Builds the live interface.
	pub build: fn(&ComponentProfile) -> std::result::Result<ComponentHandle<EngineContext>, ComponentError>,
}

inventory::collect!(ComponentFactoryReg);

/// Every factory submitted through `inventory`.
pub fn registered_factories() -> FactoryRegistry<EngineContext> {
	let mut factories = FactoryRegistry::new();
	for reg in inventory::iter::<ComponentFactoryReg> {
		let build = reg.build;
		factories.register(reg.interface, move |profile: &ComponentProfile| build(profile));
	}
	factories
}

const BUILTIN_MANIFESTS: &[(&str, &str)] = &[
	(preferences_manager::NAME, preferences_manager::MANIFEST),
	(components_manager_ui::NAME, components_manager_ui::MANIFEST),
	(script_editor::NAME, script_editor::MANIFEST),
	(tcp_server::NAME, tcp_server::MANIFEST),
	(tcp_client::NAME, tcp_client::MANIFEST),
];

/// Writes manifests of the built-in components under `dir` unless present.
pub fn install_builtin_components(dir: &Path) -> Result<usize> {
	let mut written = 0;
	for (name, manifest) in BUILTIN_MANIFESTS {
		let component_dir = dir.join(name);
		let path = component_dir.join(MANIFEST_FILE);
		if path.is_file() {
			continue;
		}
		fs::create_dir_all(&component_dir)
			.and_then(|()| fs::write(&path, manifest))
			.map_err(|error| EngineError::Directory { path: component_dir, error })?;
		written += 1;
	}
	if written > 0 {
		tracing::info!(written, dir = %dir.display(), "engine.builtins.installed");
	}
	Ok(written)
}

/// Full path of an action owned by `component`.
pub fn component_action(component: &str, label: &str) -> String {
	format!("Actions|Umbra|Components|{component}|{label}")
}

/// Resolves the engine of an activated component.
fn bound(context: Option<&EngineContext>) -> std::result::Result<Rc<EngineShared>, ComponentError> {
	context
		.ok_or_else(|| ComponentError::failed("component is not activated"))?
		.shared()
}

/// Actions registered by one component, with the slots kept alive for them.
#[derive(Default)]
struct OwnedActions {
	paths: Vec<String>,
	slots: Vec<Slot>,
}

impl OwnedActions {
	/// Registers every entry, or none: a failure unregisters the ones
	/// already added by this call's owner.
	fn register_all(&mut self, registry: &mut ActionsRegistry, entries: Vec<(String, Option<&str>, Slot)>) -> HookResult {
		for (path, shortcut, slot) in entries {
			if let Err(error) = self.register(registry, &path, shortcut, slot) {
				self.unregister(registry);
				return Err(error);
			}
		}
		Ok(())
	}

	fn register(&mut self, registry: &mut ActionsRegistry, path: &str, shortcut: Option<&str>, slot: Slot) -> HookResult {
		let action = registry
			.register_action(path, shortcut, Some(&slot))
			.map_err(|error| ComponentError::failed(error.to_string()))?;
		self.paths.push(action.path().to_owned());
		self.slots.push(slot);
		Ok(())
	}

	fn unregister(&mut self, registry: &mut ActionsRegistry) {
		for path in self.paths.drain(..) {
			if let Err(error) = registry.unregister_action(&path) {
				tracing::warn!(action = %path, %error, "engine.builtins.unregister_failed");
			}
		}
		self.slots.clear();
	}
}

#[cfg(test)]
mod tests;
