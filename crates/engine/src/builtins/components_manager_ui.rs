//! Panel listing components and driving their activation.

use std::cell::RefCell;
use std::rc::Rc;

use umbra_actions::Slot;
use umbra_components::{Capabilities, Component, ComponentError, ComponentHandle, ComponentProfile, ComponentState, HookResult, handle};
use umbra_layout::DockArea;

use super::{ComponentFactoryReg, OwnedActions, bound, component_action};
use crate::EngineContext;

pub(crate) const NAME: &str = "factory.components_manager_ui";
pub(crate) const MANIFEST: &str = r#"name = "factory.components_manager_ui"
title = "Components Manager Ui"
category = "ui"
rank = 20
version = "1.0.0"
requires = ["factory.preferences_manager"]
interface = "factory.components_manager_ui"
description = "Lists registered components and activates, deactivates or reloads them."
"#;

/// Dock widget of the panel.
pub const WIDGET: &str = "Components_Manager_Ui";

inventory::submit! {
	ComponentFactoryReg { interface: NAME, build }
}

fn build(_profile: &ComponentProfile) -> Result<ComponentHandle<EngineContext>, ComponentError> {
	Ok(handle(ComponentsManagerUi::default()))
}

/// One row of the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRow {
	/// Component name.
	pub name: String,
	/// Manifest title.
	pub title: String,
	/// Manifest version.
	pub version: String,
	/// Lifecycle state.
	pub state: ComponentState,
	/// Whether the user may deactivate it.
	pub deactivatable: bool,
}

/// Lists components and operates on the current selection.
#[derive(Default)]
pub struct ComponentsManagerUi {
	context: Option<EngineContext>,
	actions: OwnedActions,
	selection: Rc<RefCell<Vec<String>>>,
}

impl ComponentsManagerUi {
	/// Replaces the selection.
	pub fn select<I, S>(&self, names: I)
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		*self.selection.borrow_mut() = names.into_iter().map(Into::into).collect();
	}

	/// Selected component names.
	pub fn selection(&self) -> Vec<String> {
		self.selection.borrow().clone()
	}

	/// Snapshot of every registered component in activation order.
	///
	/// Empty while a lifecycle pass holds the manager.
	pub fn rows(&self) -> Vec<ComponentRow> {
		let Ok(shared) = bound(self.context.as_ref()) else {
			return Vec::new();
		};
		let Some(manager) = shared.components() else {
			return Vec::new();
		};
		manager
			.list_components()
			.iter()
			.filter_map(|name| {
				let profile = manager.profile(name)?;
				Some(ComponentRow {
					name: name.clone(),
					title: profile.title.clone(),
					version: profile.version.clone(),
					state: manager.state(name)?,
					deactivatable: manager.is_deactivatable(name),
				})
			})
			.collect()
	}

	/// Activates the selected components; true if all succeeded.
	pub fn activate_selected(&self) -> bool {
		self.context.as_ref().is_some_and(|context| for_each(&self.selection(), |name| activate_component(context, name)))
	}

	/// Deactivates the selected components; true if all succeeded.
	pub fn deactivate_selected(&self) -> bool {
		self.context.as_ref().is_some_and(|context| for_each(&self.selection(), |name| deactivate_component(context, name)))
	}

	/// Reloads the selected components; true if all succeeded.
	pub fn reload_selected(&self) -> bool {
		self.context.as_ref().is_some_and(|context| for_each(&self.selection(), |name| reload_component(context, name)))
	}
}

fn for_each(names: &[String], mut operation: impl FnMut(&str) -> bool) -> bool {
	if names.is_empty() {
		tracing::debug!("components_manager_ui.empty_selection");
		return false;
	}
	names.iter().fold(true, |all, name| operation(name) && all)
}

/// Activates `name` and reports the outcome as a notification.
pub fn activate_component(context: &EngineContext, name: &str) -> bool {
	let Ok(shared) = context.shared() else {
		return false;
	};
	let Some(mut manager) = shared.components() else {
		tracing::warn!(component = name, "components_manager_ui.busy");
		return false;
	};
	if manager.is_active(name) {
		drop(manager);
		shared.warnify(format!("'{name}' Component is already activated!"));
		return false;
	}
	let result = manager.activate_component(name, context);
	drop(manager);
	match result {
		Ok(()) => {
			shared.notify(format!("'{name}' Component has been activated!"));
			true
		}
		Err(error) => {
			shared.warnify(format!("'{name}' Component failed to activate: {error}"));
			false
		}
	}
}

/// Deactivates `name` and reports the outcome as a notification.
pub fn deactivate_component(context: &EngineContext, name: &str) -> bool {
	let Ok(shared) = context.shared() else {
		return false;
	};
	let Some(mut manager) = shared.components() else {
		tracing::warn!(component = name, "components_manager_ui.busy");
		return false;
	};
	if !manager.is_active(name) {
		drop(manager);
		shared.warnify(format!("'{name}' Component is already deactivated!"));
		return false;
	}
	let result = manager.deactivate_component(name);
	drop(manager);
	match result {
		Ok(()) => {
			shared.notify(format!("'{name}' Component has been deactivated!"));
			true
		}
		Err(ComponentError::Deactivation(_)) => {
			shared.warnify(format!("'{name}' Component cannot be deactivated!"));
			false
		}
		Err(error) => {
			shared.warnify(format!("'{name}' Component failed to deactivate: {error}"));
			false
		}
	}
}

/// Reloads `name` and its active dependents.
pub fn reload_component(context: &EngineContext, name: &str) -> bool {
	let Ok(shared) = context.shared() else {
		return false;
	};
	let Some(mut manager) = shared.components() else {
		tracing::warn!(component = name, "components_manager_ui.busy");
		return false;
	};
	let result = manager.reload_component(name, context);
	drop(manager);
	match result {
		Ok(()) => {
			shared.notify(format!("'{name}' Component has been reloaded!"));
			true
		}
		Err(error) => {
			shared.warnify(format!("'{name}' Component failed to reload: {error}"));
			false
		}
	}
}

impl Component<EngineContext> for ComponentsManagerUi {
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
		shared.window().add_dock_widget(WIDGET, DockArea::Left);
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
		let operations: [(&str, fn(&EngineContext, &str) -> bool); 3] = [
			("Activate Component(s)", activate_component),
			("Deactivate Component(s)", deactivate_component),
			("Reload Component(s)", reload_component),
		];
		let entries = operations
			.into_iter()
			.map(|(label, operation)| {
				let context = context.clone();
				let selection = Rc::clone(&self.selection);
				let slot: Slot = Rc::new(move || {
					let names = selection.borrow().clone();
					for_each(&names, |name| operation(&context, name));
				});
				(component_action(NAME, label), None, slot)
			})
			.collect();
		self.actions.register_all(&mut registry, entries)
	}

	fn uninitialize_ui(&mut self) -> HookResult {
		let shared = bound(self.context.as_ref())?;
		self.actions.unregister(&mut shared.actions());
		Ok(())
	}
}
