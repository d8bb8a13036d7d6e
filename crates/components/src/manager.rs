//! Lifecycle state machine over discovered components.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use umbra_settings::{SETTINGS_SECTION, SettingsStore};

use crate::{
	Capabilities, Category, ComponentDirectory, ComponentError, ComponentHandle, ComponentProfile, FactoryRegistry, HookResult,
	Result, activation_order, dependents, discover,
};

/// Settings key holding the comma-joined names of user-deactivated components.
pub const DEACTIVATED_COMPONENTS_KEY: &str = "deactivatedComponents";

/// Lifecycle state of one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentState {
	/// Manifest loaded; no interface yet.
	Discovered,
	/// Interface built but never activated.
	Instantiated,
	/// `activate` ran; init hooks pending.
	Activated,
	/// Fully initialized.
	Running,
	/// Torn down after running.
	Deactivated,
}

impl ComponentState {
	/// Lowercase name.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Discovered => "discovered",
			Self::Instantiated => "instantiated",
			Self::Activated => "activated",
			Self::Running => "running",
			Self::Deactivated => "deactivated",
		}
	}

	/// Mirror of the interface's `activated` flag.
	pub const fn is_active(self) -> bool {
		matches!(self, Self::Activated | Self::Running)
	}
}

impl fmt::Display for ComponentState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Outcome of the bulk activation pass.
#[derive(Debug, Default)]
pub struct ActivationReport {
	/// Components activated, in order.
	pub activated: Vec<String>,
	/// Components skipped because the user deactivated them.
	pub skipped: Vec<String>,
	/// Optional components that failed; each was rolled back.
	pub failed: Vec<(String, ComponentError)>,
}

struct Entry<C> {
	profile: ComponentProfile,
	state: ComponentState,
	interface: Option<ComponentHandle<C>>,
}

/// Owns every component profile and live interface.
pub struct ComponentManager<C: 'static> {
	search_paths: Vec<PathBuf>,
	settings: Arc<SettingsStore>,
	factories: FactoryRegistry<C>,
	entries: BTreeMap<String, Entry<C>>,
	order: Vec<String>,
	directory: ComponentDirectory<C>,
	user_deactivated: BTreeSet<String>,
}

impl<C: 'static> ComponentManager<C> {
	/// Creates a manager. The user-deactivated set is read from `settings`.
	pub fn new(search_paths: Vec<PathBuf>, settings: Arc<SettingsStore>, factories: FactoryRegistry<C>) -> Self {
		let user_deactivated = settings
			.get_key(SETTINGS_SECTION, DEACTIVATED_COMPONENTS_KEY)
			.to_text()
			.unwrap_or_default()
			.split(',')
			.map(str::trim)
			.filter(|name| !name.is_empty())
			.map(str::to_owned)
			.collect();
		Self {
			search_paths,
			settings,
			factories,
			entries: BTreeMap::new(),
			order: Vec::new(),
			directory: ComponentDirectory::default(),
			user_deactivated,
		}
	}

	/// Directories scanned by [`ComponentManager::register_components`].
	pub fn search_paths(&self) -> &[PathBuf] {
		&self.search_paths
	}

	/// Mutable access to the interface constructors.
	pub fn factories_mut(&mut self) -> &mut FactoryRegistry<C> {
		&mut self.factories
	}

	/// Shared sibling lookup.
	pub fn directory(&self) -> ComponentDirectory<C> {
		self.directory.clone()
	}

	/// Discovers manifests under the search paths and registers them.
	pub fn register_components(&mut self) -> Result<usize> {
		let profiles = discover(&self.search_paths)?;
		self.register_profiles(profiles)
	}

	/// Registers `profiles` as discovered components.
	///
	/// The whole batch is rejected on duplicate names, unresolved
	/// requirements or cycles.
	pub fn register_profiles(&mut self, profiles: impl IntoIterator<Item = ComponentProfile>) -> Result<usize> {
		let mut all: BTreeMap<String, ComponentProfile> = self
			.entries
			.iter()
			.map(|(name, entry)| (name.clone(), entry.profile.clone()))
			.collect();
		let mut added = Vec::new();
		for profile in profiles {
			if all.contains_key(&profile.name) {
				return Err(ComponentError::Exists(profile.name));
			}
			added.push(profile.name.clone());
			all.insert(profile.name.clone(), profile);
		}
		let order = activation_order(&all)?;

		for name in &added {
			if let Some(profile) = all.remove(name) {
				tracing::debug!(component = %name, path = %profile.path.display(), "components.register");
				self.entries.insert(name.clone(), Entry {
					profile,
					state: ComponentState::Discovered,
					interface: None,
				});
			}
		}
		self.order = order;
		Ok(added.len())
	}

	/// Component names in activation order.
	pub fn list_components(&self) -> &[String] {
		&self.order
	}

	/// Components transitively requiring `name`, in activation order.
	pub fn list_dependents(&self, name: &str) -> Vec<String> {
		let profiles: BTreeMap<String, ComponentProfile> = self
			.entries
			.iter()
			.map(|(name, entry)| (name.clone(), entry.profile.clone()))
			.collect();
		dependents(&profiles, &self.order, name)
	}

	/// Profile of `name`.
	pub fn profile(&self, name: &str) -> Option<&ComponentProfile> {
		self.entries.get(name).map(|entry| &entry.profile)
	}

	/// Lifecycle state of `name`.
	pub fn state(&self, name: &str) -> Option<ComponentState> {
		self.entries.get(name).map(|entry| entry.state)
	}

	/// Returns true when `name` is activated.
	pub fn is_active(&self, name: &str) -> bool {
		self.state(name).is_some_and(ComponentState::is_active)
	}

	/// Whether `name` may be deactivated; false when not instantiated.
	pub fn is_deactivatable(&self, name: &str) -> bool {
		self.interface(name).is_some_and(|handle| handle.try_borrow().is_ok_and(|component| component.deactivatable()))
	}

	/// Live interface of `name`.
	pub fn interface(&self, name: &str) -> Option<ComponentHandle<C>> {
		self.entries.get(name).and_then(|entry| entry.interface.clone())
	}

	/// Components the user deactivated, persisted across runs.
	pub fn deactivated_components(&self) -> Vec<String> {
		self.user_deactivated.iter().cloned().collect()
	}

	/// Builds the interface of `name`.
	pub fn instantiate_component(&mut self, name: &str) -> Result<()> {
		let entry = self.entries.get_mut(name).ok_or_else(|| ComponentError::Missing(name.to_owned()))?;
		if entry.state != ComponentState::Discovered {
			return Err(state_error(name, "instantiate", entry.state));
		}
		let handle = self.factories.build(&entry.profile)?;
		check_capabilities(&entry.profile, &handle)?;

		tracing::debug!(component = name, "components.instantiate");
		self.directory.insert(name, handle.clone());
		entry.interface = Some(handle);
		entry.state = ComponentState::Instantiated;
		Ok(())
	}

	/// Instantiates every discovered component in activation order.
	///
	/// `on_profile` sees each profile first. Failures leave that component
	/// discovered and are returned.
	pub fn instantiate_components(&mut self, mut on_profile: impl FnMut(&ComponentProfile)) -> Vec<(String, ComponentError)> {
		let mut failed = Vec::new();
		for name in self.order.clone() {
			let Some(entry) = self.entries.get(&name) else {
				continue;
			};
			if entry.state != ComponentState::Discovered {
				continue;
			}
			on_profile(&entry.profile);
			if let Err(error) = self.instantiate_component(&name) {
				tracing::warn!(component = %name, %error, "components.instantiate.failed");
				failed.push((name, error));
			}
		}
		failed
	}

	/// Activates `name` and runs its category's init hooks.
	///
	/// On failure the hooks that ran are unwound and the component returns
	/// to its previous state.
	pub fn activate_component(&mut self, name: &str, context: &C) -> Result<()> {
		let entry = self.entries.get(name).ok_or_else(|| ComponentError::Missing(name.to_owned()))?;
		let previous = entry.state;
		if !matches!(previous, ComponentState::Instantiated | ComponentState::Deactivated) {
			return Err(state_error(name, "activate", previous));
		}
		if let Some(requirement) = entry.profile.requires.iter().find(|req| !self.is_active(req)) {
			return Err(ComponentError::Requirement {
				component: name.to_owned(),
				requirement: requirement.clone(),
			});
		}
		let category = entry.profile.category;
		let handle = entry.interface.clone().ok_or_else(|| ComponentError::Missing(name.to_owned()))?;

		tracing::debug!(component = name, "components.activate");
		run_hook(name, "activate", || handle.borrow_mut().activate(context))?;
		self.set_state(name, ComponentState::Activated);

		let initialized = match category {
			Category::Default => run_hook(name, "initialize", || handle.borrow_mut().initialize()),
			Category::Ui => run_hook(name, "add_widget", || handle.borrow_mut().add_widget()).and_then(|()| {
				run_hook(name, "initialize_ui", || handle.borrow_mut().initialize_ui()).inspect_err(|_| {
					unwind(name, "remove_widget", handle.borrow_mut().remove_widget());
				})
			}),
		};
		if let Err(error) = initialized {
			unwind(name, "deactivate", handle.borrow_mut().deactivate());
			self.set_state(name, previous);
			return Err(error);
		}

		self.set_state(name, ComponentState::Running);
		if self.user_deactivated.remove(name) {
			self.store_deactivated_components();
		}
		tracing::info!(component = name, "components.activated");
		Ok(())
	}

	/// Deactivates `name`, running the uninit hooks in reverse.
	///
	/// Refused with [`ComponentError::Deactivation`] for non-deactivatable
	/// components. When a hook fails the component stays active.
	pub fn deactivate_component(&mut self, name: &str) -> Result<()> {
		let handle = self.running_interface(name, "deactivate")?;
		if !handle.borrow().deactivatable() {
			tracing::warn!(component = name, "components.deactivate.refused");
			return Err(ComponentError::Deactivation(name.to_owned()));
		}
		self.shut_down(name, &handle)?;

		self.user_deactivated.insert(name.to_owned());
		self.store_deactivated_components();
		tracing::info!(component = name, "components.deactivated");
		Ok(())
	}

	/// Reloads `name` from disk.
	///
	/// Active dependents are deactivated in reverse order first and
	/// reactivated afterwards. The reload is refused when `name` or any
	/// dependent is not deactivatable. If rebuilding fails the component is
	/// left deactivated.
	pub fn reload_component(&mut self, name: &str, context: &C) -> Result<()> {
		let entry = self.entries.get(name).ok_or_else(|| ComponentError::Missing(name.to_owned()))?;
		if entry.state == ComponentState::Discovered {
			return Err(state_error(name, "reload", entry.state));
		}
		let dependents = self.list_dependents(name);
		let blocked = std::iter::once(name)
			.chain(dependents.iter().map(String::as_str))
			.find(|candidate| self.is_active(candidate) && !self.is_deactivatable(candidate));
		if let Some(blocked) = blocked {
			return Err(ComponentError::Reload {
				component: name.to_owned(),
				reason: format!("'{blocked}' cannot be deactivated"),
			});
		}

		tracing::debug!(component = name, ?dependents, "components.reload");
		let mut cycle: Vec<String> = dependents.into_iter().rev().collect();
		cycle.push(name.to_owned());
		let mut reactivate = Vec::new();
		for target in &cycle {
			if self.is_active(target) {
				let handle = self.running_interface(target, "deactivate")?;
				self.shut_down(target, &handle)?;
				reactivate.push(target.clone());
			}
		}

		let rebuilt = self.rebuild(name).map_err(|error| ComponentError::Reload {
			component: name.to_owned(),
			reason: error.to_string(),
		});
		if let Err(error) = rebuilt {
			tracing::error!(component = name, %error, "components.reload.failed");
			return Err(error);
		}

		let mut first_error = None;
		for target in reactivate.iter().rev() {
			if let Err(error) = self.activate_component(target, context) {
				tracing::warn!(component = %target, %error, "components.reload.reactivate_failed");
				first_error.get_or_insert(error);
			}
		}
		match first_error {
			Some(error) => Err(error),
			None => {
				tracing::info!(component = name, "components.reloaded");
				Ok(())
			}
		}
	}

	/// Bulk activation at boot.
	///
	/// `requisites` go first and any failure among them is returned as
	/// fatal. The remaining instantiated components follow in activation
	/// order, skipping those the user deactivated; their failures are
	/// collected in the report.
	pub fn activate_components(&mut self, context: &C, requisites: &[&str]) -> Result<ActivationReport> {
		let mut report = ActivationReport::default();
		for name in self.order.clone().iter().filter(|name| requisites.contains(&name.as_str())) {
			self.activate_component(name, context)?;
			report.activated.push(name.clone());
		}
		for name in self.order.clone() {
			if requisites.contains(&name.as_str()) || self.state(&name) != Some(ComponentState::Instantiated) {
				continue;
			}
			if self.user_deactivated.contains(&name) {
				tracing::debug!(component = %name, "components.activate.skipped");
				report.skipped.push(name);
				continue;
			}
			match self.activate_component(&name, context) {
				Ok(()) => report.activated.push(name),
				Err(error) => {
					tracing::warn!(component = %name, %error, "components.activate.failed");
					report.failed.push((name, error));
				}
			}
		}
		Ok(report)
	}

	/// Runs `on_startup` on every running component that declares it.
	///
	/// A requisite failure is returned as fatal; other failures are collected.
	pub fn startup_components(&mut self, requisites: &[&str]) -> Result<Vec<(String, ComponentError)>> {
		let mut failed = Vec::new();
		for (name, handle) in self.running_with(Capabilities::ON_STARTUP) {
			if let Err(error) = run_hook(&name, "on_startup", || handle.borrow_mut().on_startup()) {
				if requisites.contains(&name.as_str()) {
					return Err(error);
				}
				tracing::warn!(component = %name, %error, "components.startup.failed");
				failed.push((name, error));
			}
		}
		Ok(failed)
	}

	/// Runs `on_close` on every running component that declares it.
	///
	/// Returns the first component that vetoed; all components are asked.
	pub fn close_components(&mut self) -> Option<String> {
		let mut veto = None;
		for (name, handle) in self.running_with(Capabilities::ON_CLOSE) {
			if !handle.borrow_mut().on_close() {
				tracing::info!(component = %name, "components.close.vetoed");
				veto.get_or_insert(name);
			}
		}
		veto
	}

	/// Uninitializes and deactivates every active component in reverse
	/// activation order, ignoring the deactivatable flag. The persisted
	/// user-deactivated set is left untouched.
	pub fn teardown(&mut self) -> Vec<(String, ComponentError)> {
		let mut failed = Vec::new();
		for name in self.order.clone().iter().rev() {
			if !self.is_active(name) {
				continue;
			}
			let Some(handle) = self.interface(name) else {
				continue;
			};
			if let Err(error) = self.shut_down(name, &handle) {
				tracing::warn!(component = %name, %error, "components.teardown.failed");
				self.set_state(name, ComponentState::Deactivated);
				failed.push((name.clone(), error));
			}
		}
		failed
	}

	fn running_interface(&self, name: &str, transition: &'static str) -> Result<ComponentHandle<C>> {
		let entry = self.entries.get(name).ok_or_else(|| ComponentError::Missing(name.to_owned()))?;
		if entry.state != ComponentState::Running {
			return Err(state_error(name, transition, entry.state));
		}
		entry.interface.clone().ok_or_else(|| ComponentError::Missing(name.to_owned()))
	}

	fn running_with(&self, capability: Capabilities) -> Vec<(String, ComponentHandle<C>)> {
		self.order
			.iter()
			.filter(|name| self.state(name) == Some(ComponentState::Running))
			.filter_map(|name| self.interface(name).map(|handle| (name.clone(), handle)))
			.filter(|(_, handle)| handle.borrow().capabilities().contains(capability))
			.collect()
	}

	fn shut_down(&mut self, name: &str, handle: &ComponentHandle<C>) -> Result<()> {
		let category = self.profile(name).map(|profile| profile.category).unwrap_or_default();
		match category {
			Category::Default => run_hook(name, "uninitialize", || handle.borrow_mut().uninitialize())?,
			Category::Ui => {
				run_hook(name, "uninitialize_ui", || handle.borrow_mut().uninitialize_ui())?;
				run_hook(name, "remove_widget", || handle.borrow_mut().remove_widget())?;
			}
		}
		run_hook(name, "deactivate", || handle.borrow_mut().deactivate())?;
		self.set_state(name, ComponentState::Deactivated);
		Ok(())
	}

	fn rebuild(&mut self, name: &str) -> Result<()> {
		let entry = self.entries.get_mut(name).ok_or_else(|| ComponentError::Missing(name.to_owned()))?;
		let profile = if entry.profile.path.as_os_str().is_empty() {
			entry.profile.clone()
		} else {
			let mut fresh = ComponentProfile::load(&entry.profile.path)?;
			if fresh.name != name {
				return Err(ComponentError::failed(format!("manifest now names '{}'", fresh.name)));
			}
			// Requirements feed the activation order, which is fixed after registration.
			fresh.requires = entry.profile.requires.clone();
			fresh
		};
		let handle = self.factories.build(&profile)?;
		check_capabilities(&profile, &handle)?;

		self.directory.remove(name);
		self.directory.insert(name, handle.clone());
		entry.profile = profile;
		entry.interface = Some(handle);
		entry.state = ComponentState::Deactivated;
		Ok(())
	}

	fn set_state(&mut self, name: &str, state: ComponentState) {
		if let Some(entry) = self.entries.get_mut(name) {
			tracing::trace!(component = name, from = %entry.state, to = %state, "components.state");
			entry.state = state;
		}
	}

	fn store_deactivated_components(&self) {
		let joined = self.user_deactivated.iter().map(String::as_str).collect::<Vec<_>>().join(",");
		self.settings.set_key(SETTINGS_SECTION, DEACTIVATED_COMPONENTS_KEY, joined);
	}
}

impl<C: 'static> fmt::Debug for ComponentManager<C> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ComponentManager")
			.field("order", &self.order)
			.field("user_deactivated", &self.user_deactivated)
			.finish_non_exhaustive()
	}
}

fn run_hook(name: &str, hook: &'static str, f: impl FnOnce() -> HookResult) -> Result<()> {
	f().map_err(|error| ComponentError::Hook {
		component: name.to_owned(),
		hook,
		source: Box::new(error),
	})
}

fn unwind(name: &str, hook: &'static str, result: HookResult) {
	if let Err(error) = result {
		tracing::warn!(component = name, hook, %error, "components.rollback.failed");
	}
}

fn state_error(name: &str, transition: &'static str, state: ComponentState) -> ComponentError {
	ComponentError::State {
		component: name.to_owned(),
		transition,
		state: state.as_str(),
	}
}

fn check_capabilities<C: 'static>(profile: &ComponentProfile, handle: &ComponentHandle<C>) -> Result<()> {
	let declared = handle.borrow().capabilities();
	let missing = Capabilities::required_for(profile.category).difference(declared);
	if missing.is_empty() {
		return Ok(());
	}
	let names: Vec<&str> = missing.iter_names().map(|(name, _)| name).collect();
	Err(ComponentError::Capabilities {
		component: profile.name.clone(),
		missing: names.join("|"),
	})
}
