//! Interface constructors keyed by manifest `interface` name.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::{ComponentError, ComponentHandle, ComponentProfile, Result};

/// Builds a live interface for a profile.
pub type Factory<C> = Rc<dyn Fn(&ComponentProfile) -> Result<ComponentHandle<C>>>;

/// Registered interface constructors.
pub struct FactoryRegistry<C> {
	factories: BTreeMap<String, Factory<C>>,
}

impl<C> Default for FactoryRegistry<C> {
	fn default() -> Self {
		Self {
			factories: BTreeMap::new(),
		}
	}
}

impl<C: 'static> FactoryRegistry<C> {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `factory` under `interface`, replacing any previous one.
	pub fn register<F>(&mut self, interface: impl Into<String>, factory: F)
	where
		F: Fn(&ComponentProfile) -> Result<ComponentHandle<C>> + 'static,
	{
		let interface = interface.into();
		if self.factories.insert(interface.clone(), Rc::new(factory)).is_some() {
			tracing::warn!(interface, "components.factory.replaced");
		}
	}

	/// Returns true when `interface` has a constructor.
	pub fn contains(&self, interface: &str) -> bool {
		self.factories.contains_key(interface)
	}

	/// Registered interface names.
	pub fn interfaces(&self) -> Vec<&str> {
		self.factories.keys().map(String::as_str).collect()
	}

	/// Builds the interface declared by `profile`.
	pub fn build(&self, profile: &ComponentProfile) -> Result<ComponentHandle<C>> {
		let factory = self.factories.get(&profile.interface).ok_or_else(|| ComponentError::Factory {
			component: profile.name.clone(),
			interface: profile.interface.clone(),
		})?;
		factory(profile)
	}
}

impl<C> fmt::Debug for FactoryRegistry<C> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list().entries(self.factories.keys()).finish()
	}
}
