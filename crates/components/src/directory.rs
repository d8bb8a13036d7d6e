//! Name-keyed lookup of live interfaces shared with components.

use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::ComponentHandle;

/// Shared view of instantiated components, used for sibling lookup.
///
/// Cloning is cheap; all clones observe the same entries. The manager is
/// the only writer.
pub struct ComponentDirectory<C> {
	entries: Rc<RefCell<BTreeMap<String, ComponentHandle<C>>>>,
}

impl<C> Clone for ComponentDirectory<C> {
	fn clone(&self) -> Self {
		Self {
			entries: Rc::clone(&self.entries),
		}
	}
}

impl<C> Default for ComponentDirectory<C> {
	fn default() -> Self {
		Self {
			entries: Rc::new(RefCell::new(BTreeMap::new())),
		}
	}
}

impl<C: 'static> ComponentDirectory<C> {
	/// Handle to the interface registered as `name`.
	pub fn get(&self, name: &str) -> Option<ComponentHandle<C>> {
		self.entries.borrow().get(name).cloned()
	}

	/// Names of instantiated components.
	pub fn names(&self) -> Vec<String> {
		self.entries.borrow().keys().cloned().collect()
	}

	/// Runs `f` against the concrete interface of `name`.
	///
	/// Returns `None` when the component is absent, has another type, or is
	/// currently running one of its own hooks.
	pub fn with<T: 'static, R>(&self, name: &str, f: impl FnOnce(&mut T) -> R) -> Option<R> {
		let handle = self.get(name)?;
		let Ok(mut guard) = handle.try_borrow_mut() else {
			tracing::debug!(component = name, "components.directory.busy");
			return None;
		};
		let any: &mut dyn Any = &mut *guard;
		any.downcast_mut::<T>().map(f)
	}

	pub(crate) fn insert(&self, name: &str, handle: ComponentHandle<C>) {
		self.entries.borrow_mut().insert(name.to_owned(), handle);
	}

	pub(crate) fn remove(&self, name: &str) {
		self.entries.borrow_mut().remove(name);
	}
}

impl<C> fmt::Debug for ComponentDirectory<C> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list().entries(self.entries.borrow().keys()).finish()
	}
}
