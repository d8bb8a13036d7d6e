//! Registered actions and their slots.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::{ActionPath, Shortcut};

/// Callable bound to an action. The registry only keeps a weak reference;
/// the owning component keeps the strong one alive for its active span.
pub type Slot = Rc<dyn Fn()>;

/// Shared handle to a registered action; identity is pointer identity.
pub type ActionHandle = Rc<Action>;

/// A named command.
pub struct Action {
	path: ActionPath,
	shortcut: RefCell<Option<Shortcut>>,
	slot: Option<Weak<dyn Fn()>>,
	separator: bool,
}

impl Action {
	pub(crate) fn new(path: ActionPath, shortcut: Option<Shortcut>, slot: Option<&Slot>, separator: bool) -> Self {
		Self {
			path,
			shortcut: RefCell::new(shortcut),
			slot: slot.map(Rc::downgrade),
			separator,
		}
	}

	/// Full normalized path.
	pub fn path(&self) -> &str {
		self.path.as_str()
	}

	/// Last path segment.
	pub fn name(&self) -> &str {
		self.path.name()
	}

	/// Category path (every segment but the last).
	pub fn category(&self) -> &str {
		self.path.category()
	}

	/// Bound shortcut, if any.
	pub fn shortcut(&self) -> Option<Shortcut> {
		self.shortcut.borrow().clone()
	}

	pub(crate) fn set_shortcut(&self, shortcut: Option<Shortcut>) {
		*self.shortcut.borrow_mut() = shortcut;
	}

	/// Whether this entry is a menu separator.
	pub const fn is_separator(&self) -> bool {
		self.separator
	}

	/// Returns true while the slot's owner keeps it alive.
	pub fn is_live(&self) -> bool {
		self.slot.as_ref().is_some_and(|slot| slot.strong_count() > 0)
	}

	/// Invokes the slot.
	///
	/// Returns false when the action has no slot or the slot's owner has
	/// been dropped.
	pub fn trigger(&self) -> bool {
		let Some(slot) = self.slot.as_ref() else {
			tracing::debug!(action = %self.path, "actions.trigger.no_slot");
			return false;
		};
		let Some(slot) = slot.upgrade() else {
			tracing::warn!(action = %self.path, "actions.trigger.dead_slot");
			return false;
		};
		tracing::debug!(action = %self.path, "actions.trigger");
		slot();
		true
	}
}

impl fmt::Debug for Action {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Action")
			.field("path", &self.path.as_str())
			.field("shortcut", &self.shortcut.borrow().as_ref().map(ToString::to_string))
			.field("separator", &self.separator)
			.field("live", &self.is_live())
			.finish()
	}
}
