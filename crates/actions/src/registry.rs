//! Path-keyed action registry with implicit category tree.

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::{Action, ActionError, ActionHandle, ActionPath, Result, Shortcut, Slot};

/// A node of the category tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Category {
	/// Full category path.
	pub path: String,
	/// Direct child categories, by full path.
	pub categories: BTreeSet<String>,
	/// Direct child actions, by full path.
	pub actions: BTreeSet<String>,
}

/// Registry mapping unique action paths to [`Action`]s.
///
/// Shortcuts may collide; the most recently bound action wins dispatch and
/// the collision is logged at warning level.
#[derive(Debug, Default)]
pub struct ActionsRegistry {
	actions: BTreeMap<String, ActionHandle>,
	categories: BTreeMap<String, Category>,
	shortcuts: FxHashMap<Shortcut, String>,
	separators: usize,
}

impl ActionsRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a new action under `path`.
	///
	/// # Errors
	///
	/// [`ActionError::Exists`] when the normalized path is taken;
	/// [`ActionError::InvalidPath`] or [`ActionError::InvalidShortcut`] for
	/// malformed input.
	pub fn register_action(&mut self, path: &str, shortcut: Option<&str>, slot: Option<&Slot>) -> Result<ActionHandle> {
		let path = ActionPath::parse(path)?;
		let shortcut = shortcut.map(str::parse::<Shortcut>).transpose()?;
		self.insert(Action::new(path, shortcut, slot, false))
	}

	/// Registers a separator entry at the end of `category`.
	pub fn register_separator(&mut self, category: &str) -> Result<ActionHandle> {
		self.separators += 1;
		let path = ActionPath::parse(&format!("{category}|separator_{:04}", self.separators))?;
		self.insert(Action::new(path, None, None, true))
	}

	fn insert(&mut self, action: Action) -> Result<ActionHandle> {
		let full = action.path().to_owned();
		if self.actions.contains_key(&full) {
			return Err(ActionError::Exists(full));
		}

		let action = Rc::new(action);
		let path = ActionPath::parse(&full)?;
		let mut parent: Option<&str> = None;
		for ancestor in path.ancestors() {
			self.categories.entry(ancestor.to_owned()).or_insert_with(|| Category {
				path: ancestor.to_owned(),
				..Category::default()
			});
			if let Some(parent) = parent
				&& let Some(node) = self.categories.get_mut(parent)
			{
				node.categories.insert(ancestor.to_owned());
			}
			parent = Some(ancestor);
		}
		if let Some(node) = self.categories.get_mut(path.category()) {
			node.actions.insert(full.clone());
		}

		if let Some(shortcut) = action.shortcut() {
			self.bind(&shortcut, &full);
		}
		tracing::debug!(action = %full, separator = action.is_separator(), "actions.register");
		self.actions.insert(full, Rc::clone(&action));
		Ok(action)
	}

	/// Looks up an action by path.
	///
	/// # Errors
	///
	/// [`ActionError::Missing`] when nothing is registered under `path`.
	pub fn get_action(&self, path: &str) -> Result<ActionHandle> {
		let path = ActionPath::parse(path)?;
		self.actions.get(path.as_str()).cloned().ok_or_else(|| ActionError::Missing(path.to_string()))
	}

	/// Returns true when an action is registered under `path`.
	pub fn is_action_registered(&self, path: &str) -> bool {
		ActionPath::parse(path).is_ok_and(|path| self.actions.contains_key(path.as_str()))
	}

	/// Removes an action and detaches its shortcut.
	///
	/// Categories left without children are pruned.
	pub fn unregister_action(&mut self, path: &str) -> Result<()> {
		let path = ActionPath::parse(path)?;
		let action = self.actions.remove(path.as_str()).ok_or_else(|| ActionError::Missing(path.to_string()))?;

		if let Some(shortcut) = action.shortcut() {
			self.unbind(&shortcut, path.as_str());
		}
		if let Some(node) = self.categories.get_mut(path.category()) {
			node.actions.remove(path.as_str());
		}
		let ancestors: Vec<&str> = path.ancestors().collect();
		for (index, category) in ancestors.iter().enumerate().rev() {
			let empty = self.categories.get(*category).is_some_and(|node| node.actions.is_empty() && node.categories.is_empty());
			if !empty {
				break;
			}
			self.categories.remove(*category);
			if let Some(parent) = index.checked_sub(1).and_then(|parent| self.categories.get_mut(ancestors[parent])) {
				parent.categories.remove(*category);
			}
		}

		tracing::debug!(action = %path, "actions.unregister");
		Ok(())
	}

	/// Returns the category node at `path`, without normalization.
	pub fn get_category(&self, path: &str) -> Option<&Category> {
		self.categories.get(path)
	}

	/// Lists every category path in sorted order.
	pub fn list_categories(&self) -> Vec<String> {
		self.categories.keys().cloned().collect()
	}

	/// Lists every action path in sorted order.
	pub fn list_actions(&self) -> Vec<String> {
		self.actions.keys().cloned().collect()
	}

	/// Number of registered actions, separators included.
	pub fn len(&self) -> usize {
		self.actions.len()
	}

	/// Returns true when no actions are registered.
	pub fn is_empty(&self) -> bool {
		self.actions.is_empty()
	}

	/// Returns the shortcut of the action at `path`.
	pub fn get_shortcut(&self, path: &str) -> Result<Option<Shortcut>> {
		Ok(self.get_action(path)?.shortcut())
	}

	/// Rebinds (or clears, with `None`) the shortcut of the action at `path`.
	pub fn set_shortcut(&mut self, path: &str, shortcut: Option<&str>) -> Result<()> {
		let action = self.get_action(path)?;
		let shortcut = shortcut.map(str::parse::<Shortcut>).transpose()?;
		if let Some(previous) = action.shortcut() {
			self.unbind(&previous, action.path());
		}
		if let Some(next) = shortcut.as_ref() {
			self.bind(next, action.path());
		}
		action.set_shortcut(shortcut);
		Ok(())
	}

	/// Returns true when some action currently owns `shortcut` for dispatch.
	pub fn is_shortcut_in_use(&self, shortcut: &str) -> bool {
		shortcut.parse::<Shortcut>().is_ok_and(|shortcut| self.shortcuts.contains_key(&shortcut))
	}

	/// Returns the action that `shortcut` dispatches to.
	pub fn shortcut_action(&self, shortcut: &Shortcut) -> Option<ActionHandle> {
		self.shortcuts.get(shortcut).and_then(|path| self.actions.get(path)).cloned()
	}

	/// Looks up and triggers the action at `path`.
	///
	/// The registry must not be borrowed mutably while slots run; callers
	/// holding the registry in a `RefCell` should fetch the handle with
	/// [`Self::get_action`], release the borrow, then call
	/// [`Action::trigger`].
	pub fn trigger(&self, path: &str) -> Result<bool> {
		Ok(self.get_action(path)?.trigger())
	}

	/// Triggers the action bound to `shortcut`; false when unbound.
	pub fn trigger_shortcut(&self, shortcut: &str) -> Result<bool> {
		let shortcut: Shortcut = shortcut.parse()?;
		Ok(self.shortcut_action(&shortcut).is_some_and(|action| action.trigger()))
	}

	fn bind(&mut self, shortcut: &Shortcut, path: &str) {
		if let Some(previous) = self.shortcuts.insert(shortcut.clone(), path.to_owned())
			&& previous != path
		{
			tracing::warn!(%shortcut, previous = %previous, action = %path, "actions.shortcut_collision");
		}
	}

	fn unbind(&mut self, shortcut: &Shortcut, path: &str) {
		if self.shortcuts.get(shortcut).is_some_and(|owner| owner == path) {
			self.shortcuts.remove(shortcut);
		}
	}
}
