//! Hierarchical named-action registry.
//!
//! Actions are addressed by `|`-separated paths such as
//! `Actions|Umbra|Components|factory.script_editor|Edit|Undo`. Every prefix of
//! an action path is a category; categories come into existence with their
//! first child. Actions may carry a [`Shortcut`] and a weakly held slot.
//!
//! The registry is single-threaded: handles are [`Rc`](std::rc::Rc) based and
//! slots are only invoked on the thread that owns the registry.

#![warn(missing_docs)]

mod action;
mod error;
mod path;
mod registry;
mod shortcut;

pub use action::{Action, ActionHandle, Slot};
pub use error::{ActionError, Result};
pub use path::{ActionPath, DEFAULT_CATEGORY, NAMESPACE_SPLITTER, ROOT_NAMESPACE};
pub use registry::{ActionsRegistry, Category};
pub use shortcut::{Modifiers, Shortcut};
