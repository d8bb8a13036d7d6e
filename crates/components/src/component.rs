//! The live component interface.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::{Category, ComponentError};

/// Outcome of a lifecycle hook.
pub type HookResult = Result<(), ComponentError>;

/// Shared handle to a live interface.
pub type ComponentHandle<C> = Rc<RefCell<dyn Component<C>>>;

/// Wraps a concrete interface into a [`ComponentHandle`].
pub fn handle<C: 'static, T: Component<C>>(component: T) -> ComponentHandle<C> {
	Rc::new(RefCell::new(component))
}

bitflags::bitflags! {
	/// Hooks an interface implements.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct Capabilities: u16 {
		/// `activate` (always required).
		const ACTIVATE = 1 << 0;
		/// `deactivate` (always required).
		const DEACTIVATE = 1 << 1;
		/// `initialize` for default components.
		const INITIALIZE = 1 << 2;
		/// `uninitialize` for default components.
		const UNINITIALIZE = 1 << 3;
		/// `initialize_ui` for ui components.
		const INITIALIZE_UI = 1 << 4;
		/// `uninitialize_ui` for ui components.
		const UNINITIALIZE_UI = 1 << 5;
		/// `add_widget` for ui components.
		const ADD_WIDGET = 1 << 6;
		/// `remove_widget` for ui components.
		const REMOVE_WIDGET = 1 << 7;
		/// `on_startup` after boot.
		const ON_STARTUP = 1 << 8;
		/// `on_close` before shutdown.
		const ON_CLOSE = 1 << 9;

		/// Full hook table of a default component.
		const DEFAULT = Self::ACTIVATE.bits() | Self::DEACTIVATE.bits() | Self::INITIALIZE.bits() | Self::UNINITIALIZE.bits();
		/// Full hook table of a ui component.
		const UI = Self::ACTIVATE.bits()
			| Self::DEACTIVATE.bits()
			| Self::INITIALIZE_UI.bits()
			| Self::UNINITIALIZE_UI.bits()
			| Self::ADD_WIDGET.bits()
			| Self::REMOVE_WIDGET.bits();
	}
}

impl Capabilities {
	/// Hooks a component of `category` must provide.
	pub const fn required_for(category: Category) -> Self {
		match category {
			Category::Default => Self::DEFAULT,
			Category::Ui => Self::UI,
		}
	}
}

/// A live component.
///
/// The manager only calls hooks advertised by [`Component::capabilities`].
/// Every hook defaults to a no-op so implementors override what they declare.
pub trait Component<C>: Any {
	/// Hooks this interface implements.
	fn capabilities(&self) -> Capabilities;

	/// Whether the component may be deactivated at run time.
	fn deactivatable(&self) -> bool {
		true
	}

	/// Binds the component to the host context.
	fn activate(&mut self, context: &C) -> HookResult;

	/// Releases the host context.
	fn deactivate(&mut self) -> HookResult;

	/// Default components: registers actions and wires collaborators.
	fn initialize(&mut self) -> HookResult {
		Ok(())
	}

	/// Default components: mirror of [`Component::initialize`].
	fn uninitialize(&mut self) -> HookResult {
		Ok(())
	}

	/// Ui components: places widgets into the window.
	fn add_widget(&mut self) -> HookResult {
		Ok(())
	}

	/// Ui components: removes widgets from the window.
	fn remove_widget(&mut self) -> HookResult {
		Ok(())
	}

	/// Ui components: registers actions and wires widgets.
	fn initialize_ui(&mut self) -> HookResult {
		Ok(())
	}

	/// Ui components: mirror of [`Component::initialize_ui`].
	fn uninitialize_ui(&mut self) -> HookResult {
		Ok(())
	}

	/// Runs once after every component has been activated.
	fn on_startup(&mut self) -> HookResult {
		Ok(())
	}

	/// Runs before shutdown; returning false vetoes it.
	fn on_close(&mut self) -> bool {
		true
	}
}
