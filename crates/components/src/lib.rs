//! Pluggable component lifecycle.
//!
//! Components are directories carrying a `component.toml` manifest. The
//! [`ComponentManager`] discovers them, checks the `requires` graph, builds
//! live interfaces through a [`FactoryRegistry`], and drives each one through
//! the lifecycle:
//!
//! ```text
//! Discovered -> Instantiated -> Activated -> Running -> Deactivated
//!                                  ^                        |
//!                                  +-------- reload --------+
//! ```
//!
//! Live interfaces implement [`Component`]; the context type `C` is whatever
//! the host hands to [`Component::activate`]. Siblings are looked up by name
//! through the shared [`ComponentDirectory`].

#![warn(missing_docs)]

mod component;
mod directory;
mod error;
mod factory;
mod graph;
mod manager;
mod profile;

pub use component::{Capabilities, Component, ComponentHandle, HookResult, handle};
pub use directory::ComponentDirectory;
pub use error::{ComponentError, Result};
pub use factory::{Factory, FactoryRegistry};
pub use graph::{activation_order, dependents};
pub use manager::{ActivationReport, ComponentManager, ComponentState, DEACTIVATED_COMPONENTS_KEY};
pub use profile::{Category, ComponentProfile, MANIFEST_FILE, discover};
