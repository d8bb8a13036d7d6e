//! Error types for component management.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while discovering or driving components.
#[derive(Debug, Error)]
pub enum ComponentError {
	/// Reading a manifest or search path failed.
	#[error("failed to read {path}: {error}")]
	Io {
		/// Offending path.
		path: PathBuf,
		/// Underlying error.
		#[source]
		error: std::io::Error,
	},

	/// A manifest could not be parsed.
	#[error("malformed manifest {path}: {error}")]
	Manifest {
		/// Manifest path.
		path: PathBuf,
		/// Parse error.
		#[source]
		error: Box<toml::de::Error>,
	},

	/// A component with this name is already registered.
	#[error("component '{0}' is already registered")]
	Exists(String),

	/// No component is registered under this name.
	#[error("component '{0}' is not registered")]
	Missing(String),

	/// A `requires` entry names an unknown component.
	#[error("component '{component}' requires unknown component '{requirement}'")]
	Unresolved {
		/// Requiring component.
		component: String,
		/// Unknown requirement.
		requirement: String,
	},

	/// The `requires` graph contains a cycle.
	#[error("dependency cycle: {}", .0.join(" -> "))]
	Cycle(Vec<String>),

	/// A requirement is not running.
	#[error("component '{component}' requires '{requirement}' which is not active")]
	Requirement {
		/// Requiring component.
		component: String,
		/// Inactive requirement.
		requirement: String,
	},

	/// No factory is registered for the manifest's interface.
	#[error("no factory for interface '{interface}' of component '{component}'")]
	Factory {
		/// Component name.
		component: String,
		/// Interface name from the manifest.
		interface: String,
	},

	/// The interface lacks hooks its category needs.
	#[error("component '{component}' lacks capabilities {missing}")]
	Capabilities {
		/// Component name.
		component: String,
		/// Missing capability names.
		missing: String,
	},

	/// The component is not in a state allowing the transition.
	#[error("component '{component}' cannot {transition} while {state}")]
	State {
		/// Component name.
		component: String,
		/// Requested transition.
		transition: &'static str,
		/// Current state.
		state: &'static str,
	},

	/// A lifecycle hook failed.
	#[error("component '{component}' failed in {hook}: {source}")]
	Hook {
		/// Component name.
		component: String,
		/// Hook name.
		hook: &'static str,
		/// Failure reported by the hook.
		source: Box<ComponentError>,
	},

	/// The component refuses deactivation.
	#[error("component '{0}' cannot be deactivated")]
	Deactivation(String),

	/// The component cannot be reloaded.
	#[error("component '{component}' cannot be reloaded: {reason}")]
	Reload {
		/// Component name.
		component: String,
		/// Why the reload was refused or failed.
		reason: String,
	},

	/// Free-form failure raised by component code.
	#[error("{0}")]
	Failed(String),
}

impl ComponentError {
	/// Builds a free-form failure.
	pub fn failed(message: impl Into<String>) -> Self {
		Self::Failed(message.into())
	}
}

/// Result type for component operations.
pub type Result<T> = std::result::Result<T, ComponentError>;
