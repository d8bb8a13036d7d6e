//! Engine error type.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal engine failures.
#[derive(Debug, Error)]
pub enum EngineError {
	/// The user data directory tree could not be created.
	#[error("cannot prepare directory {path}: {error}")]
	Directory {
		/// Offending directory.
		path: PathBuf,
		/// Underlying error.
		#[source]
		error: std::io::Error,
	},

	/// No user data directory was given and none could be derived.
	#[error("no user application data directory available")]
	NoDataDirectory,

	/// The settings file could not be loaded.
	#[error(transparent)]
	Settings(#[from] umbra_settings::SettingsError),

	/// Discovery or a requisite component failed.
	#[error(transparent)]
	Components(#[from] umbra_components::ComponentError),

	/// An engine action could not be registered.
	#[error(transparent)]
	Actions(#[from] umbra_actions::ActionError),

	/// A stock layout could not be registered.
	#[error(transparent)]
	Layout(#[from] umbra_layout::LayoutError),

	/// A patch could not be registered or its history accessed.
	#[error(transparent)]
	Patches(#[from] crate::PatchError),

	/// The logging sinks could not be installed.
	#[error("cannot install logging: {0}")]
	Logging(String),

	/// A component vetoed shutdown.
	#[error("shutdown vetoed by component '{0}'")]
	ShutdownVetoed(String),

	/// The engine was already shut down.
	#[error("engine is already shut down")]
	ShutDown,
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
