//! Error types for settings persistence.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or flushing settings.
#[derive(Debug, Error)]
pub enum SettingsError {
	/// Reading or writing the backing file failed.
	#[error("I/O error on settings file {path}: {error}")]
	Io {
		/// Path of the backing file.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// The backing file is not valid settings TOML.
	#[error("malformed settings file {path}: {error}")]
	Parse {
		/// Path of the backing file.
		path: PathBuf,
		/// The underlying TOML error.
		error: toml::de::Error,
	},

	/// The in-memory snapshot could not be rendered as TOML.
	#[error("failed to serialize settings: {0}")]
	Serialize(#[from] toml::ser::Error),
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;
