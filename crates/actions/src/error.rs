//! Error types for the actions registry.

use thiserror::Error;

/// Errors raised by registration and lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
	/// An action is already registered under this path.
	#[error("action '{0}' is already registered")]
	Exists(String),

	/// No action is registered under this path.
	#[error("action '{0}' is not registered")]
	Missing(String),

	/// The path is empty or contains an empty segment.
	#[error("invalid action path '{0}'")]
	InvalidPath(String),

	/// The shortcut string could not be parsed.
	#[error("invalid shortcut '{shortcut}': {reason}")]
	InvalidShortcut {
		/// The rejected shortcut text.
		shortcut: String,
		/// What was wrong with it.
		reason: String,
	},
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, ActionError>;
