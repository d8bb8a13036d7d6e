//! Error types for layout management.

use thiserror::Error;

/// Errors raised by the layout registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
	/// A layout is already registered under this identity.
	#[error("layout '{0}' is already registered")]
	Registration(String),

	/// No layout is registered under this identity.
	#[error("layout '{0}' is not registered")]
	Missing(String),
}

/// Result type for layout operations.
pub type Result<T> = std::result::Result<T, LayoutError>;
