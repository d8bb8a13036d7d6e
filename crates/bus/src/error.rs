//! Error types for the request bus.

use std::net::SocketAddr;

use thiserror::Error;

/// Errors raised by the server and client endpoints.
#[derive(Debug, Error)]
pub enum BusError {
	/// Port outside `0..=65535`.
	#[error("invalid port {0}: expected 0..=65535")]
	InvalidPort(i64),

	/// The configured address could not be parsed or resolved.
	#[error("invalid address '{0}'")]
	InvalidAddress(String),

	/// `start` was called on a running server.
	#[error("server is already running on {0}")]
	AlreadyRunning(SocketAddr),

	/// The listener could not be bound.
	#[error("failed to bind {addr}: {error}")]
	Bind {
		/// Requested bind address.
		addr: SocketAddr,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// The server runtime or thread could not be created.
	#[error("failed to start server worker: {0}")]
	Worker(std::io::Error),

	/// The client could not connect within its timeout.
	#[error("failed to connect to {addr}: {error}")]
	Connect {
		/// Peer address.
		addr: String,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// The client connected but writing the payload failed.
	#[error("failed to send to {addr}: {error}")]
	Send {
		/// Peer address.
		addr: String,
		/// The underlying I/O error.
		error: std::io::Error,
	},
}

/// Result type for bus operations.
pub type Result<T> = std::result::Result<T, BusError>;
