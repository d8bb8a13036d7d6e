//! Framed text request bus.
//!
//! External processes push UTF-8 payloads over TCP, each terminated by the
//! [`REQUEST_END`] sentinel. The [`TcpServer`] runs its accept loop on a
//! background thread and places complete requests on a bounded FIFO; the UI
//! thread drains the [`RequestQueue`] on its timer and is the only place a
//! payload is ever acted on. [`SERVER_SHUTDOWN`] received anywhere in a
//! connection stops the server instead.
//!
//! * [`RequestFramer`]: push-based sentinel scanner, independent of sockets
//! * [`RequestQueue`] / [`RequestSender`]: the shared FIFO
//! * [`TcpServer`]: accept loop, per-connection handlers, `Offline`/`Running` state
//! * [`TcpClient`]: short-lived sender with a connect/send timeout

#![warn(missing_docs)]

mod address;
mod client;
mod error;
mod framing;
mod queue;
mod server;

pub use address::{DEFAULT_PORT, primary_address};
pub use client::{ClientConfig, DEFAULT_FILE_COMMAND, TcpClient, decode_escapes};
pub use error::{BusError, Result};
pub use framing::{CHUNK_SIZE, Frame, FrameError, REQUEST_END, RequestFramer, SERVER_SHUTDOWN};
pub use queue::{DEFAULT_QUEUE_CAPACITY, Request, RequestQueue, RequestSender, request_queue};
pub use server::{ServerConfig, ServerState, TcpServer, validate_port};
