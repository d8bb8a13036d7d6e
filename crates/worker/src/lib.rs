//! Background worker primitives.
//!
//! The host is single-threaded; everything that blocks (socket accept loops,
//! file searches, path watching) runs on a dedicated named thread spawned through
//! [`WorkerTracker`]. Every tracked worker gets a cancellation token and is
//! joined, or detached after a grace period, at shutdown.

#![warn(missing_docs)]

mod class;
mod join_set;
mod registry;
mod spawn;
mod tracker;
mod watch;

pub use class::TaskClass;
pub use join_set::WorkerJoinSet;
pub use registry::{WorkerRecord, WorkerRegistry, WorkerState};
pub use spawn::spawn_named_thread;
pub use tokio_util::sync::CancellationToken;
pub use tracker::{RETAINED_RECORDS, ShutdownReport, WorkerId, WorkerTracker};
pub use watch::{FsEvent, FsEventKind, PathWatcher, WatchError};
