//! Tracked worker threads joined at shutdown.

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::{TaskClass, WorkerRecord, WorkerRegistry, WorkerState, spawn_named_thread};

/// Records of joined workers kept for status snapshots.
pub const RETAINED_RECORDS: usize = 64;

/// Handle identifying a tracked worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(pub u64);

struct Tracked {
	id: u64,
	name: String,
	handle: JoinHandle<()>,
	cancel: CancellationToken,
}

/// Outcome of [`WorkerTracker::shutdown`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShutdownReport {
	/// Workers that finished and were joined.
	pub joined: usize,
	/// Names of workers that panicked.
	pub panicked: Vec<String>,
	/// Names of workers left running after the grace period.
	pub detached: Vec<String>,
}

/// Spawns named worker threads and joins them at shutdown.
///
/// Workers receive a [`CancellationToken`] and are expected to poll it.
/// Threads cannot be killed; a worker that ignores cancellation past the
/// shutdown grace period is detached and reported.
#[derive(Default)]
pub struct WorkerTracker {
	registry: WorkerRegistry,
	workers: Mutex<Vec<Tracked>>,
	root: CancellationToken,
	next_id: AtomicU64,
}

impl WorkerTracker {
	/// Creates an empty tracker.
	pub fn new() -> Self {
		Self::default()
	}

	/// Status registry shared with observers.
	pub fn registry(&self) -> &WorkerRegistry {
		&self.registry
	}

	/// Spawns `work` on a named thread and tracks it.
	pub fn spawn<F>(&self, class: TaskClass, name: impl Into<String>, work: F) -> std::io::Result<WorkerId>
	where
		F: FnOnce(CancellationToken) + Send + 'static,
	{
		let name = name.into();
		let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
		let cancel = self.root.child_token();
		let token = cancel.clone();
		let handle = spawn_named_thread(class, name.clone(), move || work(token))?;

		self.registry.upsert(WorkerRecord {
			id,
			name: name.clone(),
			class,
			state: WorkerState::Running,
			started_at: Instant::now(),
		});
		tracing::debug!(worker = %name, id, worker_class = class.as_str(), "worker.track");
		self.workers.lock().push(Tracked { id, name, handle, cancel });
		Ok(WorkerId(id))
	}

	/// Requests cancellation of one worker; false when it is not tracked.
	pub fn cancel(&self, id: WorkerId) -> bool {
		let workers = self.workers.lock();
		let Some(worker) = workers.iter().find(|worker| worker.id == id.0) else {
			return false;
		};
		worker.cancel.cancel();
		true
	}

	/// Number of workers not yet joined.
	pub fn active(&self) -> usize {
		self.workers.lock().len()
	}

	/// Joins every worker whose thread has already returned.
	///
	/// Only the newest [`RETAINED_RECORDS`] records of joined workers stay
	/// in the registry.
	pub fn reap(&self) -> ShutdownReport {
		let finished: Vec<Tracked> = {
			let mut workers = self.workers.lock();
			let (done, pending): (Vec<_>, Vec<_>) = workers.drain(..).partition(|worker| worker.handle.is_finished());
			*workers = pending;
			done
		};

		let mut report = ShutdownReport::default();
		for worker in finished {
			match worker.handle.join() {
				Ok(()) => {
					self.registry.set_state(worker.id, WorkerState::Finished);
					report.joined += 1;
				}
				Err(_) => {
					tracing::warn!(worker = %worker.name, "worker.panicked");
					self.registry.set_state(worker.id, WorkerState::Panicked);
					report.panicked.push(worker.name);
				}
			}
		}
		let pruned = self.registry.prune_finished(RETAINED_RECORDS);
		if pruned > 0 {
			tracing::trace!(pruned, "worker.registry.pruned");
		}
		report
	}

	/// Cancels every worker and joins them, waiting at most `grace`.
	pub fn shutdown(&self, grace: Duration) -> ShutdownReport {
		self.root.cancel();
		let deadline = Instant::now() + grace;
		let mut report = ShutdownReport::default();

		loop {
			let reaped = self.reap();
			report.joined += reaped.joined;
			report.panicked.extend(reaped.panicked);
			if self.active() == 0 || Instant::now() >= deadline {
				break;
			}
			std::thread::sleep(Duration::from_millis(5));
		}

		for worker in self.workers.lock().drain(..) {
			tracing::warn!(worker = %worker.name, ?grace, "worker.detached");
			self.registry.set_state(worker.id, WorkerState::Detached);
			report.detached.push(worker.name);
		}
		tracing::debug!(joined = report.joined, detached = report.detached.len(), "worker.shutdown");
		report
	}
}

impl std::fmt::Debug for WorkerTracker {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("WorkerTracker").field("active", &self.active()).finish()
	}
}

#[cfg(test)]
mod tests;
