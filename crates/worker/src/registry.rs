use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;

use crate::TaskClass;

/// Lifecycle state of a tracked worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
	/// Thread is executing.
	Running,
	/// Thread returned and was joined.
	Finished,
	/// Thread panicked; the panic was observed at join.
	Panicked,
	/// Thread outlived the shutdown grace period and was left behind.
	Detached,
}

/// Snapshot for one tracked worker.
#[derive(Debug, Clone)]
pub struct WorkerRecord {
	/// Tracker-assigned id.
	pub id: u64,
	/// Thread name.
	pub name: String,
	/// Execution class.
	pub class: TaskClass,
	/// Current state.
	pub state: WorkerState,
	/// Spawn time.
	pub started_at: Instant,
}

/// In-memory worker registry for status snapshots.
#[derive(Debug, Default, Clone)]
pub struct WorkerRegistry {
	inner: Arc<RwLock<BTreeMap<u64, WorkerRecord>>>,
}

impl WorkerRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Upserts one record.
	pub fn upsert(&self, record: WorkerRecord) {
		self.inner.write().insert(record.id, record);
	}

	/// Updates the state of a record, if present.
	pub fn set_state(&self, id: u64, state: WorkerState) {
		if let Some(record) = self.inner.write().get_mut(&id) {
			record.state = state;
		}
	}

	/// Drops the oldest records of workers no longer running, keeping at
	/// most `keep` of them; returns how many were dropped.
	pub fn prune_finished(&self, keep: usize) -> usize {
		let mut inner = self.inner.write();
		let finished: Vec<u64> = inner.values().filter(|record| record.state != WorkerState::Running).map(|record| record.id).collect();
		let excess = finished.len().saturating_sub(keep);
		for id in &finished[..excess] {
			inner.remove(id);
		}
		excess
	}

	/// Returns the record for `id`.
	pub fn get(&self, id: u64) -> Option<WorkerRecord> {
		self.inner.read().get(&id).cloned()
	}

	/// Returns snapshots in spawn order.
	pub fn snapshots(&self) -> Vec<WorkerRecord> {
		self.inner.read().values().cloned().collect()
	}
}
