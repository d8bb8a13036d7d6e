use std::future::Future;

use tokio::task::{JoinError, JoinSet};

use crate::TaskClass;

/// Classified wrapper for a Tokio [`JoinSet`].
///
/// Must be used from inside a Tokio runtime context.
#[derive(Debug)]
pub struct WorkerJoinSet<T> {
	class: TaskClass,
	inner: JoinSet<T>,
}

impl<T> WorkerJoinSet<T>
where
	T: Send + 'static,
{
	/// Creates an empty join set for the given task class.
	pub fn new(class: TaskClass) -> Self {
		Self { class, inner: JoinSet::new() }
	}

	/// Number of tasks not yet reaped.
	pub fn len(&self) -> usize {
		self.inner.len()
	}

	/// Returns `true` if the set is empty.
	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}

	/// Spawns a future into the set on the current runtime.
	pub fn spawn<F>(&mut self, fut: F)
	where
		F: Future<Output = T> + Send + 'static,
	{
		tracing::trace!(worker_class = self.class.as_str(), pending = self.inner.len(), "worker.join_set.spawn");
		self.inner.spawn(fut);
	}

	/// Waits for the next completed task.
	pub async fn join_next(&mut self) -> Option<Result<T, JoinError>> {
		self.inner.join_next().await
	}

	/// Reaps every task that has already completed without waiting.
	pub fn reap_finished(&mut self) -> usize {
		let mut reaped = 0;
		while let Some(result) = self.inner.try_join_next() {
			if let Err(error) = result
				&& error.is_panic()
			{
				tracing::warn!(worker_class = self.class.as_str(), %error, "worker.join_set.panic");
			}
			reaped += 1;
		}
		reaped
	}

	/// Aborts every task and waits for them to finish.
	pub async fn shutdown(&mut self) {
		self.inner.shutdown().await;
	}
}
