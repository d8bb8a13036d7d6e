//! Registered-path watcher reporting changes from a tracked worker.
//!
//! Files are watched through their parent directory. Events are classified
//! against the registered set on the worker thread and handed to a sink; a
//! path that disappears is reported as [`FsEventKind::Invalidated`] and
//! dropped from the set.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;

use crate::{TaskClass, WorkerId, WorkerTracker};

const POLL: Duration = Duration::from_millis(50);

/// What happened to a registered path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FsEventKind {
	/// Content or metadata changed; for directories, an entry changed.
	Changed,
	/// The path no longer exists and was unregistered.
	Invalidated,
}

/// Change report for one registered path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FsEvent {
	/// Canonical registered path.
	pub path: PathBuf,
	/// True when the path was a file at registration.
	pub is_file: bool,
	/// What happened.
	pub kind: FsEventKind,
}

/// Errors from [`PathWatcher`].
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
	/// The path does not exist.
	#[error("path does not exist: {}", .0.display())]
	Missing(PathBuf),
	/// The path is already registered.
	#[error("path is already registered: {}", .0.display())]
	Registered(PathBuf),
	/// The path is not registered.
	#[error("path is not registered: {}", .0.display())]
	NotRegistered(PathBuf),
	/// The platform watcher failed.
	#[error(transparent)]
	Notify(#[from] notify::Error),
	/// The watcher is not running.
	#[error("path watcher is not running")]
	Stopped,
	/// The worker thread could not be spawned.
	#[error("cannot spawn watcher worker: {0}")]
	Spawn(#[from] std::io::Error),
}

type Registered = Arc<Mutex<BTreeMap<PathBuf, bool>>>;

/// Watches registered files and directories.
///
/// Dropping the watcher disconnects the platform backend, which ends the
/// worker on its next poll.
pub struct PathWatcher {
	watcher: RecommendedWatcher,
	paths: Registered,
	roots: BTreeSet<PathBuf>,
	worker: WorkerId,
}

impl PathWatcher {
	/// Starts the backend and a tracked worker feeding `sink`.
	///
	/// The worker stops when `sink` returns false or its token is cancelled.
	pub fn start<S>(tracker: &WorkerTracker, sink: S) -> Result<Self, WatchError>
	where
		S: Fn(FsEvent) -> bool + Send + 'static,
	{
		let (raw_tx, raw_rx) = mpsc::channel::<notify::Result<Event>>();
		let watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
			if let Err(error) = raw_tx.send(result) {
				tracing::trace!(%error, "worker.watch.backend_orphaned");
			}
		})?;

		let paths: Registered = Arc::default();
		let registered = Arc::clone(&paths);
		let worker = tracker.spawn(TaskClass::IoBlocking, "umbra-fs-events", move |cancel| {
			while !cancel.is_cancelled() {
				match raw_rx.recv_timeout(POLL) {
					Ok(Ok(event)) => {
						for report in classify(&registered, &event) {
							tracing::debug!(path = %report.path.display(), kind = ?report.kind, "worker.watch.event");
							if !sink(report) {
								return;
							}
						}
					}
					Ok(Err(error)) => tracing::warn!(%error, "worker.watch.backend_error"),
					Err(RecvTimeoutError::Timeout) => {}
					Err(RecvTimeoutError::Disconnected) => return,
				}
			}
		})?;

		Ok(Self {
			watcher,
			paths,
			roots: BTreeSet::new(),
			worker,
		})
	}

	/// Id of the tracked worker classifying events.
	pub fn worker(&self) -> WorkerId {
		self.worker
	}

	/// Starts watching `path`, returning its canonical form.
	pub fn register_path(&mut self, path: &Path) -> Result<PathBuf, WatchError> {
		let canonical = std::fs::canonicalize(path).map_err(|_| WatchError::Missing(path.to_owned()))?;
		if self.paths.lock().contains_key(&canonical) {
			return Err(WatchError::Registered(canonical));
		}
		let is_file = canonical.is_file();
		let root = watch_root(&canonical, is_file);
		if !self.roots.contains(&root) {
			self.watcher.watch(&root, RecursiveMode::NonRecursive)?;
			self.roots.insert(root);
		}
		self.paths.lock().insert(canonical.clone(), is_file);
		tracing::debug!(path = %canonical.display(), is_file, "worker.watch.register");
		Ok(canonical)
	}

	/// Stops watching `path`.
	pub fn unregister_path(&mut self, path: &Path) -> Result<(), WatchError> {
		let canonical = resolve(path);
		if self.paths.lock().remove(&canonical).is_none() {
			return Err(WatchError::NotRegistered(canonical));
		}
		self.release_roots();
		tracing::debug!(path = %canonical.display(), "worker.watch.unregister");
		Ok(())
	}

	/// Returns true when `path` is registered.
	pub fn is_path_registered(&self, path: &Path) -> bool {
		self.paths.lock().contains_key(&resolve(path))
	}

	/// Registered paths in sorted order.
	pub fn list_paths(&self) -> Vec<PathBuf> {
		self.paths.lock().keys().cloned().collect()
	}

	fn release_roots(&mut self) {
		let needed: BTreeSet<PathBuf> = self.paths.lock().iter().map(|(path, is_file)| watch_root(path, *is_file)).collect();
		let stale: Vec<PathBuf> = self.roots.difference(&needed).cloned().collect();
		for root in stale {
			if let Err(error) = self.watcher.unwatch(&root) {
				tracing::debug!(root = %root.display(), %error, "worker.watch.unwatch_failed");
			}
			self.roots.remove(&root);
		}
	}
}

impl std::fmt::Debug for PathWatcher {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PathWatcher").field("paths", &self.list_paths()).field("worker", &self.worker).finish()
	}
}

// Invalidated paths may no longer canonicalize; fall back to the literal.
fn resolve(path: &Path) -> PathBuf {
	std::fs::canonicalize(path).unwrap_or_else(|_| path.to_owned())
}

fn watch_root(path: &Path, is_file: bool) -> PathBuf {
	match path.parent() {
		Some(parent) if is_file => parent.to_owned(),
		_ => path.to_owned(),
	}
}

fn classify(registered: &Mutex<BTreeMap<PathBuf, bool>>, event: &Event) -> Vec<FsEvent> {
	if matches!(event.kind, EventKind::Access(_) | EventKind::Any | EventKind::Other) {
		return Vec::new();
	}

	let mut registered = registered.lock();
	let mut hits: Vec<(PathBuf, bool)> = Vec::new();
	for changed in &event.paths {
		if let Some(&is_file) = registered.get(changed.as_path()) {
			hits.push((changed.clone(), is_file));
		}
		if let Some(parent) = changed.parent()
			&& registered.get(parent) == Some(&false)
		{
			hits.push((parent.to_owned(), false));
		}
	}
	hits.dedup();

	hits.into_iter()
		.map(|(path, is_file)| {
			let kind = if path.exists() {
				FsEventKind::Changed
			} else {
				registered.remove(&path);
				FsEventKind::Invalidated
			};
			FsEvent { path, is_file, kind }
		})
		.collect()
}
