//! State shared between the engine and its components.

use std::cell::{Cell, RefCell, RefMut};
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};
use std::sync::Arc;

use tokio::sync::mpsc;
use umbra_actions::{ActionsRegistry, Slot};
use umbra_bus::{Request, RequestSender};
use umbra_components::{ComponentDirectory, ComponentError, ComponentManager};
use umbra_layout::{LayoutManager, Window};
use umbra_notifications::{Level, NotificationsManager, NotifyOptions};
use umbra_settings::SettingsStore;
use umbra_worker::{FsEvent, PathWatcher, WatchError, WorkerTracker};

use crate::{AppDirs, LoggingHandle};

/// Receives each request drained from the FIFO.
pub type RequestHandler = Rc<dyn Fn(&Request)>;

/// Receives each watched-path event on the UI thread.
pub type FsListener = Rc<dyn Fn(&FsEvent)>;

/// A message posted from a background thread, shown on the next tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
	/// Notification level.
	pub level: Level,
	/// Message text.
	pub message: String,
}

impl Notice {
	/// Informational notice.
	pub fn info(message: impl Into<String>) -> Self {
		Self {
			level: Level::Info,
			message: message.into(),
		}
	}

	/// Warning notice.
	pub fn warning(message: impl Into<String>) -> Self {
		Self {
			level: Level::Warning,
			message: message.into(),
		}
	}
}

/// Thread-safe producer of [`Notice`]s.
pub type NoticeSender = mpsc::UnboundedSender<Notice>;

/// Everything the engine owns, reachable from components through
/// [`EngineContext`].
///
/// UI-thread only. Borrow guards returned here must not be held across calls
/// into other components.
pub struct EngineShared {
	pub(crate) dirs: AppDirs,
	pub(crate) settings: Arc<SettingsStore>,
	pub(crate) actions: RefCell<ActionsRegistry>,
	pub(crate) notifications: RefCell<NotificationsManager>,
	pub(crate) layouts: RefCell<LayoutManager>,
	pub(crate) window: RefCell<Box<dyn Window>>,
	pub(crate) components: RefCell<ComponentManager<EngineContext>>,
	pub(crate) directory: ComponentDirectory<EngineContext>,
	pub(crate) workers: WorkerTracker,
	pub(crate) watcher: RefCell<Option<PathWatcher>>,
	pub(crate) fs_listeners: RefCell<Vec<Weak<dyn Fn(&FsEvent)>>>,
	pub(crate) requests: RequestSender,
	pub(crate) notices: NoticeSender,
	pub(crate) logging: Option<LoggingHandle>,
	pub(crate) request_handler: RefCell<Option<RequestHandler>>,
	pub(crate) engine_slots: RefCell<Vec<Slot>>,
	pub(crate) quit: Cell<bool>,
}

impl EngineShared {
	/// User application data directories.
	pub fn dirs(&self) -> &AppDirs {
		&self.dirs
	}

	/// The settings store.
	pub fn settings(&self) -> &Arc<SettingsStore> {
		&self.settings
	}

	/// The actions registry.
	pub fn actions(&self) -> RefMut<'_, ActionsRegistry> {
		self.actions.borrow_mut()
	}

	/// The notifications manager.
	pub fn notifications(&self) -> RefMut<'_, NotificationsManager> {
		self.notifications.borrow_mut()
	}

	/// The layout manager.
	pub fn layouts(&self) -> RefMut<'_, LayoutManager> {
		self.layouts.borrow_mut()
	}

	/// The main window.
	pub fn window(&self) -> RefMut<'_, Box<dyn Window>> {
		self.window.borrow_mut()
	}

	/// The component manager; not reachable while a lifecycle pass runs.
	pub fn components(&self) -> Option<RefMut<'_, ComponentManager<EngineContext>>> {
		self.components.try_borrow_mut().ok()
	}

	/// Sibling lookup, usable from inside lifecycle hooks.
	pub fn directory(&self) -> &ComponentDirectory<EngineContext> {
		&self.directory
	}

	/// Background worker tracker.
	pub fn workers(&self) -> &WorkerTracker {
		&self.workers
	}

	/// Starts reporting changes to `path`; returns its canonical form.
	pub fn watch_path(&self, path: &Path) -> Result<PathBuf, WatchError> {
		self.watcher.borrow_mut().as_mut().ok_or(WatchError::Stopped)?.register_path(path)
	}

	/// Stops reporting changes to `path`.
	pub fn unwatch_path(&self, path: &Path) -> Result<(), WatchError> {
		self.watcher.borrow_mut().as_mut().ok_or(WatchError::Stopped)?.unregister_path(path)
	}

	/// Whether `path` is watched.
	pub fn is_path_watched(&self, path: &Path) -> bool {
		self.watcher.borrow().as_ref().is_some_and(|watcher| watcher.is_path_registered(path))
	}

	/// Watched paths in sorted order.
	pub fn watched_paths(&self) -> Vec<PathBuf> {
		self.watcher.borrow().as_ref().map(PathWatcher::list_paths).unwrap_or_default()
	}

	/// Subscribes `listener` to watched-path events.
	///
	/// Only a weak reference is kept; dropping the last strong one
	/// unsubscribes.
	pub fn add_fs_listener(&self, listener: &FsListener) {
		self.fs_listeners.borrow_mut().push(Rc::downgrade(listener));
	}

	/// Live listeners, pruning dropped ones.
	pub(crate) fn fs_listeners(&self) -> Vec<FsListener> {
		let mut listeners = self.fs_listeners.borrow_mut();
		listeners.retain(|listener| listener.strong_count() > 0);
		listeners.iter().filter_map(Weak::upgrade).collect()
	}

	/// Producer side of the requests FIFO.
	pub fn requests(&self) -> &RequestSender {
		&self.requests
	}

	/// Producer of notices for background threads.
	pub fn notices(&self) -> &NoticeSender {
		&self.notices
	}

	/// Logging control, when the engine installed sinks.
	pub fn logging(&self) -> Option<&LoggingHandle> {
		self.logging.as_ref()
	}

	/// Routes drained requests to `handler`; `None` detaches.
	pub fn set_request_handler(&self, handler: Option<RequestHandler>) {
		*self.request_handler.borrow_mut() = handler;
	}

	/// Whether a request handler is attached.
	pub fn has_request_handler(&self) -> bool {
		self.request_handler.borrow().is_some()
	}

	/// Asks the host loop to shut down.
	pub fn request_quit(&self) {
		tracing::info!("engine.quit_requested");
		self.quit.set(true);
	}

	/// Whether shutdown was requested.
	pub fn quit_requested(&self) -> bool {
		self.quit.get()
	}

	/// Shows an informational notification.
	pub fn notify(&self, message: impl Into<String>) {
		self.notifications().notify(message, NotifyOptions::default());
	}

	/// Shows a warning notification.
	pub fn warnify(&self, message: impl Into<String>) {
		self.notifications().warnify(message, NotifyOptions::default());
	}
}

/// Non-owning handle to the engine handed to components at activation.
#[derive(Clone)]
pub struct EngineContext {
	shared: Weak<EngineShared>,
}

impl EngineContext {
	pub(crate) fn new(shared: &Rc<EngineShared>) -> Self {
		Self {
			shared: Rc::downgrade(shared),
		}
	}

	/// The engine, while it is alive.
	pub fn shared(&self) -> Result<Rc<EngineShared>, ComponentError> {
		self.shared.upgrade().ok_or_else(|| ComponentError::failed("engine is gone"))
	}

	/// Whether the engine is still alive.
	pub fn is_alive(&self) -> bool {
		self.shared.strong_count() > 0
	}
}

impl std::fmt::Debug for EngineContext {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EngineContext").field("alive", &self.is_alive()).finish()
	}
}
