//! Boot, tick and shutdown sequencing.

use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::Rc;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use umbra_actions::{ActionsRegistry, Slot};
use umbra_bus::{DEFAULT_QUEUE_CAPACITY, RequestQueue, request_queue};
use umbra_components::{ComponentManager, FactoryRegistry};
use umbra_layout::{LayoutManager, Window, default_layouts};
use umbra_notifications::{Level, NotificationsManager, NotifyOptions};
use umbra_settings::{DEFAULT_LAYOUTS, SETTINGS_SECTION, SettingsStore};
use umbra_worker::{FsEvent, PathWatcher, WorkerState, WorkerTracker};

use crate::builtins::{REQUISITE_COMPONENTS, install_builtin_components, registered_factories};
use crate::logging::{self, LogFormat, LoggingConfig, LoggingGuard};
use crate::{AppDirs, EngineContext, EngineError, EngineShared, Notice, PatchesManager, Result, Splash};

/// Engine version shown on the splash.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Category of actions owned by the engine itself.
pub const ENGINE_ACTIONS: &str = "Actions|Umbra|Engine";

/// Layout slots the user can store into.
const USER_LAYOUTS: &[&str] = &["one", "two", "three", "four", "five"];

/// Boot parameters, usually filled from the command line.
#[derive(Debug, Clone)]
pub struct EngineOptions {
	/// User application data directory; the platform default when `None`.
	pub user_data_dir: Option<PathBuf>,
	/// Verbosity override; the persisted preference when `None`.
	pub verbosity: Option<i64>,
	/// Logging formatter override; the persisted preference when `None`.
	pub logging_formatter: Option<String>,
	/// Whether to install the logging sinks.
	pub install_logging: bool,
	/// Whether the installed sinks include stdout.
	pub log_to_stdout: bool,
	/// Component search paths besides `<user data>/components`.
	pub component_paths: Vec<PathBuf>,
	/// Components whose failure aborts boot.
	pub requisites: Vec<String>,
	/// Interval between request queue drains.
	pub request_interval: Duration,
	/// How long shutdown waits for background workers.
	pub worker_grace: Duration,
}

impl Default for EngineOptions {
	fn default() -> Self {
		Self {
			user_data_dir: None,
			verbosity: None,
			logging_formatter: None,
			install_logging: true,
			log_to_stdout: true,
			component_paths: Vec::new(),
			requisites: REQUISITE_COMPONENTS.iter().map(|name| (*name).to_owned()).collect(),
			request_interval: Duration::from_millis(125),
			worker_grace: Duration::from_secs(1),
		}
	}
}

/// The running application core.
///
/// Single-threaded: the host calls [`Engine::tick`] from its event loop and
/// [`Engine::shutdown`] once when the user quits.
pub struct Engine {
	shared: Rc<EngineShared>,
	context: EngineContext,
	requests: RequestQueue,
	notices: mpsc::UnboundedReceiver<Notice>,
	fs_events: mpsc::UnboundedReceiver<FsEvent>,
	splash: Box<dyn Splash>,
	requisites: Vec<String>,
	request_interval: Duration,
	since_requests: Duration,
	worker_grace: Duration,
	shut_down: bool,
	logging: Option<LoggingGuard>,
}

impl Engine {
	/// Boots with every factory submitted through `inventory`.
	pub fn boot(options: EngineOptions, window: Box<dyn Window>, splash: Box<dyn Splash>) -> Result<Self> {
		Self::boot_with_factories(options, window, splash, registered_factories())
	}

	/// Boots with an explicit factory table.
	pub fn boot_with_factories(
		options: EngineOptions,
		window: Box<dyn Window>,
		mut splash: Box<dyn Splash>,
		factories: FactoryRegistry<EngineContext>,
	) -> Result<Self> {
		let dirs = match &options.user_data_dir {
			Some(root) => AppDirs::new(root),
			None => AppDirs::platform_default()?,
		};
		dirs.create()?;

		let mut patches = PatchesManager::new(dirs.patches_history_file());
		patches.register_patches()?;
		let patched = patches.apply_patches(&dirs)?;

		let settings = Arc::new(SettingsStore::open(dirs.settings_file())?);
		settings.set_default_layouts(DEFAULT_LAYOUTS, &[]);

		let logging = if options.install_logging {
			let (config, rejected) = logging_config(&options, &settings, &dirs);
			let guard = logging::install(&config)?;
			if let Some(error) = rejected {
				tracing::warn!(%error, fallback = config.format.as_str(), "engine.logging.formatter");
			}
			Some(guard)
		} else {
			None
		};
		tracing::info!(version = VERSION, root = %dirs.root().display(), first_run = settings.is_first_run(), "engine.boot");
		tracing::info!(applied = ?patched.applied, skipped = patched.skipped.len(), "engine.patches");
		splash.show_message(&format!("Umbra - {VERSION} | Initializing interface."));

		install_builtin_components(&dirs.components_dir())?;
		let mut search_paths = vec![dirs.components_dir()];
		search_paths.extend(options.component_paths.iter().cloned());
		let components = ComponentManager::new(search_paths, Arc::clone(&settings), factories);
		let directory = components.directory();

		let (requests_tx, requests) = request_queue(DEFAULT_QUEUE_CAPACITY);
		let (notices_tx, notices) = mpsc::unbounded_channel();
		let shared = Rc::new(EngineShared {
			dirs,
			actions: RefCell::new(ActionsRegistry::new()),
			notifications: RefCell::new(NotificationsManager::new()),
			layouts: RefCell::new(LayoutManager::new(Arc::clone(&settings))),
			settings,
			window: RefCell::new(window),
			components: RefCell::new(components),
			directory,
			workers: WorkerTracker::new(),
			watcher: RefCell::new(None),
			fs_listeners: RefCell::new(Vec::new()),
			requests: requests_tx,
			notices: notices_tx,
			logging: logging.as_ref().map(|guard| guard.handle().clone()),
			request_handler: RefCell::new(None),
			engine_slots: RefCell::new(Vec::new()),
			quit: Cell::new(false),
		});
		let (fs_tx, fs_events) = mpsc::unbounded_channel();
		match PathWatcher::start(shared.workers(), move |event| fs_tx.send(event).is_ok()) {
			Ok(watcher) => *shared.watcher.borrow_mut() = Some(watcher),
			Err(error) => tracing::warn!(%error, "engine.watcher.unavailable"),
		}
		for name in &patched.failed {
			tracing::error!(patch = %name, "engine.patches.failed");
			shared.warnify(format!("'{name}' patch failed to apply!"));
		}
		let context = EngineContext::new(&shared);
		let requisites: Vec<&str> = options.requisites.iter().map(String::as_str).collect();

		splash.show_message(&format!("Umbra - {VERSION} | Initializing Components Manager."));
		let registered = shared.components.borrow_mut().register_components()?;
		tracing::info!(registered, "engine.components.registered");

		let failures = shared.components.borrow_mut().instantiate_components(|profile| {
			splash.show_message(&format!("Umbra - {VERSION} | Instantiating {} Component.", profile.title));
		});
		for (name, error) in failures {
			tracing::warn!(component = %name, %error, "engine.components.instantiate_failed");
			shared.warnify(format!("'{name}' Component failed to instantiate: {error}"));
		}

		splash.show_message(&format!("Umbra - {VERSION} | Activating Components."));
		let report = shared.components.borrow_mut().activate_components(&context, &requisites)?;
		for (name, error) in &report.failed {
			shared.warnify(format!("'{name}' Component failed to activate: {error}"));
		}
		tracing::info!(activated = report.activated.len(), skipped = report.skipped.len(), failed = report.failed.len(), "engine.components.activated");

		splash.show_message(&format!("Umbra - {VERSION} | Starting Components."));
		let failures = shared.components.borrow_mut().startup_components(&requisites)?;
		for (name, error) in failures {
			shared.warnify(format!("'{name}' Component failed to start: {error}"));
		}

		register_engine_actions(&shared, &context)?;
		restore_startup_layout(&shared);
		splash.show_message(&format!("Umbra - {VERSION} | Initialization done."));
		splash.hide();
		tracing::info!("engine.ready");

		Ok(Self {
			shared,
			context,
			requests,
			notices,
			fs_events,
			splash,
			requisites: options.requisites,
			request_interval: options.request_interval,
			since_requests: Duration::ZERO,
			worker_grace: options.worker_grace,
			shut_down: false,
			logging,
		})
	}

	/// Advances timers by `delta`.
	///
	/// Animates notifications, surfaces notices from background threads,
	/// dispatches watched-path events and, every request interval, drains the
	/// request queue and reaps finished workers.
	pub fn tick(&mut self, delta: Duration) {
		self.shared.notifications().tick(delta);
		self.dispatch_fs_events();

		while let Ok(notice) = self.notices.try_recv() {
			let options = NotifyOptions::default().level(notice.level);
			let mut notifications = self.shared.notifications();
			match notice.level {
				Level::Info => notifications.notify(notice.message, options),
				Level::Warning => notifications.warnify(notice.message, options),
				Level::Exception => notifications.exceptify(notice.message, options),
			};
		}
		for notification in self.shared.notifications().take_registered() {
			tracing::debug!(id = notification.id, level = ?notification.level, message = %notification.message, "engine.notification");
		}
		for event in self.shared.layouts().take_events() {
			tracing::debug!(?event, "engine.layout.event");
		}

		self.since_requests += delta;
		if self.since_requests >= self.request_interval {
			self.since_requests = Duration::ZERO;
			self.process_requests();
			let reaped = self.shared.workers().reap();
			for name in reaped.panicked {
				self.shared.warnify(format!("'{name}' worker panicked!"));
			}
		}
	}

	fn dispatch_fs_events(&mut self) {
		let mut events: Vec<FsEvent> = Vec::new();
		while let Ok(event) = self.fs_events.try_recv() {
			if events.last() != Some(&event) {
				events.push(event);
			}
		}
		if events.is_empty() {
			return;
		}
		let listeners = self.shared.fs_listeners();
		for event in &events {
			for listener in &listeners {
				listener(event);
			}
		}
	}

	/// Hands every queued request to the request handler; returns the count.
	///
	/// Requests are dropped with a warning while no handler is attached.
	pub fn process_requests(&mut self) -> usize {
		let requests = self.requests.drain();
		if requests.is_empty() {
			return 0;
		}
		let handler = self.shared.request_handler.borrow().clone();
		let Some(handler) = handler else {
			tracing::warn!(dropped = requests.len(), "engine.requests.no_handler");
			return 0;
		};
		for request in &requests {
			handler(request);
		}
		tracing::debug!(count = requests.len(), "engine.requests.processed");
		requests.len()
	}

	/// Triggers the action at `path`.
	pub fn trigger_action(&self, path: &str) -> Result<bool> {
		let action = self.shared.actions().get_action(path)?;
		Ok(action.trigger())
	}

	/// Triggers the action bound to `shortcut`; false if none is bound.
	pub fn trigger_shortcut(&self, shortcut: &str) -> Result<bool> {
		let action = {
			let actions = self.shared.actions();
			let shortcut = umbra_actions::Shortcut::from_str(shortcut)?;
			actions.shortcut_action(&shortcut)
		};
		Ok(action.is_some_and(|action| action.trigger()))
	}

	/// Whether the quit action ran.
	pub fn quit_requested(&self) -> bool {
		self.shared.quit_requested()
	}

	/// Context handed to components.
	pub fn context(&self) -> &EngineContext {
		&self.context
	}

	/// Engine state.
	pub fn shared(&self) -> &Rc<EngineShared> {
		&self.shared
	}

	/// Shows a boot-style progress message on the splash.
	pub fn show_message(&mut self, message: &str) {
		self.splash.show_message(message);
	}

	/// Components whose failure aborts boot.
	pub fn requisites(&self) -> &[String] {
		&self.requisites
	}

	/// Shuts the engine down.
	///
	/// Components declaring `on_close` may veto, in which case nothing else
	/// happens. Otherwise the startup layout is stored, components are torn
	/// down in reverse order, settings are flushed, workers are joined and
	/// the logging sinks are removed.
	pub fn shutdown(&mut self) -> Result<()> {
		if self.shut_down {
			return Err(EngineError::ShutDown);
		}
		let veto = match self.shared.components() {
			Some(mut manager) => manager.close_components(),
			None => return Err(EngineError::ShutdownVetoed("components manager".to_owned())),
		};
		if let Some(component) = veto {
			self.shared.quit.set(false);
			return Err(EngineError::ShutdownVetoed(component));
		}
		tracing::info!("engine.shutdown");
		self.shut_down = true;

		store_startup_layout(&self.shared);
		let failures = self.shared.components.borrow_mut().teardown();
		for (name, error) in failures {
			tracing::warn!(component = %name, %error, "engine.teardown_failed");
		}
		self.shared.engine_slots.borrow_mut().clear();
		self.shared.set_request_handler(None);

		if let Err(error) = self.shared.settings().sync() {
			tracing::error!(%error, "engine.settings.sync_failed");
		}
		drop(self.shared.watcher.borrow_mut().take());
		self.shared.fs_listeners.borrow_mut().clear();
		for record in self.shared.workers().registry().snapshots() {
			if record.state == WorkerState::Running {
				tracing::debug!(worker = %record.name, id = record.id, elapsed = ?record.started_at.elapsed(), "engine.workers.running");
			}
		}
		let report = self.shared.workers().shutdown(self.worker_grace);
		tracing::info!(joined = report.joined, panicked = report.panicked.len(), detached = report.detached.len(), "engine.workers.shutdown");
		tracing::info!("engine.shutdown.done");
		self.logging = None;
		Ok(())
	}
}

/// Resolves the sinks from options and preferences; also returns the
/// rejection of an unknown formatter name.
fn logging_config(options: &EngineOptions, settings: &SettingsStore, dirs: &AppDirs) -> (LoggingConfig, Option<String>) {
	let verbosity = options
		.verbosity
		.or_else(|| settings.get_key(SETTINGS_SECTION, "verbosityLevel").to_int())
		.unwrap_or(3);
	let formatter = options
		.logging_formatter
		.clone()
		.or_else(|| settings.get_key(SETTINGS_SECTION, "loggingFormatter").to_text())
		.unwrap_or_default();
	let (format, rejected) = match LogFormat::from_str(&formatter) {
		Ok(format) => (format, None),
		Err(error) => (LogFormat::default(), Some(error)),
	};
	let config = LoggingConfig {
		verbosity,
		format,
		stdout: options.log_to_stdout,
		directory: Some(dirs.logging_dir()),
	};
	(config, rejected)
}

/// Registers the quit action and the stock layouts with their actions.
fn register_engine_actions(shared: &Rc<EngineShared>, context: &EngineContext) -> Result<()> {
	let mut slots: Vec<Slot> = Vec::new();
	let mut actions = shared.actions();

	let quit_context = context.clone();
	let quit: Slot = Rc::new(move || {
		if let Ok(shared) = quit_context.shared() {
			shared.request_quit();
		}
	});
	actions.register_action(&format!("{ENGINE_ACTIONS}|Quit"), Some("Ctrl+Q"), Some(&quit))?;
	slots.push(quit);

	let mut layouts = shared.layouts();
	for layout in default_layouts() {
		let identity = layout.identity.clone();
		let restore_context = context.clone();
		let restore: Slot = Rc::new({
			let identity = identity.clone();
			move || {
				if let Ok(shared) = restore_context.shared() {
					restore_layout(&shared, &identity);
				}
			}
		});
		actions.register_action(
			&format!("{ENGINE_ACTIONS}|Layouts|Restore {}", layout.name),
			layout.shortcut.as_deref(),
			Some(&restore),
		)?;
		slots.push(restore);

		if let Some(key) = layout.shortcut.as_deref().filter(|_| USER_LAYOUTS.contains(&identity.as_str())) {
			let store_context = context.clone();
			let store: Slot = Rc::new({
				let identity = identity.clone();
				move || {
					if let Ok(shared) = store_context.shared() {
						store_layout(&shared, &identity);
					}
				}
			});
			actions.register_action(&format!("{ENGINE_ACTIONS}|Layouts|Store {}", layout.name), Some(&format!("Ctrl+{key}")), Some(&store))?;
			slots.push(store);
		}
		layouts.register_layout(layout)?;
	}
	drop(layouts);
	drop(actions);

	shared.engine_slots.borrow_mut().extend(slots);
	Ok(())
}

/// Restores `identity` onto the main window, notifying the outcome.
pub fn restore_layout(shared: &EngineShared, identity: &str) -> bool {
	let widgets = shared.window().dock_widgets();
	let restored = {
		let mut window = shared.window();
		shared.layouts().restore_layout(identity, &mut **window, &widgets)
	};
	match restored {
		Ok(true) => {
			shared.notify(format!("'{identity}' layout has been restored!"));
			true
		}
		Ok(false) => {
			shared.warnify(format!("'{identity}' layout has not been stored yet!"));
			false
		}
		Err(error) => {
			shared.warnify(format!("'{identity}' layout cannot be restored: {error}"));
			false
		}
	}
}

/// Stores the main window into `identity`, notifying the outcome.
pub fn store_layout(shared: &EngineShared, identity: &str) -> bool {
	let stored = {
		let window = shared.window();
		shared.layouts().store_layout(identity, &**window)
	};
	match stored {
		Ok(stored) => {
			if stored {
				shared.notify(format!("'{identity}' layout has been stored!"));
			}
			stored
		}
		Err(error) => {
			shared.warnify(format!("'{identity}' layout cannot be stored: {error}"));
			false
		}
	}
}

fn restore_startup_layout(shared: &EngineShared) {
	let widgets = shared.window().dock_widgets();
	let mut window = shared.window();
	match shared.layouts().restore_startup_layout(&mut **window, &widgets) {
		Ok(true) => tracing::debug!("engine.layout.startup_restored"),
		Ok(false) => tracing::debug!("engine.layout.no_startup"),
		Err(error) => tracing::warn!(%error, "engine.layout.startup_failed"),
	}
}

fn store_startup_layout(shared: &EngineShared) {
	let window = shared.window();
	if let Err(error) = shared.layouts().store_startup_layout(&**window) {
		tracing::warn!(%error, "engine.layout.store_startup_failed");
	}
}

#[cfg(test)]
mod tests;
