//! Umbra application core.
//!
//! [`Engine::boot`] prepares the user data directory, applies pending
//! patches, loads settings, installs logging, discovers and activates
//! components, and restores the startup layout. The host then drives [`Engine::tick`] from its event loop
//! and calls [`Engine::shutdown`] when the user quits.
//!
//! Components reach the engine through the [`EngineContext`] they receive at
//! activation. Everything here runs on the UI thread; background threads
//! communicate through the request queue and [`Notice`]s.

#![warn(missing_docs)]

mod builtins;
mod context;
mod engine;
mod error;
mod logging;
mod patches;
mod paths;
mod splash;

pub use builtins::{
	ActionEvaluator, ComponentFactoryReg, ComponentRow, ComponentsManagerUi, ConsoleEntry, Evaluation, Evaluator,
	PreferencesManager, REQUISITE_COMPONENTS, ScriptEditor, TcpClientComponent, TcpServerComponent, component_action,
	install_builtin_components, registered_factories,
};
pub use context::{EngineContext, EngineShared, FsListener, Notice, NoticeSender, RequestHandler};
pub use engine::{ENGINE_ACTIONS, Engine, EngineOptions, VERSION, restore_layout, store_layout};
pub use error::{EngineError, Result};
pub use logging::{
	LOG_BUFFER_CAPACITY, LogEntry, LogFormat, LogRingBuffer, LoggingConfig, LoggingGuard, LoggingHandle, MAX_LOG_FILES,
	RingBufferLayer, install as install_logging, verbosity_filter,
};
pub use patches::{PATCHES_HISTORY_FILE, PatchError, PatchReg, PatchReport, PatchesManager};
pub use paths::{APPLICATION_DIRECTORY, AppDirs, SETTINGS_FILE};
pub use splash::{LogSplash, NoSplash, Splash};

// Re-exported so components can submit factories without a direct dependency.
pub use inventory;
