//! Logging sinks: stdout, the session ring buffer and a per-session file.
//!
//! [`install`] builds a `tracing-subscriber` registry with a reloadable
//! level filter and installs it as the scoped default of the calling thread.
//! Worker threads spawned through `umbra-worker` inherit it. Dropping the
//! returned [`LoggingGuard`] removes the handlers.

mod ring_buffer;

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use tracing::level_filters::LevelFilter;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{Registry, fmt, reload};

pub use self::ring_buffer::{LOG_BUFFER_CAPACITY, LogEntry, LogRingBuffer, RingBufferLayer};
use crate::{EngineError, Result};

/// Session log files kept in the logging directory.
pub const MAX_LOG_FILES: usize = 10;

const LOG_FILE_PREFIX: &str = "umbra_";
const LOG_FILE_SUFFIX: &str = ".log";

/// Maps a verbosity level to a filter: 0 and 1 error, 2 warn, 3 info, 4 debug.
pub fn verbosity_filter(level: i64) -> LevelFilter {
	match level {
		..=1 => LevelFilter::ERROR,
		2 => LevelFilter::WARN,
		3 => LevelFilter::INFO,
		_ => LevelFilter::DEBUG,
	}
}

/// Stdout line layouts selectable by name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
	/// Level, target and message.
	#[default]
	Default,
	/// Adds thread names, source file and line.
	Extended,
	/// Single compact line without target.
	Standard,
}

impl LogFormat {
	/// Settings spelling.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Default => "Default",
			Self::Extended => "Extended",
			Self::Standard => "Standard",
		}
	}
}

impl FromStr for LogFormat {
	type Err = String;

	fn from_str(name: &str) -> std::result::Result<Self, Self::Err> {
		match name.trim().to_ascii_lowercase().as_str() {
			"default" => Ok(Self::Default),
			"extended" => Ok(Self::Extended),
			"standard" => Ok(Self::Standard),
			other => Err(format!("unknown logging formatter '{other}'")),
		}
	}
}

/// Which sinks to install.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
	/// Verbosity level, 0..=4.
	pub verbosity: i64,
	/// Stdout layout.
	pub format: LogFormat,
	/// Whether to write to stdout at all.
	pub stdout: bool,
	/// Directory receiving `umbra_<n>.log`; no file sink when `None`.
	pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			verbosity: 3,
			format: LogFormat::Default,
			stdout: true,
			directory: None,
		}
	}
}

/// Run-time control over installed sinks.
#[derive(Clone)]
pub struct LoggingHandle {
	filter: reload::Handle<LevelFilter, Registry>,
	buffer: Arc<LogRingBuffer>,
	file: Option<PathBuf>,
}

impl LoggingHandle {
	/// Applies a new verbosity level; false when the subscriber is gone.
	pub fn set_verbosity(&self, level: i64) -> bool {
		let filter = verbosity_filter(level);
		match self.filter.reload(filter) {
			Ok(()) => {
				tracing::info!(level, %filter, "logging.verbosity");
				true
			}
			Err(error) => {
				tracing::warn!(%error, "logging.verbosity.failed");
				false
			}
		}
	}

	/// The session ring buffer.
	pub fn buffer(&self) -> &Arc<LogRingBuffer> {
		&self.buffer
	}

	/// The session log file, if a file sink is installed.
	pub fn file(&self) -> Option<&Path> {
		self.file.as_deref()
	}
}

impl std::fmt::Debug for LoggingHandle {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LoggingHandle").field("file", &self.file).finish_non_exhaustive()
	}
}

/// Keeps the sinks installed on the current thread.
pub struct LoggingGuard {
	handle: LoggingHandle,
	_default: DefaultGuard,
}

impl LoggingGuard {
	/// Control handle for the installed sinks.
	pub fn handle(&self) -> &LoggingHandle {
		&self.handle
	}
}

/// Installs the configured sinks as this thread's default subscriber.
pub fn install(config: &LoggingConfig) -> Result<LoggingGuard> {
	let (filter, filter_handle) = reload::Layer::new(verbosity_filter(config.verbosity));
	let buffer = Arc::new(LogRingBuffer::default());

	let (file_layer, file) = match &config.directory {
		Some(dir) => {
			let path = next_log_file(dir)?;
			let file = File::create(&path).map_err(|error| EngineError::Logging(format!("{}: {error}", path.display())))?;
			(Some(fmt::layer().with_ansi(false).with_writer(Arc::new(file))), Some(path))
		}
		None => (None, None),
	};
	let stdout = config.stdout.then_some(config.format);

	let subscriber = tracing_subscriber::registry()
		.with(filter)
		.with((stdout == Some(LogFormat::Default)).then(fmt::layer))
		.with((stdout == Some(LogFormat::Extended)).then(|| {
			fmt::layer().with_thread_names(true).with_file(true).with_line_number(true)
		}))
		.with((stdout == Some(LogFormat::Standard)).then(|| fmt::layer().compact().with_target(false)))
		.with(RingBufferLayer::new(buffer.clone()))
		.with(file_layer);

	let guard = tracing::subscriber::set_default(subscriber);
	tracing::debug!(verbosity = config.verbosity, format = config.format.as_str(), file = ?file, "logging.install");
	Ok(LoggingGuard {
		handle: LoggingHandle {
			filter: filter_handle,
			buffer,
			file,
		},
		_default: guard,
	})
}

/// Picks the next `umbra_<n>.log` in `dir` and prunes old sessions so at
/// most [`MAX_LOG_FILES`] remain once it is created.
fn next_log_file(dir: &Path) -> Result<PathBuf> {
	let logging_err = |error: std::io::Error| EngineError::Logging(format!("{}: {error}", dir.display()));
	fs::create_dir_all(dir).map_err(logging_err)?;

	let mut sessions: Vec<u64> = fs::read_dir(dir)
		.map_err(logging_err)?
		.filter_map(|entry| entry.ok())
		.filter_map(|entry| session_index(&entry.file_name().to_string_lossy()))
		.collect();
	sessions.sort_unstable();

	let next = sessions.last().map_or(1, |last| last + 1);
	let excess = (sessions.len() + 1).saturating_sub(MAX_LOG_FILES);
	for index in &sessions[..excess] {
		let stale = dir.join(format!("{LOG_FILE_PREFIX}{index}{LOG_FILE_SUFFIX}"));
		if let Err(error) = fs::remove_file(&stale) {
			tracing::warn!(path = %stale.display(), %error, "logging.prune.failed");
		}
	}
	Ok(dir.join(format!("{LOG_FILE_PREFIX}{next}{LOG_FILE_SUFFIX}")))
}

fn session_index(file_name: &str) -> Option<u64> {
	file_name.strip_prefix(LOG_FILE_PREFIX)?.strip_suffix(LOG_FILE_SUFFIX)?.parse().ok()
}
