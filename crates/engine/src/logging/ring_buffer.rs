//! Session log ring buffer and the layer feeding it.

use std::collections::VecDeque;
use std::fmt::Write as _;

use parking_lot::RwLock;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;

/// Entries retained by the session buffer.
pub const LOG_BUFFER_CAPACITY: usize = 1000;

/// One captured event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
	/// Severity.
	pub level: Level,
	/// Emitting module.
	pub target: String,
	/// Message followed by `key=value` fields.
	pub message: String,
}

impl std::fmt::Display for LogEntry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:<5} {}: {}", self.level, self.target, self.message)
	}
}

/// Bounded, thread-safe buffer of recent log entries.
#[derive(Debug)]
pub struct LogRingBuffer {
	entries: RwLock<VecDeque<LogEntry>>,
	capacity: usize,
}

impl Default for LogRingBuffer {
	fn default() -> Self {
		Self::with_capacity(LOG_BUFFER_CAPACITY)
	}
}

impl LogRingBuffer {
	/// Creates a buffer keeping at most `capacity` entries.
	pub fn with_capacity(capacity: usize) -> Self {
		Self {
			entries: RwLock::new(VecDeque::with_capacity(capacity.min(LOG_BUFFER_CAPACITY))),
			capacity: capacity.max(1),
		}
	}

	/// Appends `entry`, evicting the oldest at capacity.
	pub fn push(&self, entry: LogEntry) {
		let mut entries = self.entries.write();
		if entries.len() >= self.capacity {
			entries.pop_front();
		}
		entries.push_back(entry);
	}

	/// Snapshot, oldest first.
	pub fn entries(&self) -> Vec<LogEntry> {
		self.entries.read().iter().cloned().collect()
	}

	/// Snapshot rendered one entry per line.
	pub fn lines(&self) -> Vec<String> {
		self.entries.read().iter().map(ToString::to_string).collect()
	}

	/// Number of entries held.
	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	/// Returns true when nothing was captured.
	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}

	/// Drops every entry.
	pub fn clear(&self) {
		self.entries.write().clear();
	}
}

/// Layer writing every event into a [`LogRingBuffer`].
pub struct RingBufferLayer {
	buffer: std::sync::Arc<LogRingBuffer>,
}

impl RingBufferLayer {
	/// Creates a layer feeding `buffer`.
	pub fn new(buffer: std::sync::Arc<LogRingBuffer>) -> Self {
		Self { buffer }
	}
}

#[derive(Default)]
struct MessageVisitor {
	message: String,
	fields: String,
}

impl MessageVisitor {
	fn field(&mut self, name: &str, value: std::fmt::Arguments<'_>) {
		if !self.fields.is_empty() {
			self.fields.push(' ');
		}
		let _ = write!(self.fields, "{name}={value}");
	}
}

impl Visit for MessageVisitor {
	fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
		if field.name() == "message" {
			self.message = format!("{value:?}");
		} else {
			self.field(field.name(), format_args!("{value:?}"));
		}
	}

	fn record_str(&mut self, field: &Field, value: &str) {
		if field.name() == "message" {
			self.message = value.to_owned();
		} else {
			self.field(field.name(), format_args!("{value}"));
		}
	}
}

impl<S: Subscriber> tracing_subscriber::Layer<S> for RingBufferLayer {
	fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
		let mut visitor = MessageVisitor::default();
		event.record(&mut visitor);
		let message = match (visitor.message.is_empty(), visitor.fields.is_empty()) {
			(true, _) => visitor.fields,
			(false, true) => visitor.message,
			(false, false) => format!("{} {{{}}}", visitor.message, visitor.fields),
		};
		self.buffer.push(LogEntry {
			level: *event.metadata().level(),
			target: event.metadata().target().to_owned(),
			message,
		});
	}
}
