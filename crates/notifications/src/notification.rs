//! Notification history records.

use std::fmt;
use std::rc::Rc;

use chrono::{DateTime, Local};

use crate::Level;

/// Callback receiving the message of a clicked notifier.
pub type ClickHandler = Rc<dyn Fn(&str)>;

/// A registered notification, as kept in the history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
	/// Monotonic id within the manager.
	pub id: u64,
	/// Message text.
	pub message: String,
	/// Registration time.
	pub timestamp: DateTime<Local>,
	/// Severity.
	pub level: Level,
	/// How long the notifier holds at full opacity, in milliseconds.
	pub duration_ms: u64,
}

/// Renders `notification` as `"<ctime> | '<message>'"`.
pub fn format_notification(notification: &Notification) -> String {
	format!("{} | '{}'", notification.timestamp.format("%a %b %e %H:%M:%S %Y"), notification.message)
}

impl fmt::Display for Notification {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&format_notification(self))
	}
}
