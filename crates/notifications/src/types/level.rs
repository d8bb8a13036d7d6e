/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Level {
	/// Informational message.
	#[default]
	Info,
	/// Something the user should look at.
	Warning,
	/// An operation failed.
	Exception,
}

impl Level {
	/// Lowercase name used in logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Info => "info",
			Self::Warning => "warning",
			Self::Exception => "exception",
		}
	}
}
