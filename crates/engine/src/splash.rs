//! Boot progress reporting.

/// Receives progress messages while the engine boots.
pub trait Splash {
	/// Shows `message`.
	fn show_message(&mut self, message: &str);

	/// Boot finished; the splash goes away.
	fn hide(&mut self) {}
}

/// Splash that writes each message to the log.
#[derive(Debug, Default)]
pub struct LogSplash {
	messages: Vec<String>,
}

impl LogSplash {
	/// Messages shown so far.
	pub fn messages(&self) -> &[String] {
		&self.messages
	}
}

impl Splash for LogSplash {
	fn show_message(&mut self, message: &str) {
		tracing::info!(target: "umbra::splash", "{message}");
		self.messages.push(message.to_owned());
	}
}

/// Splash that shows nothing, for `--hideSplashScreen`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSplash;

impl Splash for NoSplash {
	fn show_message(&mut self, _message: &str) {}
}
