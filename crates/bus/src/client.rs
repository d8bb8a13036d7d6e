//! Short-lived request sender.

use std::io::Write;
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

use crate::framing::REQUEST_END;
use crate::{BusError, DEFAULT_PORT, Result};

/// Template used by [`TcpClient::send_file`]; `{0}` is the file path.
pub const DEFAULT_FILE_COMMAND: &str = "execfile(\"{0}\")";

/// Client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
	/// Server host name or address.
	pub address: String,
	/// Server port.
	pub port: u16,
	/// Connect and write timeout.
	pub timeout: Duration,
	/// Request terminator; backslash escapes are decoded before use.
	pub connection_end: String,
	/// Template for load-this-file commands.
	pub file_command: String,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			address: "127.0.0.1".to_owned(),
			port: DEFAULT_PORT,
			timeout: Duration::from_secs(5),
			connection_end: REQUEST_END.to_owned(),
			file_command: DEFAULT_FILE_COMMAND.to_owned(),
		}
	}
}

/// Decodes `\n`, `\r`, `\t` and `\\` escapes; other backslashes are kept.
pub fn decode_escapes(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	let mut chars = text.chars();
	while let Some(ch) = chars.next() {
		if ch != '\\' {
			out.push(ch);
			continue;
		}
		match chars.next() {
			Some('n') => out.push('\n'),
			Some('r') => out.push('\r'),
			Some('t') => out.push('\t'),
			Some('\\') => out.push('\\'),
			Some(other) => {
				out.push('\\');
				out.push(other);
			}
			None => out.push('\\'),
		}
	}
	out
}

/// Sends one payload per connection.
#[derive(Debug, Clone, Default)]
pub struct TcpClient {
	config: ClientConfig,
}

impl TcpClient {
	/// Creates a client.
	pub fn new(config: ClientConfig) -> Self {
		Self { config }
	}

	/// Current configuration.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Mutable configuration.
	pub fn config_mut(&mut self) -> &mut ClientConfig {
		&mut self.config
	}

	/// Returns `data` with the terminator appended unless already present.
	pub fn frame(&self, data: &str) -> String {
		let end = decode_escapes(&self.config.connection_end);
		if data.ends_with(&end) { data.to_owned() } else { format!("{data}{end}") }
	}

	/// Connects, writes the framed payload once, and closes.
	pub fn send(&self, data: &str) -> Result<()> {
		let target = format!("{}:{}", self.config.address, self.config.port);
		let payload = self.frame(data);

		let addrs = (self.config.address.as_str(), self.config.port)
			.to_socket_addrs()
			.map_err(|_| BusError::InvalidAddress(target.clone()))?;

		let mut last_error = None;
		let mut stream = None;
		for addr in addrs {
			match TcpStream::connect_timeout(&addr, self.config.timeout) {
				Ok(connected) => {
					stream = Some(connected);
					break;
				}
				Err(error) => last_error = Some(error),
			}
		}
		let mut stream = stream.ok_or_else(|| BusError::Connect {
			addr: target.clone(),
			error: last_error.unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no address resolved")),
		})?;

		let send_err = |error| BusError::Send {
			addr: target.clone(),
			error,
		};
		stream.set_write_timeout(Some(self.config.timeout)).map_err(send_err)?;
		stream.write_all(payload.as_bytes()).map_err(send_err)?;
		stream.flush().map_err(send_err)?;
		if let Err(error) = stream.shutdown(Shutdown::Write) {
			tracing::debug!(addr = %target, %error, "bus.client.shutdown_failed");
		}

		tracing::debug!(addr = %target, len = payload.len(), "bus.client.sent");
		Ok(())
	}

	/// Sends the current editor selection; false when it is empty.
	pub fn send_selection(&self, selection: &str) -> Result<bool> {
		if selection.is_empty() {
			return Ok(false);
		}
		self.send(selection).map(|()| true)
	}

	/// Formats the file command for `path`.
	pub fn file_command(&self, path: &Path) -> String {
		let path = path.to_string_lossy().replace('\\', "/");
		self.config.file_command.replace("{0}", &path)
	}

	/// Asks the server to load and execute `path`.
	pub fn send_file(&self, path: &Path) -> Result<()> {
		self.send(&self.file_command(path))
	}
}

#[cfg(test)]
mod tests;
