//! Sentinel-delimited request framing.
//!
//! A stream is a sequence of `payload <!RE>` frames. `<!SS>` anywhere asks
//! the server to shut down. Chunks are appended to one buffer holding every
//! unconsumed byte, so a sentinel straddling any number of chunk boundaries
//! is always found. Searches resume where the previous one stopped, minus
//! one sentinel length, so each byte is scanned a bounded number of times.

use thiserror::Error;

/// Terminates one request.
pub const REQUEST_END: &str = "<!RE>";

/// Asks the server to shut down.
pub const SERVER_SHUTDOWN: &str = "<!SS>";

/// Socket read size.
pub const CHUNK_SIZE: usize = 1024;

/// A decoded unit of the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
	/// A complete request payload, sentinel stripped.
	Request(String),
	/// The shutdown sentinel.
	Shutdown,
}

/// Framing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
	/// Unterminated data grew past the configured limit.
	#[error("request exceeds {limit} bytes without a terminator")]
	Oversized {
		/// The configured limit.
		limit: usize,
	},
}

/// Incremental decoder for the request stream.
#[derive(Debug)]
pub struct RequestFramer {
	buffer: Vec<u8>,
	/// Prefix of `buffer` known to hold no sentinel start.
	scanned: usize,
	max_len: usize,
	shutdown: bool,
}

impl RequestFramer {
	/// Creates a framer that rejects more than `max_len` unterminated bytes.
	pub fn new(max_len: usize) -> Self {
		Self {
			buffer: Vec::with_capacity(CHUNK_SIZE * 2),
			scanned: 0,
			max_len,
			shutdown: false,
		}
	}

	/// Appends `chunk` and returns every frame it completes.
	///
	/// After [`Frame::Shutdown`] is produced all further input is ignored.
	pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<Frame>, FrameError> {
		if self.shutdown {
			return Ok(Vec::new());
		}
		self.buffer.extend_from_slice(chunk);

		let mut frames = Vec::new();
		loop {
			let from = self.scanned.saturating_sub(SENTINEL_LEN - 1);
			let request = find(&self.buffer, REQUEST_END.as_bytes(), from);
			let shutdown = find(&self.buffer, SERVER_SHUTDOWN.as_bytes(), from);
			match (request, shutdown) {
				(_, Some(stop)) if request.is_none_or(|end| stop < end) => {
					self.shutdown = true;
					self.buffer.clear();
					self.scanned = 0;
					frames.push(Frame::Shutdown);
					return Ok(frames);
				}
				(Some(end), _) => {
					let payload = decode(&self.buffer[..end]);
					self.buffer.drain(..end + REQUEST_END.len());
					self.scanned = 0;
					frames.push(Frame::Request(payload));
				}
				_ => {
					self.scanned = self.buffer.len();
					break;
				}
			}
		}

		if self.buffer.len() > self.max_len {
			return Err(FrameError::Oversized { limit: self.max_len });
		}
		Ok(frames)
	}

	/// Bytes received after the last terminator.
	pub fn residue(&self) -> &[u8] {
		&self.buffer
	}

	/// Returns true once the shutdown sentinel was seen.
	pub const fn is_shutdown(&self) -> bool {
		self.shutdown
	}
}

impl Default for RequestFramer {
	fn default() -> Self {
		Self::new(16 * 1024 * 1024)
	}
}

const SENTINEL_LEN: usize = REQUEST_END.len();
const _: () = assert!(REQUEST_END.len() == SERVER_SHUTDOWN.len());

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
	haystack
		.get(from..)?
		.windows(needle.len())
		.position(|window| window == needle)
		.map(|at| at + from)
}

fn decode(bytes: &[u8]) -> String {
	match std::str::from_utf8(bytes) {
		Ok(text) => text.to_owned(),
		Err(error) => {
			tracing::warn!(%error, len = bytes.len(), "bus.framing.invalid_utf8");
			String::from_utf8_lossy(bytes).into_owned()
		}
	}
}

#[cfg(test)]
mod tests;
