//! Background TCP server feeding the requests FIFO.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio_util::sync::CancellationToken;
use umbra_worker::{TaskClass, WorkerJoinSet, spawn_named_thread};

use crate::framing::{CHUNK_SIZE, Frame, RequestFramer};
use crate::{BusError, DEFAULT_PORT, Request, RequestSender, Result, primary_address};

/// Observable server state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
	/// Not listening.
	Offline,
	/// Accept loop running.
	Running,
}

/// Validates a port number from settings.
pub fn validate_port(port: i64) -> Result<u16> {
	u16::try_from(port).map_err(|_| BusError::InvalidPort(port))
}

/// Server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
	/// Bind address.
	pub address: IpAddr,
	/// Bind port; 0 picks an ephemeral port.
	pub port: u16,
	/// Idle time after which a silent connection is closed.
	pub read_timeout: Duration,
	/// How long `stop(false)` waits for in-flight handlers.
	pub grace: Duration,
	/// Largest unterminated payload accepted per connection.
	pub max_request_bytes: usize,
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			address: primary_address(),
			port: DEFAULT_PORT,
			read_timeout: Duration::from_secs(5),
			grace: Duration::from_secs(1),
			max_request_bytes: 16 * 1024 * 1024,
		}
	}
}

struct Shared {
	config: ServerConfig,
	requests: RequestSender,
	cancel: CancellationToken,
	terminate: AtomicBool,
	online: AtomicBool,
}

struct Running {
	shared: Arc<Shared>,
	local_addr: SocketAddr,
	thread: JoinHandle<()>,
}

/// TCP endpoint accepting framed requests.
///
/// `Offline -> start() -> Running -> stop() -> Offline`. Receipt of the
/// shutdown sentinel moves the server to `Offline` on its own; a later
/// [`TcpServer::stop`] or [`TcpServer::start`] reaps the finished thread.
pub struct TcpServer {
	config: ServerConfig,
	requests: RequestSender,
	running: Option<Running>,
}

impl TcpServer {
	/// Creates an offline server that will feed `requests`.
	pub fn new(config: ServerConfig, requests: RequestSender) -> Self {
		Self {
			config,
			requests,
			running: None,
		}
	}

	/// Current configuration.
	pub fn config(&self) -> &ServerConfig {
		&self.config
	}

	/// Replaces the configuration; takes effect at the next start.
	pub fn set_config(&mut self, config: ServerConfig) {
		self.config = config;
	}

	/// Current state.
	pub fn state(&self) -> ServerState {
		match &self.running {
			Some(running) if running.shared.online.load(Ordering::Acquire) => ServerState::Running,
			_ => ServerState::Offline,
		}
	}

	/// Returns true while the accept loop runs.
	pub fn is_online(&self) -> bool {
		self.state() == ServerState::Running
	}

	/// Bound address while running.
	pub fn local_addr(&self) -> Option<SocketAddr> {
		self.running.as_ref().filter(|_| self.is_online()).map(|running| running.local_addr)
	}

	/// Binds the listener and spawns the accept loop.
	///
	/// Binding happens before this returns, so an address in use is reported
	/// here and the server stays offline.
	pub fn start(&mut self) -> Result<SocketAddr> {
		if let Some(addr) = self.local_addr() {
			return Err(BusError::AlreadyRunning(addr));
		}
		self.reap();

		let addr = SocketAddr::new(self.config.address, self.config.port);
		let runtime = tokio::runtime::Builder::new_current_thread().enable_io().enable_time().build().map_err(BusError::Worker)?;
		let listener = runtime.block_on(async { bind(addr) }).map_err(|error| BusError::Bind { addr, error })?;
		let local_addr = listener.local_addr().map_err(|error| BusError::Bind { addr, error })?;

		let shared = Arc::new(Shared {
			config: self.config.clone(),
			requests: self.requests.clone(),
			cancel: CancellationToken::new(),
			terminate: AtomicBool::new(false),
			online: AtomicBool::new(true),
		});
		let loop_shared = Arc::clone(&shared);
		let thread = spawn_named_thread(TaskClass::Network, "umbra-tcp-server", move || {
			runtime.block_on(serve(listener, loop_shared));
		})
		.map_err(BusError::Worker)?;

		tracing::info!(%local_addr, "bus.server.started");
		self.running = Some(Running { shared, local_addr, thread });
		Ok(local_addr)
	}

	/// Stops the accept loop and joins the server thread.
	///
	/// With `terminate` in-flight connections are aborted immediately;
	/// otherwise they get the configured grace period. Returns false when
	/// the server was not running.
	pub fn stop(&mut self, terminate: bool) -> bool {
		let Some(running) = self.running.take() else {
			tracing::debug!("bus.server.stop.not_running");
			return false;
		};
		let was_online = running.shared.online.load(Ordering::Acquire);
		if terminate {
			running.shared.terminate.store(true, Ordering::Release);
		}
		running.shared.cancel.cancel();
		if running.thread.join().is_err() {
			tracing::error!("bus.server.thread_panicked");
		}
		running.shared.online.store(false, Ordering::Release);
		tracing::info!(local_addr = %running.local_addr, terminate, "bus.server.stopped");
		was_online
	}

	fn reap(&mut self) {
		if self.running.as_ref().is_some_and(|running| !running.shared.online.load(Ordering::Acquire)) {
			self.stop(false);
		}
	}
}

impl Drop for TcpServer {
	fn drop(&mut self) {
		if self.running.is_some() {
			self.stop(true);
		}
	}
}

impl std::fmt::Debug for TcpServer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TcpServer")
			.field("config", &self.config)
			.field("state", &self.state())
			.field("local_addr", &self.local_addr())
			.finish()
	}
}

fn bind(addr: SocketAddr) -> std::io::Result<TcpListener> {
	let socket = if addr.is_ipv4() { TcpSocket::new_v4()? } else { TcpSocket::new_v6()? };
	socket.set_reuseaddr(true)?;
	socket.bind(addr)?;
	socket.listen(1024)
}

async fn serve(listener: TcpListener, shared: Arc<Shared>) {
	let mut handlers = WorkerJoinSet::new(TaskClass::Network);

	loop {
		tokio::select! {
			_ = shared.cancel.cancelled() => break,
			accepted = listener.accept() => match accepted {
				Ok((stream, peer)) => {
					tracing::debug!(%peer, "bus.server.accept");
					handlers.spawn(handle_connection(stream, peer, Arc::clone(&shared)));
				}
				Err(error) => tracing::warn!(%error, "bus.server.accept_failed"),
			}
		}
		handlers.reap_finished();
	}
	drop(listener);

	if shared.terminate.load(Ordering::Acquire) {
		handlers.shutdown().await;
	} else {
		let drained = tokio::time::timeout(shared.config.grace, async { while handlers.join_next().await.is_some() {} }).await;
		if drained.is_err() {
			tracing::warn!(pending = handlers.len(), "bus.server.grace_expired");
			handlers.shutdown().await;
		}
	}
	shared.online.store(false, Ordering::Release);
}

/// Reads until the first read that completes a frame, then closes.
///
/// Requests completed by that read are enqueued in order. A shutdown
/// sentinel drops only the bytes not framed before it.
async fn handle_connection(mut stream: TcpStream, peer: SocketAddr, shared: Arc<Shared>) {
	let mut framer = RequestFramer::new(shared.config.max_request_bytes);
	let mut chunk = [0u8; CHUNK_SIZE];

	let frames = loop {
		let read = match tokio::time::timeout(shared.config.read_timeout, stream.read(&mut chunk)).await {
			Ok(read) => read,
			Err(_) => {
				tracing::debug!(%peer, len = framer.residue().len(), "bus.connection.read_timeout");
				return;
			}
		};
		let len = match read {
			Ok(0) => {
				if !framer.residue().is_empty() {
					tracing::debug!(%peer, len = framer.residue().len(), "bus.connection.residue_discarded");
				}
				return;
			}
			Ok(len) => len,
			Err(error) => {
				tracing::warn!(%peer, %error, "bus.connection.read_failed");
				return;
			}
		};
		match framer.push(&chunk[..len]) {
			Ok(frames) if frames.is_empty() => {}
			Ok(frames) => break frames,
			Err(error) => {
				tracing::warn!(%peer, %error, "bus.connection.dropped");
				return;
			}
		}
	};
	drop(stream);

	for frame in frames {
		match frame {
			Frame::Request(payload) => {
				if !shared.requests.put(Request { payload, peer: Some(peer) }).await {
					tracing::warn!(%peer, "bus.queue.closed");
					return;
				}
			}
			Frame::Shutdown => {
				tracing::info!(%peer, "bus.server.shutdown_requested");
				shared.terminate.store(true, Ordering::Release);
				shared.cancel.cancel();
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn port_bounds_are_inclusive() {
		assert_eq!(validate_port(0).unwrap(), 0);
		assert_eq!(validate_port(65535).unwrap(), 65535);
		assert!(matches!(validate_port(65536), Err(BusError::InvalidPort(65536))));
		assert!(matches!(validate_port(-1), Err(BusError::InvalidPort(-1))));
	}
}
