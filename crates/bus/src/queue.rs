//! The shared requests FIFO.

use std::net::SocketAddr;

use tokio::sync::mpsc;

/// Default FIFO bound.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// A complete inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
	/// Payload text, sentinel stripped.
	pub payload: String,
	/// Remote peer, when received over TCP.
	pub peer: Option<SocketAddr>,
}

impl Request {
	/// Creates a request with no peer.
	pub fn local(payload: impl Into<String>) -> Self {
		Self {
			payload: payload.into(),
			peer: None,
		}
	}
}

/// Producer side of the FIFO; cloned into connection handlers.
#[derive(Debug, Clone)]
pub struct RequestSender {
	tx: mpsc::Sender<Request>,
}

/// Consumer side of the FIFO, owned by the UI thread.
#[derive(Debug)]
pub struct RequestQueue {
	rx: mpsc::Receiver<Request>,
}

/// Creates a bounded FIFO.
pub fn request_queue(capacity: usize) -> (RequestSender, RequestQueue) {
	let (tx, rx) = mpsc::channel(capacity.max(1));
	(RequestSender { tx }, RequestQueue { rx })
}

impl RequestSender {
	/// Appends a request, waiting while the FIFO is full.
	///
	/// Returns false when the consumer is gone.
	pub async fn put(&self, request: Request) -> bool {
		self.tx.send(request).await.is_ok()
	}

	/// Appends a request from a plain thread, waiting while the FIFO is full.
	///
	/// Must not be called from inside an async runtime. Returns false when
	/// the consumer is gone.
	pub fn put_blocking(&self, request: Request) -> bool {
		self.tx.blocking_send(request).is_ok()
	}

	/// Appends a request without waiting; false when full or closed.
	pub fn try_put(&self, request: Request) -> bool {
		match self.tx.try_send(request) {
			Ok(()) => true,
			Err(mpsc::error::TrySendError::Full(request)) => {
				tracing::warn!(len = request.payload.len(), "bus.queue.full");
				false
			}
			Err(mpsc::error::TrySendError::Closed(_)) => false,
		}
	}
}

impl RequestQueue {
	/// Pops one pending request.
	pub fn pop(&mut self) -> Option<Request> {
		self.rx.try_recv().ok()
	}

	/// Pops every pending request in FIFO order.
	pub fn drain(&mut self) -> Vec<Request> {
		let mut drained = Vec::new();
		while let Ok(request) = self.rx.try_recv() {
			drained.push(request);
		}
		drained
	}

	/// Number of requests waiting.
	pub fn len(&self) -> usize {
		self.rx.len()
	}

	/// Returns true when nothing is waiting.
	pub fn is_empty(&self) -> bool {
		self.rx.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn drain_preserves_fifo_order() {
		let (tx, mut queue) = request_queue(8);
		for payload in ["a", "b", "c"] {
			assert!(tx.try_put(Request::local(payload)));
		}
		assert_eq!(queue.len(), 3);
		let payloads: Vec<_> = queue.drain().into_iter().map(|r| r.payload).collect();
		assert_eq!(payloads, vec!["a", "b", "c"]);
		assert!(queue.is_empty());
		assert!(queue.pop().is_none());
	}

	#[test]
	fn full_queue_rejects_without_blocking() {
		let (tx, _queue) = request_queue(1);
		assert!(tx.try_put(Request::local("a")));
		assert!(!tx.try_put(Request::local("b")));
	}

	#[test]
	fn blocking_put_waits_for_room() {
		let (tx, mut queue) = request_queue(1);
		assert!(tx.try_put(Request::local("a")));
		let producer = std::thread::spawn(move || tx.put_blocking(Request::local("quit")));

		let mut payloads = Vec::new();
		while payloads.len() < 2 {
			payloads.extend(queue.drain().into_iter().map(|r| r.payload));
			std::thread::sleep(std::time::Duration::from_millis(5));
		}
		assert!(producer.join().unwrap());
		assert_eq!(payloads, vec!["a", "quit"]);
	}

	#[test]
	fn blocking_put_reports_a_closed_queue() {
		let (tx, queue) = request_queue(1);
		drop(queue);
		assert!(!tx.put_blocking(Request::local("quit")));
	}

	#[test]
	fn closed_queue_rejects() {
		let (tx, queue) = request_queue(1);
		drop(queue);
		assert!(!tx.try_put(Request::local("a")));
	}
}
