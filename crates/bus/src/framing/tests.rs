use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;

use super::{Frame, FrameError, RequestFramer};

fn feed(chunks: &[&str]) -> (Vec<Frame>, RequestFramer) {
	let mut framer = RequestFramer::default();
	let mut frames = Vec::new();
	for chunk in chunks {
		frames.extend(framer.push(chunk.as_bytes()).unwrap());
	}
	(frames, framer)
}

fn requests(frames: &[Frame]) -> Vec<&str> {
	frames
		.iter()
		.filter_map(|frame| match frame {
			Frame::Request(payload) => Some(payload.as_str()),
			Frame::Shutdown => None,
		})
		.collect()
}

#[test]
fn single_request() {
	let (frames, framer) = feed(&["print(1+1)<!RE>"]);
	assert_eq!(frames, vec![Frame::Request("print(1+1)".into())]);
	assert!(framer.residue().is_empty());
}

#[test]
fn straddled_sentinel_discards_trailing_bytes() {
	let (frames, framer) = feed(&["AB", "<!", "RE>C"]);
	assert_eq!(requests(&frames), vec!["AB"]);
	assert_eq!(framer.residue(), b"C");
}

#[test]
fn two_requests_survive_every_chunking() {
	let stream = "first payload<!RE>second<!RE>";
	for size in 1..=stream.len() {
		let chunks: Vec<&str> = stream.as_bytes().chunks(size).map(|c| std::str::from_utf8(c).unwrap()).collect();
		let (frames, _) = feed(&chunks);
		assert_eq!(requests(&frames), vec!["first payload", "second"], "chunk size {size}");
	}
}

#[test]
fn every_split_point_of_each_sentinel_is_found() {
	for split in 0..=5 {
		let (left, right) = "<!RE>".split_at(split);
		let (frames, _) = feed(&["x", left, right]);
		assert_eq!(requests(&frames), vec!["x"], "split {split}");
	}
}

#[test]
fn shutdown_anywhere_stops_the_stream() {
	let (frames, framer) = feed(&["shut", "down<!S", "S>ignored<!RE>"]);
	assert_eq!(frames, vec![Frame::Shutdown]);
	assert!(framer.is_shutdown());
}

#[test]
fn shutdown_after_a_request_is_still_reported() {
	let (frames, _) = feed(&["a<!RE>b<!SS>"]);
	assert_eq!(frames, vec![Frame::Request("a".into()), Frame::Shutdown]);
}

#[test]
fn unterminated_data_is_capped() {
	let mut framer = RequestFramer::new(8);
	assert!(framer.push(b"12345678").unwrap().is_empty());
	assert_eq!(framer.push(b"9"), Err(FrameError::Oversized { limit: 8 }));
}

#[test]
fn invalid_utf8_is_replaced() {
	let mut framer = RequestFramer::default();
	let frames = framer.push(b"caf\xe9<!RE>").unwrap();
	assert_eq!(frames, vec![Frame::Request("caf\u{fffd}".into())]);
}

#[test]
fn large_payload_is_framed_in_linear_time() {
	let mut framer = RequestFramer::default();
	let chunk = [b'a'; super::CHUNK_SIZE];
	let started = Instant::now();
	for _ in 0..2048 {
		assert!(framer.push(&chunk).unwrap().is_empty());
	}
	let frames = framer.push(b"<!RE>").unwrap();
	let elapsed = started.elapsed();

	assert_eq!(frames.len(), 1);
	assert!(matches!(&frames[0], Frame::Request(payload) if payload.len() == 2048 * super::CHUNK_SIZE));
	assert!(elapsed < Duration::from_secs(5), "framing 2 MiB took {elapsed:?}");
}

#[test]
fn sentinel_straddling_a_scanned_prefix_is_found() {
	let (frames, framer) = feed(&["aaaa<", "!R", "E>bb<!", "SS>"]);
	assert_eq!(frames, vec![Frame::Request("aaaa".into()), Frame::Shutdown]);
	assert!(framer.residue().is_empty());
}
