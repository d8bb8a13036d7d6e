use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use super::{RETAINED_RECORDS, WorkerTracker};
use crate::{TaskClass, WorkerState};

#[test]
fn cooperative_workers_are_joined_at_shutdown() {
	let tracker = WorkerTracker::new();
	let stopped = Arc::new(AtomicBool::new(false));
	let flag = Arc::clone(&stopped);

	let id = tracker
		.spawn(TaskClass::IoBlocking, "umbra-search", move |cancel| {
			while !cancel.is_cancelled() {
				std::thread::sleep(Duration::from_millis(2));
			}
			flag.store(true, Ordering::SeqCst);
		})
		.unwrap();
	assert_eq!(tracker.active(), 1);

	let report = tracker.shutdown(Duration::from_secs(5));
	assert_eq!(report.joined, 1);
	assert!(report.detached.is_empty());
	assert!(stopped.load(Ordering::SeqCst));
	assert_eq!(tracker.registry().get(id.0).map(|r| r.state), Some(WorkerState::Finished));
}

#[test]
fn uncooperative_workers_are_detached_after_grace() {
	let tracker = WorkerTracker::new();
	tracker
		.spawn(TaskClass::Background, "umbra-stubborn", |_| std::thread::sleep(Duration::from_millis(300)))
		.unwrap();

	let report = tracker.shutdown(Duration::from_millis(20));
	assert_eq!(report.detached, vec!["umbra-stubborn".to_string()]);
	assert_eq!(tracker.active(), 0);
}

#[test]
fn panics_are_observed_on_reap() {
	let tracker = WorkerTracker::new();
	tracker.spawn(TaskClass::CpuBlocking, "umbra-panics", |_| panic!("boom")).unwrap();
	let report = tracker.shutdown(Duration::from_secs(5));
	assert_eq!(report.panicked, vec!["umbra-panics".to_string()]);
}

#[test]
fn single_worker_can_be_cancelled() {
	let tracker = WorkerTracker::new();
	let id = tracker
		.spawn(TaskClass::Background, "umbra-one", |cancel| {
			while !cancel.is_cancelled() {
				std::thread::sleep(Duration::from_millis(2));
			}
		})
		.unwrap();
	assert!(tracker.cancel(id));

	for _ in 0..500 {
		if tracker.reap().joined == 1 {
			return;
		}
		std::thread::sleep(Duration::from_millis(5));
	}
	panic!("worker did not stop after cancellation");
}

#[test]
fn joined_worker_records_are_capped() {
	let tracker = WorkerTracker::new();
	let total = RETAINED_RECORDS + 16;
	let mut last = None;
	for index in 0..total {
		last = Some(tracker.spawn(TaskClass::Network, format!("umbra-send-{index}"), |_| {}).unwrap());
	}
	let report = tracker.shutdown(Duration::from_secs(5));
	assert_eq!(report.joined, total);

	let records = tracker.registry().snapshots();
	assert_eq!(records.len(), RETAINED_RECORDS);
	assert!(records.iter().all(|record| record.state == WorkerState::Finished));
	assert_eq!(records.last().map(|record| record.id), last.map(|id| id.0));
}
