use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use pretty_assertions::assert_eq;

use super::{NotificationsManager, NotifyOptions, PENDING_REGISTERED};
use crate::{Level, NotificationStyle, Point, Rgb, Size};

const STEP: Duration = Duration::from_millis(25);

fn run(manager: &mut NotificationsManager, total: Duration) {
	let mut elapsed = Duration::ZERO;
	while elapsed < total {
		manager.tick(STEP);
		elapsed += STEP;
	}
}

#[test]
fn three_short_notifications_retire_and_stay_in_history() {
	let mut manager = NotificationsManager::new();
	for _ in 0..3 {
		assert!(manager.notify("hello", NotifyOptions::default().duration_ms(100)));
	}
	assert_eq!(manager.notifiers().len(), 3);

	run(&mut manager, Duration::from_millis(400) + Duration::from_millis(200));
	assert!(manager.notifiers().is_empty());
	assert_eq!(manager.notifications().len(), 3);
	assert_eq!(manager.list_notifications().len(), 3);
}

#[test]
fn offsets_decrease_by_height_plus_padding_and_never_overlap() {
	let mut manager = NotificationsManager::new();
	manager.set_text_metrics(|message| Size::new(200, 20 + message.len() as i32));
	for message in ["a", "bbbbbbbbbb", "ccccc", "dd"] {
		manager.notify(message, NotifyOptions::default());
	}

	let notifiers = manager.notifiers();
	assert_eq!(notifiers[0].vertical_offset(), 0);
	for pair in notifiers.windows(2) {
		let (newer, older) = (&pair[0], &pair[1]);
		assert!(older.vertical_offset() < newer.vertical_offset());
		let gap = newer.vertical_offset() - older.vertical_offset();
		assert!(gap >= newer.size().height + manager.stack_padding());

		let newer_rect = manager.notifier_rect(newer);
		let older_rect = manager.notifier_rect(older);
		assert!(!newer_rect.intersects(older_rect));
		assert!(newer_rect.y - older_rect.bottom() >= manager.stack_padding());
	}
}

#[test]
fn excess_notifiers_are_forced_out() {
	let mut manager = NotificationsManager::new();
	manager.set_maximum_notifiers(2);
	manager.notify("first", NotifyOptions::default());
	manager.notify("second", NotifyOptions::default());
	manager.notify("third", NotifyOptions::default());

	run(&mut manager, Duration::from_millis(500));
	let messages: Vec<_> = manager.notifiers().iter().map(|n| n.message().to_owned()).collect();
	assert_eq!(messages, vec!["third", "second"]);
}

#[test]
fn warnify_and_exceptify_force_level_and_color() {
	let mut manager = NotificationsManager::new();
	let custom = NotificationStyle {
		foreground: Rgb(1, 2, 3),
		..NotificationStyle::default()
	};
	manager.warnify("careful", NotifyOptions::default().style(custom));
	manager.exceptify("broken", NotifyOptions::default());

	let history = manager.notifications();
	assert_eq!(history[0].level, Level::Warning);
	assert_eq!(history[1].level, Level::Exception);
	assert_eq!(manager.notifiers()[1].style().foreground, Rgb(220, 128, 64));
	assert_eq!(manager.notifiers()[0].style().foreground, Rgb(220, 64, 64));
	assert_eq!(manager.notifiers()[0].style().background, Rgb(32, 32, 32));
}

#[test]
fn clicks_reach_handlers_and_pass_through_plain_notifiers() {
	let mut manager = NotificationsManager::new();
	manager.resize(Size::new(800, 600));
	manager.set_text_metrics(|_| Size::new(200, 40));
	let clicked = Rc::new(RefCell::new(Vec::new()));
	let sink = Rc::clone(&clicked);

	manager.notify("clickable", NotifyOptions::default().on_click(move |text| sink.borrow_mut().push(text.to_owned())));
	manager.notify("plain", NotifyOptions::default());

	let plain = manager.notifier_rect(&manager.notifiers()[0]);
	let clickable = manager.notifier_rect(&manager.notifiers()[1]);

	assert!(!manager.click(Point::new(plain.x + 5, plain.y + 5)));
	assert!(manager.click(Point::new(clickable.x + 5, clickable.y + 5)));
	assert_eq!(*clicked.borrow(), vec!["clickable".to_string()]);
}

#[test]
fn registered_events_drain_once() {
	let mut manager = NotificationsManager::new();
	manager.notify("one", NotifyOptions::default());
	manager.notify("two", NotifyOptions::default());
	let drained: Vec<_> = manager.take_registered().into_iter().map(|n| n.message).collect();
	assert_eq!(drained, vec!["one", "two"]);
	assert!(manager.take_registered().is_empty());
	assert!(manager.is_notification_registered("two"));
}

#[test]
fn undrained_registrations_are_capped_but_history_is_not() {
	let mut manager = NotificationsManager::new();
	for index in 0..PENDING_REGISTERED + 3 {
		manager.notify(format!("note {index}"), NotifyOptions::default());
	}
	let pending = manager.take_registered();
	assert_eq!(pending.len(), PENDING_REGISTERED);
	assert_eq!(pending[0].message, "note 3");
	assert_eq!(manager.notifications().len(), PENDING_REGISTERED + 3);
}

#[test]
fn formatted_history_quotes_the_message() {
	let mut manager = NotificationsManager::new();
	manager.notify("hello", NotifyOptions::default());
	let line = &manager.list_notifications()[0];
	assert!(line.ends_with(" | 'hello'"), "{line}");
}
