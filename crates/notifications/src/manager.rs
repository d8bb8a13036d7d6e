//! Notification registration and notifier stacking.

use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use chrono::Local;

use crate::placement::calculate_rect;
use crate::{ClickHandler, Level, Notification, NotificationStyle, Notifier, NotifierOptions, Point, Rect, Size, format_notification};

/// Measures the on-screen size of a message.
pub type TextMetrics = Box<dyn Fn(&str) -> Size>;

/// Fixed-pitch estimate: 8 px per character, 18 px per line, 16 px margins.
pub fn default_text_metrics(message: &str) -> Size {
	let lines = message.lines().count().max(1) as i32;
	let columns = message.lines().map(|line| line.chars().count()).max().unwrap_or(0) as i32;
	Size::new(columns * 8 + 32, lines * 18 + 32)
}

/// Per-call notification parameters.
#[derive(Clone)]
pub struct NotifyOptions {
	/// Hold time at full opacity; zero holds until hidden.
	pub duration: Duration,
	/// Receives the message when the notifier is clicked.
	pub on_click: Option<ClickHandler>,
	/// Severity.
	pub level: Level,
	/// Colors; `None` uses the level default.
	pub style: Option<NotificationStyle>,
}

impl Default for NotifyOptions {
	fn default() -> Self {
		Self {
			duration: Duration::from_millis(3000),
			on_click: None,
			level: Level::Info,
			style: None,
		}
	}
}

impl NotifyOptions {
	/// Sets the hold duration in milliseconds.
	pub fn duration_ms(mut self, ms: u64) -> Self {
		self.duration = Duration::from_millis(ms);
		self
	}

	/// Sets the click handler.
	pub fn on_click(mut self, handler: impl Fn(&str) + 'static) -> Self {
		self.on_click = Some(Rc::new(handler));
		self
	}

	/// Sets the level.
	pub fn level(mut self, level: Level) -> Self {
		self.level = level;
		self
	}

	/// Overrides the colors.
	pub fn style(mut self, style: NotificationStyle) -> Self {
		self.style = Some(style);
		self
	}
}

/// Registration events kept for [`NotificationsManager::take_registered`];
/// the oldest is dropped beyond this.
pub const PENDING_REGISTERED: usize = 256;

/// Owns the notification history and the on-screen notifier stack.
///
/// Notifiers are stored newest first. Every new notifier pushes the existing
/// ones away from the anchor by its own height plus the stack padding.
pub struct NotificationsManager {
	notifications: Vec<Notification>,
	notifiers: Vec<Notifier>,
	registered: VecDeque<Notification>,
	stack_padding: i32,
	maximum_notifiers: usize,
	notifier_options: NotifierOptions,
	container: Size,
	metrics: TextMetrics,
	elapsed: Duration,
	next_id: u64,
}

impl Default for NotificationsManager {
	fn default() -> Self {
		Self::new()
	}
}

impl NotificationsManager {
	/// Creates a manager with the default stack settings.
	pub fn new() -> Self {
		Self {
			notifications: Vec::new(),
			notifiers: Vec::new(),
			registered: VecDeque::new(),
			stack_padding: 10,
			maximum_notifiers: 5,
			notifier_options: NotifierOptions::default(),
			container: Size::new(1024, 768),
			metrics: Box::new(default_text_metrics),
			elapsed: Duration::ZERO,
			next_id: 0,
		}
	}

	/// Gap between stacked notifiers.
	pub const fn stack_padding(&self) -> i32 {
		self.stack_padding
	}

	/// Sets the gap between stacked notifiers; negative values are clamped to 0.
	pub fn set_stack_padding(&mut self, padding: i32) {
		self.stack_padding = padding.max(0);
	}

	/// Maximum number of notifiers kept visible.
	pub const fn maximum_notifiers(&self) -> usize {
		self.maximum_notifiers
	}

	/// Sets the visible notifier cap; at least one is always allowed.
	pub fn set_maximum_notifiers(&mut self, maximum: usize) {
		self.maximum_notifiers = maximum.max(1);
	}

	/// Presentation settings applied to new notifiers.
	pub fn notifier_options_mut(&mut self) -> &mut NotifierOptions {
		&mut self.notifier_options
	}

	/// Replaces the text measurer.
	pub fn set_text_metrics(&mut self, metrics: impl Fn(&str) -> Size + 'static) {
		self.metrics = Box::new(metrics);
	}

	/// Container size notifiers are anchored in.
	pub const fn container(&self) -> Size {
		self.container
	}

	/// Updates the container size after a resize.
	pub fn resize(&mut self, container: Size) {
		self.container = container;
	}

	/// Registers a notification and shows a notifier for it.
	///
	/// Never fails; rendering problems are logged and the notification is
	/// still recorded in the history.
	pub fn notify(&mut self, message: impl Into<String>, options: NotifyOptions) -> bool {
		let message = message.into();
		let NotifyOptions {
			duration,
			on_click,
			level,
			style,
		} = options;

		for notifier in self.notifiers.iter_mut().skip(self.maximum_notifiers.saturating_sub(1)) {
			notifier.hide();
		}

		let notification = Notification {
			id: self.next_id,
			message: message.clone(),
			timestamp: Local::now(),
			level,
			duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
		};
		self.next_id += 1;
		self.register_notification(notification.clone());

		let style = style.unwrap_or_else(|| NotificationStyle::for_level(level, NotificationStyle::default()));
		let size = (self.metrics)(&message);
		if size.is_empty() || self.container.is_empty() {
			tracing::debug!(?size, container = ?self.container, "notifications.unrenderable");
		}

		let offset = size.height + self.stack_padding;
		for notifier in &mut self.notifiers {
			notifier.vertical_offset -= offset;
		}
		self.notifiers
			.insert(0, Notifier::new(notification.id, message, style, self.notifier_options, size, duration, on_click));

		let formatted = format_notification(&notification);
		match level {
			Level::Info => tracing::info!(level = level.as_str(), "{formatted}"),
			Level::Warning => tracing::warn!(level = level.as_str(), "{formatted}"),
			Level::Exception => tracing::error!(level = level.as_str(), "{formatted}"),
		}
		true
	}

	/// [`Self::notify`] at warning level with the warning colors.
	pub fn warnify(&mut self, message: impl Into<String>, options: NotifyOptions) -> bool {
		let options = NotifyOptions {
			level: Level::Warning,
			style: Some(NotificationStyle::for_level(Level::Warning, NotificationStyle::default())),
			..options
		};
		self.notify(message, options)
	}

	/// [`Self::notify`] at exception level with the exception colors.
	pub fn exceptify(&mut self, message: impl Into<String>, options: NotifyOptions) -> bool {
		let options = NotifyOptions {
			level: Level::Exception,
			style: Some(NotificationStyle::for_level(Level::Exception, NotificationStyle::default())),
			..options
		};
		self.notify(message, options)
	}

	fn register_notification(&mut self, notification: Notification) {
		tracing::debug!(id = notification.id, "notifications.register");
		if self.registered.len() == PENDING_REGISTERED {
			self.registered.pop_front();
		}
		self.registered.push_back(notification.clone());
		self.notifications.push(notification);
	}

	/// Drains notifications registered since the last call.
	pub fn take_registered(&mut self) -> Vec<Notification> {
		self.registered.drain(..).collect()
	}

	/// History of every registered notification, oldest first.
	pub fn notifications(&self) -> &[Notification] {
		&self.notifications
	}

	/// History rendered with [`format_notification`].
	pub fn list_notifications(&self) -> Vec<String> {
		self.notifications.iter().map(format_notification).collect()
	}

	/// Returns true when a notification with this exact message was registered.
	pub fn is_notification_registered(&self, message: &str) -> bool {
		self.notifications.iter().any(|notification| notification.message == message)
	}

	/// Live notifiers, newest first.
	pub fn notifiers(&self) -> &[Notifier] {
		&self.notifiers
	}

	/// Container rectangle of `notifier` including its stack offset.
	pub fn notifier_rect(&self, notifier: &Notifier) -> Rect {
		let options = notifier.options();
		calculate_rect(options.anchor, notifier.size(), self.container, options.horizontal_padding, options.vertical_padding)
			.offset(notifier.horizontal_offset(), notifier.vertical_offset())
	}

	/// Advances notifiers by `delta` in fixed steps, then drops retired ones.
	pub fn tick(&mut self, delta: Duration) {
		let interval = self.notifier_options.step_interval.max(Duration::from_millis(1));
		self.elapsed += delta;
		while self.elapsed >= interval {
			self.elapsed -= interval;
			for notifier in &mut self.notifiers {
				notifier.step();
			}
		}

		let before = self.notifiers.len();
		self.notifiers.retain(|notifier| !notifier.is_retired());
		if self.notifiers.len() != before {
			tracing::trace!(retired = before - self.notifiers.len(), "notifications.retire");
		}
	}

	/// Finds the handler of the topmost clickable notifier under `point`.
	///
	/// Notifiers without a handler are transparent and never match.
	pub fn hit_test(&self, point: Point) -> Option<(ClickHandler, String)> {
		self.notifiers
			.iter()
			.filter(|notifier| !notifier.is_retired())
			.find(|notifier| notifier.on_click.is_some() && self.notifier_rect(notifier).contains(point))
			.and_then(|notifier| notifier.on_click.clone().map(|handler| (handler, notifier.message.clone())))
	}

	/// Delivers a click at `point`; returns whether a handler ran.
	pub fn click(&self, point: Point) -> bool {
		let Some((handler, message)) = self.hit_test(point) else {
			return false;
		};
		handler(&message);
		true
	}

	/// Starts the fade-out of every notifier.
	pub fn hide_all(&mut self) {
		for notifier in &mut self.notifiers {
			notifier.hide();
		}
	}
}

impl std::fmt::Debug for NotificationsManager {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("NotificationsManager")
			.field("notifications", &self.notifications.len())
			.field("notifiers", &self.notifiers)
			.field("stack_padding", &self.stack_padding)
			.field("maximum_notifiers", &self.maximum_notifiers)
			.finish()
	}
}

#[cfg(test)]
mod tests;
