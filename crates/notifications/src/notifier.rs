//! On-screen notifier state machine.

use std::time::Duration;

use crate::{Anchor, ClickHandler, NotificationStyle, Size};

/// Lifecycle phase of a notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
	/// Opacity is rising towards the target.
	FadingIn,
	/// Fully faded in; `None` holds until hidden explicitly.
	Holding(Option<Duration>),
	/// Opacity is falling towards zero.
	FadingOut,
	/// Invisible; the manager drops it on the next sweep.
	Retired,
}

/// Per-notifier presentation settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NotifierOptions {
	/// Compass anchor within the container.
	pub anchor: Anchor,
	/// Distance from the anchored left/right edge.
	pub horizontal_padding: i32,
	/// Distance from the anchored top/bottom edge.
	pub vertical_padding: i32,
	/// Opacity change per timer step.
	pub fade_step: f32,
	/// Opacity reached at the end of the fade-in.
	pub target_opacity: f32,
	/// Fixed timer step.
	pub step_interval: Duration,
}

impl Default for NotifierOptions {
	fn default() -> Self {
		Self {
			anchor: Anchor::BottomCenter,
			horizontal_padding: 0,
			vertical_padding: 48,
			fade_step: 0.15,
			target_opacity: 0.75,
			step_interval: Duration::from_millis(25),
		}
	}
}

/// A transient on-screen label produced by a notification.
pub struct Notifier {
	pub(crate) notification_id: u64,
	pub(crate) message: String,
	pub(crate) style: NotificationStyle,
	pub(crate) options: NotifierOptions,
	pub(crate) size: Size,
	pub(crate) horizontal_offset: i32,
	pub(crate) vertical_offset: i32,
	pub(crate) opacity: f32,
	pub(crate) phase: Phase,
	pub(crate) hold: Duration,
	pub(crate) on_click: Option<ClickHandler>,
}

impl Notifier {
	pub(crate) fn new(
		notification_id: u64,
		message: String,
		style: NotificationStyle,
		options: NotifierOptions,
		size: Size,
		hold: Duration,
		on_click: Option<ClickHandler>,
	) -> Self {
		Self {
			notification_id,
			message,
			style,
			options,
			size,
			horizontal_offset: 0,
			vertical_offset: 0,
			opacity: 0.0,
			phase: Phase::FadingIn,
			hold,
			on_click,
		}
	}

	/// Id of the notification this notifier displays.
	pub const fn notification_id(&self) -> u64 {
		self.notification_id
	}

	/// Displayed text.
	pub fn message(&self) -> &str {
		&self.message
	}

	/// Colors.
	pub const fn style(&self) -> NotificationStyle {
		self.style
	}

	/// Presentation settings.
	pub const fn options(&self) -> &NotifierOptions {
		&self.options
	}

	/// Measured size.
	pub const fn size(&self) -> Size {
		self.size
	}

	/// Offset applied on top of the anchored position, vertical axis.
	pub const fn vertical_offset(&self) -> i32 {
		self.vertical_offset
	}

	/// Offset applied on top of the anchored position, horizontal axis.
	pub const fn horizontal_offset(&self) -> i32 {
		self.horizontal_offset
	}

	/// Current opacity in `[0, 1]`.
	pub const fn opacity(&self) -> f32 {
		self.opacity
	}

	/// Current phase.
	pub const fn phase(&self) -> Phase {
		self.phase
	}

	/// Whether pointer events reach this notifier.
	pub const fn accepts_clicks(&self) -> bool {
		self.on_click.is_some()
	}

	/// Returns true once the notifier has fully faded out.
	pub const fn is_retired(&self) -> bool {
		matches!(self.phase, Phase::Retired)
	}

	/// Starts the fade-out from whatever phase the notifier is in.
	pub fn hide(&mut self) {
		if !self.is_retired() {
			self.phase = Phase::FadingOut;
		}
	}

	/// Advances one timer step.
	pub(crate) fn step(&mut self) {
		let NotifierOptions {
			fade_step,
			target_opacity,
			step_interval,
			..
		} = self.options;

		self.phase = match self.phase {
			Phase::FadingIn => {
				self.opacity = (self.opacity + fade_step).min(target_opacity);
				if self.opacity >= target_opacity {
					Phase::Holding((!self.hold.is_zero()).then_some(self.hold))
				} else {
					Phase::FadingIn
				}
			}
			Phase::Holding(None) => Phase::Holding(None),
			Phase::Holding(Some(remaining)) => {
				let remaining = remaining.saturating_sub(step_interval);
				if remaining.is_zero() { Phase::FadingOut } else { Phase::Holding(Some(remaining)) }
			}
			Phase::FadingOut => {
				self.opacity = (self.opacity - fade_step).max(0.0);
				if self.opacity <= 0.0 { Phase::Retired } else { Phase::FadingOut }
			}
			Phase::Retired => Phase::Retired,
		};
	}
}

impl std::fmt::Debug for Notifier {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Notifier")
			.field("notification_id", &self.notification_id)
			.field("message", &self.message)
			.field("vertical_offset", &self.vertical_offset)
			.field("opacity", &self.opacity)
			.field("phase", &self.phase)
			.field("clickable", &self.accepts_clicks())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn notifier(hold_ms: u64) -> Notifier {
		Notifier::new(
			0,
			"hello".into(),
			NotificationStyle::default(),
			NotifierOptions::default(),
			Size::new(100, 40),
			Duration::from_millis(hold_ms),
			None,
		)
	}

	#[test]
	fn fades_in_to_target_then_holds() {
		let mut n = notifier(100);
		for _ in 0..5 {
			n.step();
		}
		assert!((n.opacity() - 0.75).abs() < 1e-6);
		assert!(matches!(n.phase(), Phase::Holding(_) | Phase::FadingIn));
		n.step();
		assert_eq!(n.opacity(), 0.75);
		assert!(matches!(n.phase(), Phase::Holding(Some(_))));
	}

	#[test]
	fn opacity_never_leaves_unit_range() {
		let mut n = notifier(25);
		for _ in 0..64 {
			n.step();
			assert!((0.0..=1.0).contains(&n.opacity()));
		}
		assert!(n.is_retired());
		assert_eq!(n.opacity(), 0.0);
	}

	#[test]
	fn zero_duration_holds_until_hidden() {
		let mut n = notifier(0);
		for _ in 0..100 {
			n.step();
		}
		assert_eq!(n.phase(), Phase::Holding(None));
		n.hide();
		for _ in 0..10 {
			n.step();
		}
		assert!(n.is_retired());
	}
}
