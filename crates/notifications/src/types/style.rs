use crate::Level;

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Colors a notifier is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotificationStyle {
	/// Text color.
	pub foreground: Rgb,
	/// Fill color.
	pub background: Rgb,
	/// Border color.
	pub border: Rgb,
}

impl Default for NotificationStyle {
	fn default() -> Self {
		Self {
			foreground: Rgb(220, 220, 220),
			background: Rgb(32, 32, 32),
			border: Rgb(220, 220, 220),
		}
	}
}

impl NotificationStyle {
	/// Style forced by a level; informational notifications keep `base`.
	pub fn for_level(level: Level, base: Self) -> Self {
		let accent = match level {
			Level::Info => return base,
			Level::Warning => Rgb(220, 128, 64),
			Level::Exception => Rgb(220, 64, 64),
		};
		Self {
			foreground: accent,
			background: Self::default().background,
			border: accent,
		}
	}
}
