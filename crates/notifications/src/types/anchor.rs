/// Compass position a notifier is anchored to within its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Anchor {
	/// Top edge, horizontally centered.
	TopCenter,
	/// Top-right corner.
	TopRight,
	/// Right edge, vertically centered.
	MiddleRight,
	/// Bottom-right corner.
	BottomRight,
	/// Bottom edge, horizontally centered.
	#[default]
	BottomCenter,
	/// Bottom-left corner.
	BottomLeft,
	/// Left edge, vertically centered.
	MiddleLeft,
	/// Top-left corner.
	TopLeft,
	/// Container center.
	MiddleCenter,
}

impl Anchor {
	/// All anchors, clockwise from top center, then center.
	pub const ALL: [Anchor; 9] = [
		Self::TopCenter,
		Self::TopRight,
		Self::MiddleRight,
		Self::BottomRight,
		Self::BottomCenter,
		Self::BottomLeft,
		Self::MiddleLeft,
		Self::TopLeft,
		Self::MiddleCenter,
	];

	/// Maps a numeric anchor index (0..=8, clockwise from top center) to an anchor.
	pub fn from_index(index: usize) -> Option<Self> {
		Self::ALL.get(index).copied()
	}
}
