//! Anchor-relative placement of notifiers.

use crate::{Anchor, Rect, Size};

/// Places a `size` rectangle inside `container` at `anchor`.
///
/// Padding is applied away from the anchored edges: horizontal padding from
/// the left or right edge, vertical padding from the top or bottom edge.
/// Centered axes ignore padding. The result is clamped so it starts inside
/// the container whenever it fits.
pub fn calculate_rect(anchor: Anchor, size: Size, container: Size, horizontal_padding: i32, vertical_padding: i32) -> Rect {
	let x = match anchor {
		Anchor::TopLeft | Anchor::MiddleLeft | Anchor::BottomLeft => horizontal_padding,
		Anchor::TopCenter | Anchor::MiddleCenter | Anchor::BottomCenter => container.width / 2 - size.width / 2,
		Anchor::TopRight | Anchor::MiddleRight | Anchor::BottomRight => container.width - size.width - horizontal_padding,
	};

	let y = match anchor {
		Anchor::TopLeft | Anchor::TopCenter | Anchor::TopRight => vertical_padding,
		Anchor::MiddleLeft | Anchor::MiddleCenter | Anchor::MiddleRight => container.height / 2 - size.height / 2,
		Anchor::BottomLeft | Anchor::BottomCenter | Anchor::BottomRight => container.height - size.height - vertical_padding,
	};

	let x = x.min(container.width - size.width).max(0);
	let y = y.min(container.height - size.height).max(0);
	Rect::new(x, y, size.width, size.height)
}
