/// A point in container coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
	/// Horizontal coordinate.
	pub x: i32,
	/// Vertical coordinate, growing downwards.
	pub y: i32,
}

impl Point {
	/// Creates a point.
	pub const fn new(x: i32, y: i32) -> Self {
		Self { x, y }
	}
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
	/// Width.
	pub width: i32,
	/// Height.
	pub height: i32,
}

impl Size {
	/// Creates a size.
	pub const fn new(width: i32, height: i32) -> Self {
		Self { width, height }
	}

	/// Returns true when either dimension is not positive.
	pub const fn is_empty(self) -> bool {
		self.width <= 0 || self.height <= 0
	}
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
	/// Left edge.
	pub x: i32,
	/// Top edge.
	pub y: i32,
	/// Width.
	pub width: i32,
	/// Height.
	pub height: i32,
}

impl Rect {
	/// Creates a rectangle.
	pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
		Self { x, y, width, height }
	}

	/// One past the bottom edge.
	pub const fn bottom(self) -> i32 {
		self.y + self.height
	}

	/// One past the right edge.
	pub const fn right(self) -> i32 {
		self.x + self.width
	}

	/// Returns true when `point` lies inside.
	pub const fn contains(self, point: Point) -> bool {
		point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
	}

	/// Returns true when the two rectangles share any area.
	pub const fn intersects(self, other: Rect) -> bool {
		self.x < other.right() && other.x < self.right() && self.y < other.bottom() && other.y < self.bottom()
	}

	/// Shifts the rectangle by `(dx, dy)`.
	pub const fn offset(self, dx: i32, dy: i32) -> Self {
		Self::new(self.x + dx, self.y + dy, self.width, self.height)
	}
}
