//! What the core requires of the GUI layer.

use std::fmt;
use std::str::FromStr;

/// Compass area a dock panel attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DockArea {
	/// Left edge.
	Left,
	/// Right edge.
	Right,
	/// Top edge.
	Top,
	/// Bottom edge.
	Bottom,
}

impl DockArea {
	/// Lowercase name.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Left => "left",
			Self::Right => "right",
			Self::Top => "top",
			Self::Bottom => "bottom",
		}
	}
}

impl fmt::Display for DockArea {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for DockArea {
	type Err = String;

	fn from_str(text: &str) -> Result<Self, Self::Err> {
		match text.to_ascii_lowercase().as_str() {
			"left" => Ok(Self::Left),
			"right" => Ok(Self::Right),
			"top" => Ok(Self::Top),
			"bottom" => Ok(Self::Bottom),
			_ => Err(format!("unknown dock area '{text}'")),
		}
	}
}

/// Windowing abstraction consumed by the core.
///
/// Geometry and state blobs are opaque: whatever `save_*` returns must be
/// accepted verbatim by the matching `restore_*`.
pub trait Window {
	/// Serializes position and size.
	fn save_geometry(&self) -> Vec<u8>;
	/// Applies a blob from [`Window::save_geometry`]; false if rejected.
	fn restore_geometry(&mut self, geometry: &[u8]) -> bool;
	/// Serializes dock placement and visibility.
	fn save_state(&self) -> Vec<u8>;
	/// Applies a blob from [`Window::save_state`]; false if rejected.
	fn restore_state(&mut self, state: &[u8]) -> bool;

	/// Whether the central widget is shown.
	fn is_central_widget_visible(&self) -> bool;
	/// Shows or hides the central widget.
	fn set_central_widget_visible(&mut self, visible: bool);

	/// Index of the active category indicator.
	fn active_category(&self) -> i64;
	/// Moves the active category indicator.
	fn set_active_category(&mut self, index: i64);

	/// Adds a dock panel; false if a widget with this name exists.
	fn add_dock_widget(&mut self, name: &str, area: DockArea) -> bool;
	/// Removes a dock panel; false if unknown.
	fn remove_dock_widget(&mut self, name: &str) -> bool;
	/// Names of every dock panel.
	fn dock_widgets(&self) -> Vec<String>;

	/// Shows a widget.
	fn show_widget(&mut self, name: &str);
	/// Hides a widget.
	fn hide_widget(&mut self, name: &str);
	/// Brings a widget to the front.
	fn raise_widget(&mut self, name: &str);
	/// Whether a widget is shown.
	fn is_widget_visible(&self, name: &str) -> bool;
}
