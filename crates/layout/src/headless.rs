//! Toolkit-free [`Window`] implementation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{DockArea, Window};

/// Window position and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geometry {
	/// Left edge.
	pub x: i32,
	/// Top edge.
	pub y: i32,
	/// Width.
	pub width: u32,
	/// Height.
	pub height: u32,
}

impl Default for Geometry {
	fn default() -> Self {
		Self {
			x: 0,
			y: 0,
			width: 1280,
			height: 800,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct DockState {
	area: DockArea,
	visible: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateBlob {
	#[serde(default)]
	docks: BTreeMap<String, DockState>,
	#[serde(default)]
	raised: Option<String>,
}

/// In-memory window used when no GUI toolkit is attached.
///
/// Snapshot blobs are TOML documents; callers must still treat them as opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessWindow {
	geometry: Geometry,
	docks: BTreeMap<String, DockState>,
	raised: Option<String>,
	central_visible: bool,
	active_category: i64,
}

impl Default for HeadlessWindow {
	fn default() -> Self {
		Self {
			geometry: Geometry::default(),
			docks: BTreeMap::new(),
			raised: None,
			central_visible: true,
			active_category: 0,
		}
	}
}

impl HeadlessWindow {
	/// Creates an empty window with default geometry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Current geometry.
	pub const fn geometry(&self) -> Geometry {
		self.geometry
	}

	/// Moves or resizes the window.
	pub fn set_geometry(&mut self, geometry: Geometry) {
		self.geometry = geometry;
	}

	/// Area of a dock panel.
	pub fn dock_area(&self, name: &str) -> Option<DockArea> {
		self.docks.get(name).map(|dock| dock.area)
	}

	/// Moves a dock panel to another area.
	pub fn move_dock_widget(&mut self, name: &str, area: DockArea) -> bool {
		let Some(dock) = self.docks.get_mut(name) else {
			return false;
		};
		dock.area = area;
		true
	}

	/// Most recently raised widget.
	pub fn raised_widget(&self) -> Option<&str> {
		self.raised.as_deref()
	}
}

impl Window for HeadlessWindow {
	fn save_geometry(&self) -> Vec<u8> {
		toml::to_string(&self.geometry).map(String::into_bytes).unwrap_or_default()
	}

	fn restore_geometry(&mut self, geometry: &[u8]) -> bool {
		let parsed = std::str::from_utf8(geometry).ok().and_then(|text| toml::from_str::<Geometry>(text).ok());
		match parsed {
			Some(geometry) => {
				self.geometry = geometry;
				true
			}
			None => {
				tracing::warn!(len = geometry.len(), "layout.headless.bad_geometry");
				false
			}
		}
	}

	fn save_state(&self) -> Vec<u8> {
		let blob = StateBlob {
			docks: self.docks.clone(),
			raised: self.raised.clone(),
		};
		toml::to_string(&blob).map(String::into_bytes).unwrap_or_default()
	}

	fn restore_state(&mut self, state: &[u8]) -> bool {
		let Some(blob) = std::str::from_utf8(state).ok().and_then(|text| toml::from_str::<StateBlob>(text).ok()) else {
			tracing::warn!(len = state.len(), "layout.headless.bad_state");
			return false;
		};
		for (name, saved) in blob.docks {
			if let Some(dock) = self.docks.get_mut(&name) {
				*dock = saved;
			}
		}
		self.raised = blob.raised.filter(|name| self.docks.contains_key(name));
		true
	}

	fn is_central_widget_visible(&self) -> bool {
		self.central_visible
	}

	fn set_central_widget_visible(&mut self, visible: bool) {
		self.central_visible = visible;
	}

	fn active_category(&self) -> i64 {
		self.active_category
	}

	fn set_active_category(&mut self, index: i64) {
		self.active_category = index;
	}

	fn add_dock_widget(&mut self, name: &str, area: DockArea) -> bool {
		if self.docks.contains_key(name) {
			return false;
		}
		self.docks.insert(name.to_owned(), DockState { area, visible: true });
		true
	}

	fn remove_dock_widget(&mut self, name: &str) -> bool {
		if self.raised.as_deref() == Some(name) {
			self.raised = None;
		}
		self.docks.remove(name).is_some()
	}

	fn dock_widgets(&self) -> Vec<String> {
		self.docks.keys().cloned().collect()
	}

	fn show_widget(&mut self, name: &str) {
		if let Some(dock) = self.docks.get_mut(name) {
			dock.visible = true;
		}
	}

	fn hide_widget(&mut self, name: &str) {
		if let Some(dock) = self.docks.get_mut(name) {
			dock.visible = false;
		}
	}

	fn raise_widget(&mut self, name: &str) {
		if let Some(dock) = self.docks.get_mut(name) {
			dock.visible = true;
			self.raised = Some(name.to_owned());
		}
	}

	fn is_widget_visible(&self, name: &str) -> bool {
		self.docks.get(name).is_some_and(|dock| dock.visible)
	}
}
