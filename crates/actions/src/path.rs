//! Action path grammar.
//!
//! ```text
//! path     = segment ("|" segment)*
//! segment  = 1*(any char except "|")
//! ```
//!
//! Paths outside the root namespace are filed under `Actions|Others`.

use std::fmt;

use crate::{ActionError, Result};

/// Separator between path segments.
pub const NAMESPACE_SPLITTER: char = '|';

/// Root namespace every registered path lives under.
pub const ROOT_NAMESPACE: &str = "Actions";

/// Category that receives paths registered outside the root namespace.
pub const DEFAULT_CATEGORY: &str = "Others";

/// A parsed, normalized action path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionPath {
	full: String,
	split: usize,
}

impl ActionPath {
	/// Parses and normalizes `raw`.
	///
	/// Segments are trimmed. An empty path or an empty segment is rejected.
	pub fn parse(raw: &str) -> Result<Self> {
		let segments: Vec<&str> = raw.split(NAMESPACE_SPLITTER).map(str::trim).collect();
		if segments.iter().any(|segment| segment.is_empty()) {
			return Err(ActionError::InvalidPath(raw.to_owned()));
		}

		let mut normalized: Vec<&str> = Vec::with_capacity(segments.len() + 2);
		if segments[0] != ROOT_NAMESPACE {
			normalized.extend([ROOT_NAMESPACE, DEFAULT_CATEGORY]);
		}
		normalized.extend(segments);
		if normalized.len() < 2 {
			return Err(ActionError::InvalidPath(raw.to_owned()));
		}

		let full = normalized.join("|");
		let split = full.rfind(NAMESPACE_SPLITTER).unwrap_or_default();
		Ok(Self { full, split })
	}

	/// The full normalized path.
	pub fn as_str(&self) -> &str {
		&self.full
	}

	/// The category holding this action (every segment but the last).
	pub fn category(&self) -> &str {
		&self.full[..self.split]
	}

	/// The action's own name (last segment).
	pub fn name(&self) -> &str {
		&self.full[self.split + 1..]
	}

	/// Every category prefix, outermost first.
	pub fn ancestors(&self) -> impl Iterator<Item = &str> {
		self.full.match_indices(NAMESPACE_SPLITTER).map(|(index, _)| &self.full[..index])
	}
}

impl fmt::Display for ActionPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.full)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn root_paths_are_kept() {
		let path = ActionPath::parse("Actions|Umbra|Engine|Quit").unwrap();
		assert_eq!(path.as_str(), "Actions|Umbra|Engine|Quit");
		assert_eq!(path.category(), "Actions|Umbra|Engine");
		assert_eq!(path.name(), "Quit");
	}

	#[test]
	fn foreign_paths_are_filed_under_others() {
		let path = ActionPath::parse("Tools|Reload").unwrap();
		assert_eq!(path.as_str(), "Actions|Others|Tools|Reload");
		assert_eq!(path.ancestors().collect::<Vec<_>>(), vec!["Actions", "Actions|Others", "Actions|Others|Tools"]);
	}

	#[test]
	fn empty_segments_are_rejected() {
		for raw in ["", "Actions||Quit", "Actions|", "|Quit", "Actions| |Quit"] {
			assert_eq!(ActionPath::parse(raw), Err(ActionError::InvalidPath(raw.to_owned())), "{raw:?}");
		}
	}

	#[test]
	fn bare_root_is_rejected() {
		assert!(ActionPath::parse("Actions").is_err());
	}
}
