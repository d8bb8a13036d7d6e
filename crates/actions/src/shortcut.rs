//! Keyboard shortcut parsing.
//!
//! ```text
//! shortcut = (modifier "+")* key
//! modifier = "ctrl" | "control" | "shift" | "alt" | "option" | "meta" | "cmd" | "super"
//! key      = char | named-key
//! ```
//!
//! Modifiers are case-insensitive and may appear in any order; the canonical
//! rendering is `Ctrl+Shift+Alt+Meta+Key`.

use std::fmt;
use std::str::FromStr;

use crate::ActionError;

bitflags::bitflags! {
	/// Modifier keys held with a shortcut key.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct Modifiers: u8 {
		/// Control key.
		const CTRL = 1 << 0;
		/// Shift key.
		const SHIFT = 1 << 1;
		/// Alt / Option key.
		const ALT = 1 << 2;
		/// Meta / Command / Super key.
		const META = 1 << 3;
	}
}

impl Modifiers {
	fn from_modifier_name(name: &str) -> Option<Self> {
		match name.to_ascii_lowercase().as_str() {
			"ctrl" | "control" => Some(Self::CTRL),
			"shift" => Some(Self::SHIFT),
			"alt" | "option" => Some(Self::ALT),
			"meta" | "cmd" | "super" => Some(Self::META),
			_ => None,
		}
	}
}

/// A key plus modifiers, e.g. `Ctrl+Alt+Return`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shortcut {
	modifiers: Modifiers,
	key: String,
}

impl Shortcut {
	/// Creates a shortcut from parts; the key is normalized.
	pub fn new(modifiers: Modifiers, key: &str) -> Self {
		Self {
			modifiers,
			key: normalize_key(key),
		}
	}

	/// Held modifiers.
	pub const fn modifiers(&self) -> Modifiers {
		self.modifiers
	}

	/// Normalized key name.
	pub fn key(&self) -> &str {
		&self.key
	}
}

/// Single characters are upper-cased; named keys get a leading capital.
fn normalize_key(key: &str) -> String {
	let mut chars = key.chars();
	match (chars.next(), chars.next()) {
		(Some(ch), None) => ch.to_uppercase().collect(),
		(Some(first), Some(_)) => {
			let rest: String = key[first.len_utf8()..].to_ascii_lowercase();
			let mut out: String = first.to_uppercase().collect();
			out.push_str(&rest);
			out
		}
		(None, _) => String::new(),
	}
}

impl FromStr for Shortcut {
	type Err = ActionError;

	fn from_str(text: &str) -> Result<Self, Self::Err> {
		let invalid = |reason: &str| ActionError::InvalidShortcut {
			shortcut: text.to_owned(),
			reason: reason.to_owned(),
		};

		let trimmed = text.trim();
		if trimmed.is_empty() {
			return Err(invalid("empty shortcut"));
		}

		// A trailing "+" is the plus key itself, as in "Ctrl++".
		let (mods_part, key) = match trimmed.strip_suffix("++") {
			Some(prefix) => (Some(prefix), "+"),
			None if trimmed == "+" => (None, "+"),
			None => match trimmed.rsplit_once('+') {
				Some((prefix, key)) => (Some(prefix), key.trim()),
				None => (None, trimmed),
			},
		};
		if key.is_empty() {
			return Err(invalid("missing key"));
		}

		let mut modifiers = Modifiers::empty();
		for name in mods_part.into_iter().flat_map(|part| part.split('+')) {
			let name = name.trim();
			let modifier = Modifiers::from_modifier_name(name).ok_or_else(|| invalid(&format!("unknown modifier '{name}'")))?;
			if modifiers.contains(modifier) {
				return Err(invalid(&format!("duplicate modifier '{name}'")));
			}
			modifiers |= modifier;
		}
		if Modifiers::from_modifier_name(key).is_some() {
			return Err(invalid("modifier used as key"));
		}

		Ok(Self::new(modifiers, key))
	}
}

impl fmt::Display for Shortcut {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (flag, name) in [
			(Modifiers::CTRL, "Ctrl"),
			(Modifiers::SHIFT, "Shift"),
			(Modifiers::ALT, "Alt"),
			(Modifiers::META, "Meta"),
		] {
			if self.modifiers.contains(flag) {
				write!(f, "{name}+")?;
			}
		}
		f.write_str(&self.key)
	}
}
