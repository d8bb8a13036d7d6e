//! Type-tagged scalar values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A settings value tagged with its scalar type.
///
/// Missing keys read back as [`TaggedValue::Null`]; the coercions return
/// `None` when the stored scalar cannot be viewed as the requested type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum TaggedValue {
	/// Absent value sentinel.
	#[default]
	Null,
	/// Signed integer.
	Int(i64),
	/// UTF-8 text.
	#[serde(rename = "string")]
	Str(String),
	/// Boolean flag.
	Bool(bool),
	/// Opaque byte blob, stored as base64 text.
	Bytes(#[serde(with = "base64_blob")] Vec<u8>),
}

impl TaggedValue {
	/// Returns true for the absent-value sentinel.
	pub const fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	/// Views the value as an integer.
	pub fn to_int(&self) -> Option<i64> {
		match self {
			Self::Int(value) => Some(*value),
			Self::Bool(value) => Some(i64::from(*value)),
			Self::Str(text) => text.trim().parse().ok(),
			Self::Null | Self::Bytes(_) => None,
		}
	}

	/// Views the value as a boolean.
	///
	/// Text accepts `true`/`false` in any case as well as `1`/`0`.
	pub fn to_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(value) => Some(*value),
			Self::Int(value) => Some(*value != 0),
			Self::Str(text) => match text.trim().to_ascii_lowercase().as_str() {
				"true" | "1" => Some(true),
				"false" | "0" => Some(false),
				_ => None,
			},
			Self::Null | Self::Bytes(_) => None,
		}
	}

	/// Views the value as text.
	pub fn to_text(&self) -> Option<String> {
		match self {
			Self::Null => None,
			Self::Int(value) => Some(value.to_string()),
			Self::Str(text) => Some(text.clone()),
			Self::Bool(value) => Some(value.to_string()),
			Self::Bytes(bytes) => String::from_utf8(bytes.clone()).ok(),
		}
	}

	/// Views the value as raw bytes.
	pub fn to_bytes(&self) -> Option<Vec<u8>> {
		match self {
			Self::Bytes(bytes) => Some(bytes.clone()),
			Self::Str(text) => Some(text.as_bytes().to_vec()),
			_ => None,
		}
	}

	/// Name of the scalar tag, as written to disk.
	pub const fn type_name(&self) -> &'static str {
		match self {
			Self::Null => "null",
			Self::Int(_) => "int",
			Self::Str(_) => "string",
			Self::Bool(_) => "bool",
			Self::Bytes(_) => "bytes",
		}
	}
}

impl fmt::Display for TaggedValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Null => f.write_str("null"),
			Self::Int(value) => write!(f, "{value}"),
			Self::Str(text) => f.write_str(text),
			Self::Bool(value) => write!(f, "{value}"),
			Self::Bytes(bytes) => write!(f, "<{} bytes>", bytes.len()),
		}
	}
}

impl From<i64> for TaggedValue {
	fn from(value: i64) -> Self {
		Self::Int(value)
	}
}

impl From<i32> for TaggedValue {
	fn from(value: i32) -> Self {
		Self::Int(i64::from(value))
	}
}

impl From<u16> for TaggedValue {
	fn from(value: u16) -> Self {
		Self::Int(i64::from(value))
	}
}

impl From<bool> for TaggedValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<&str> for TaggedValue {
	fn from(value: &str) -> Self {
		Self::Str(value.to_owned())
	}
}

impl From<String> for TaggedValue {
	fn from(value: String) -> Self {
		Self::Str(value)
	}
}

impl From<Vec<u8>> for TaggedValue {
	fn from(value: Vec<u8>) -> Self {
		Self::Bytes(value)
	}
}

impl From<&[u8]> for TaggedValue {
	fn from(value: &[u8]) -> Self {
		Self::Bytes(value.to_vec())
	}
}

mod base64_blob {
	use base64::Engine;
	use base64::engine::general_purpose::STANDARD;
	use serde::{Deserialize, Deserializer, Serializer};

	pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&STANDARD.encode(bytes))
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
		let text = String::deserialize(deserializer)?;
		STANDARD.decode(text.as_bytes()).map_err(serde::de::Error::custom)
	}
}

#[cfg(test)]
mod tests;
