//! Baked-in preference table applied on first run.

use crate::TaggedValue;

/// Section holding application-wide preferences.
pub const SETTINGS_SECTION: &str = "Settings";

/// Section holding layout snapshots.
pub const LAYOUTS_SECTION: &str = "Layouts";

/// Layout slots known out of the box.
pub const DEFAULT_LAYOUTS: &[&str] = &["one", "two", "three", "four", "five", "developmentCentric", "preferencesCentric"];

/// Returns the `Settings` section defaults as `(key, value)` pairs.
pub fn default_preferences() -> Vec<(&'static str, TaggedValue)> {
	vec![
		("verbosityLevel", TaggedValue::Int(3)),
		("loggingFormatter", TaggedValue::from("Default")),
		("restoreGeometryOnLayoutChange", TaggedValue::Bool(false)),
		("deactivatedComponents", TaggedValue::from("")),
	]
}
