use pretty_assertions::assert_eq;

use super::SettingsStore;
use crate::TaggedValue;

#[test]
fn missing_key_reads_as_null() {
	let store = SettingsStore::in_memory();
	assert!(store.get_key("Nowhere", "nothing").is_null());
	assert!(!store.key_exists("Nowhere", "nothing"));
}

#[test]
fn first_run_seeds_default_preferences() {
	let store = SettingsStore::in_memory();
	assert!(store.is_first_run());
	assert_eq!(store.get_key("Settings", "verbosityLevel").to_int(), Some(3));
	assert_eq!(store.get_key("Settings", "loggingFormatter").to_text().as_deref(), Some("Default"));
	assert_eq!(store.get_key("Settings", "restoreGeometryOnLayoutChange").to_bool(), Some(false));
	assert_eq!(store.get_key("Settings", "deactivatedComponents").to_text().as_deref(), Some(""));
}

#[test]
fn set_then_get_round_trips_each_scalar() {
	let store = SettingsStore::in_memory();
	store.set_key("tcpServer", "port", 16384i64);
	store.set_key("tcpServer", "address", "127.0.0.1");
	store.set_key("tcpServer", "autostart", true);
	store.set_key("Layouts", "one_geometry", vec![1u8, 2, 3]);

	assert_eq!(store.get_key("tcpServer", "port").to_int(), Some(16384));
	assert_eq!(store.get_key("tcpServer", "address").to_text().as_deref(), Some("127.0.0.1"));
	assert_eq!(store.get_key("tcpServer", "autostart").to_bool(), Some(true));
	assert_eq!(store.get_key("Layouts", "one_geometry").to_bytes(), Some(vec![1, 2, 3]));
}

#[test]
fn setting_null_removes_the_key_and_empty_sections() {
	let store = SettingsStore::in_memory();
	store.set_key("scratch", "value", 1i64);
	assert!(store.sections().contains(&"scratch".to_string()));

	store.set_key("scratch", "value", TaggedValue::Null);
	assert!(!store.key_exists("scratch", "value"));
	assert!(!store.sections().contains(&"scratch".to_string()));
	assert!(!store.remove_key("scratch", "value"));
}

#[test]
fn default_layouts_skip_ignored_and_keep_existing() {
	let store = SettingsStore::in_memory();
	store.set_key("Layouts", "one_activeLabel", 2i64);
	store.set_default_layouts(&["one", "two", "startupCentric"], &["startupCentric"]);

	assert_eq!(store.get_key("Layouts", "one_activeLabel").to_int(), Some(2));
	assert_eq!(store.get_key("Layouts", "two_centralWidget").to_bool(), Some(true));
	assert!(!store.key_exists("Layouts", "startupCentric_centralWidget"));
	assert_eq!(store.default_layouts(), vec!["one", "two", "startupCentric"]);
}

#[test]
fn in_memory_sync_is_a_no_op() {
	let store = SettingsStore::in_memory();
	store.set_key("a", "b", 1i64);
	assert!(store.sync().is_ok());
	assert!(store.path().is_none());
}
