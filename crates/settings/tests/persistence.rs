use pretty_assertions::assert_eq;
use tempfile::TempDir;
use umbra_settings::{SettingsError, SettingsStore};

#[test]
fn sync_then_reopen_returns_the_same_values() {
	let dir = TempDir::new().unwrap();
	let path = dir.path().join("settings").join("umbra.toml");

	let store = SettingsStore::open(&path).unwrap();
	assert!(store.is_first_run());
	store.set_key("Settings", "deactivatedComponents", "B");
	store.set_key("Layouts", "startup_geometry", vec![0u8, 255, 10, 13]);
	store.set_key("tcpServer", "port", 16385i64);
	store.set_key("tcpServer", "autostart", false);
	store.sync().unwrap();

	let reopened = SettingsStore::open(&path).unwrap();
	assert!(!reopened.is_first_run());
	assert_eq!(reopened.get_key("Settings", "deactivatedComponents").to_text().as_deref(), Some("B"));
	assert_eq!(reopened.get_key("Layouts", "startup_geometry").to_bytes(), Some(vec![0, 255, 10, 13]));
	assert_eq!(reopened.get_key("tcpServer", "port").to_int(), Some(16385));
	assert_eq!(reopened.get_key("tcpServer", "autostart").to_bool(), Some(false));
	assert_eq!(reopened.get_key("Settings", "verbosityLevel").to_int(), Some(3));
}

#[test]
fn sync_leaves_no_temporaries_behind() {
	let dir = TempDir::new().unwrap();
	let path = dir.path().join("umbra.toml");

	let store = SettingsStore::open(&path).unwrap();
	store.sync().unwrap();
	store.set_key("Settings", "verbosityLevel", 4i64);
	store.sync().unwrap();

	let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().map(|entry| entry.unwrap().file_name()).collect();
	assert_eq!(entries, vec![std::ffi::OsString::from("umbra.toml")]);
}

#[test]
fn malformed_file_is_a_parse_error() {
	let dir = TempDir::new().unwrap();
	let path = dir.path().join("umbra.toml");
	std::fs::write(&path, "[Settings\nbroken").unwrap();

	let err = SettingsStore::open(&path).unwrap_err();
	assert!(matches!(err, SettingsError::Parse { .. }), "{err}");
}
