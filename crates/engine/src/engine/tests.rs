use std::path::Path;

use umbra_settings::{SETTINGS_SECTION, SettingsStore};

use super::*;

#[test]
fn logging_config_prefers_options_over_preferences() {
	let settings = SettingsStore::in_memory();
	settings.set_key(SETTINGS_SECTION, "verbosityLevel", 1_i64);
	settings.set_key(SETTINGS_SECTION, "loggingFormatter", "Standard");
	let dirs = AppDirs::new("/data/umbra");

	let (config, rejected) = logging_config(&EngineOptions::default(), &settings, &dirs);
	assert_eq!(config.verbosity, 1);
	assert_eq!(config.format, LogFormat::Standard);
	assert_eq!(config.directory.as_deref(), Some(Path::new("/data/umbra/logging")));
	assert!(rejected.is_none());

	let options = EngineOptions {
		verbosity: Some(4),
		logging_formatter: Some("extended".to_owned()),
		..EngineOptions::default()
	};
	let (config, _) = logging_config(&options, &settings, &dirs);
	assert_eq!(config.verbosity, 4);
	assert_eq!(config.format, LogFormat::Extended);
}

#[test]
fn unknown_formatter_falls_back_to_default() {
	let settings = SettingsStore::in_memory();
	let options = EngineOptions {
		logging_formatter: Some("Fancy".to_owned()),
		..EngineOptions::default()
	};
	let (config, rejected) = logging_config(&options, &settings, &AppDirs::new("/tmp/umbra"));
	assert_eq!(config.format, LogFormat::Default);
	assert!(rejected.is_some_and(|error| error.contains("fancy")));
}

#[test]
fn default_requisites_are_the_manager_components() {
	let options = EngineOptions::default();
	assert_eq!(options.requisites, ["factory.preferences_manager", "factory.components_manager_ui"]);
	assert_eq!(options.request_interval, Duration::from_millis(125));
}
