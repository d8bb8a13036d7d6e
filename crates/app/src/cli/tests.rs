use std::path::Path;

use clap::Parser;

use super::Cli;

#[test]
fn long_flags_use_application_spelling() {
	let cli = Cli::try_parse_from([
		"umbra",
		"--verbose",
		"4",
		"--loggingFormatter",
		"Extended",
		"--userApplicationDataDirectory",
		"/tmp/umbra",
		"--hideSplashScreen",
	])
	.unwrap();
	assert_eq!(cli.verbosity, Some(4));
	assert_eq!(cli.logging_formatter.as_deref(), Some("Extended"));
	assert_eq!(cli.user_data_dir.as_deref(), Some(Path::new("/tmp/umbra")));
	assert!(cli.hide_splash);
	assert!(!cli.about);
}

#[test]
fn short_flags() {
	let cli = Cli::try_parse_from(["umbra", "-a", "-s", "-v", "0", "-u", "data"]).unwrap();
	assert!(cli.about);
	assert!(cli.hide_splash);
	assert_eq!(cli.verbosity, Some(0));

	let options = cli.engine_options();
	assert_eq!(options.verbosity, Some(0));
	assert_eq!(options.user_data_dir.as_deref(), Some(Path::new("data")));
	assert!(options.install_logging);
}

#[test]
fn verbosity_out_of_range_is_rejected() {
	assert!(Cli::try_parse_from(["umbra", "-v", "5"]).is_err());
	assert!(Cli::try_parse_from(["umbra", "-v", "-1"]).is_err());
}
