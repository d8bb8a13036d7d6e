use std::path::PathBuf;

use clap::Parser;
use umbra_engine::EngineOptions;

#[derive(Parser, Debug)]
#[command(name = "umbra")]
#[command(about = "Umbra application host")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Print the application name and version, then exit
	#[arg(short = 'a', long = "about")]
	pub about: bool,

	/// Logging verbosity: 0 and 1 errors, 2 warnings, 3 info, 4 debug
	#[arg(short = 'v', long = "verbose", value_name = "N", value_parser = clap::value_parser!(i64).range(0..=4))]
	pub verbosity: Option<i64>,

	/// Stdout log layout (Default, Extended, Standard)
	#[arg(short = 'f', long = "loggingFormatter", value_name = "NAME")]
	pub logging_formatter: Option<String>,

	/// User application data directory
	#[arg(short = 'u', long = "userApplicationDataDirectory", value_name = "PATH")]
	pub user_data_dir: Option<PathBuf>,

	/// Do not report boot progress
	#[arg(short = 's', long = "hideSplashScreen")]
	pub hide_splash: bool,
}

impl Cli {
	/// Engine options carrying the command-line overrides.
	pub fn engine_options(&self) -> EngineOptions {
		EngineOptions {
			user_data_dir: self.user_data_dir.clone(),
			verbosity: self.verbosity,
			logging_formatter: self.logging_formatter.clone(),
			..EngineOptions::default()
		}
	}
}

#[cfg(test)]
mod tests;
