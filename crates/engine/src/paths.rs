//! User application data directory tree.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{EngineError, PATCHES_HISTORY_FILE, Result};

/// Application directory name under the platform data directory.
pub const APPLICATION_DIRECTORY: &str = "Umbra";

/// Settings file name inside `settings/`.
pub const SETTINGS_FILE: &str = "Default.toml";

/// Resolved locations under the user application data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
	root: PathBuf,
}

impl AppDirs {
	/// Uses `root` as the user application data directory.
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	/// `<platform data dir>/Umbra`.
	pub fn platform_default() -> Result<Self> {
		dirs::data_dir()
			.map(|dir| Self::new(dir.join(APPLICATION_DIRECTORY)))
			.ok_or(EngineError::NoDataDirectory)
	}

	/// Root of the tree.
	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Directory holding the settings file.
	pub fn settings_dir(&self) -> PathBuf {
		self.root.join("settings")
	}

	/// The settings file.
	pub fn settings_file(&self) -> PathBuf {
		self.settings_dir().join(SETTINGS_FILE)
	}

	/// Directory holding session log files.
	pub fn logging_dir(&self) -> PathBuf {
		self.root.join("logging")
	}

	/// User component search path.
	pub fn components_dir(&self) -> PathBuf {
		self.root.join("components")
	}

	/// Scratch files exchanged with external tools.
	pub fn io_dir(&self) -> PathBuf {
		self.root.join("io")
	}

	/// Directory holding the patches history.
	pub fn patches_dir(&self) -> PathBuf {
		self.root.join("patches")
	}

	/// Uids of applied patches, one per line.
	pub fn patches_history_file(&self) -> PathBuf {
		self.patches_dir().join(PATCHES_HISTORY_FILE)
	}

	/// Creates every directory of the tree.
	pub fn create(&self) -> Result<()> {
		let tree = [
			self.root.clone(),
			self.settings_dir(),
			self.logging_dir(),
			self.components_dir(),
			self.io_dir(),
			self.patches_dir(),
		];
		for dir in tree {
			fs::create_dir_all(&dir).map_err(|error| EngineError::Directory { path: dir, error })?;
		}
		tracing::debug!(root = %self.root.display(), "engine.dirs.ready");
		Ok(())
	}
}
