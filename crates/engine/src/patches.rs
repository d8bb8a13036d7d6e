//! One-shot patches applied to the user data tree at boot.
//!
//! Patches are compiled in and collected with `inventory`. The uid of every
//! patch that applied successfully is appended to a history file, one per
//! line, so each patch runs at most once per user data directory.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::AppDirs;

/// History file name inside `patches/`.
pub const PATCHES_HISTORY_FILE: &str = "Umbra_Patches.rc";

/// A patch collected at link time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchReg {
	/// Display name; patches apply in name order.
	pub name: &'static str,
	/// Identifier recorded in the history once applied.
	pub uid: &'static str,
	/// Runs the patch; false reports failure.
	pub apply: fn(&AppDirs) -> bool,
}

inventory::collect!(PatchReg);

inventory::submit! {
	PatchReg { name: "001_dummy", uid: "845d7ca6fca3888b0293eb982fa51ddf", apply: |_| true }
}

/// Patch registration and application failures.
#[derive(Debug, Error)]
pub enum PatchError {
	/// A patch with this name is already registered.
	#[error("'{0}' patch is already registered")]
	Registered(String),
	/// Another patch already uses this uid.
	#[error("'{name}' patch reuses uid '{uid}'")]
	DuplicateUid {
		/// Offending patch.
		name: String,
		/// Shared uid.
		uid: String,
	},
	/// No patch is registered under this name.
	#[error("'{0}' patch is not registered")]
	Missing(String),
	/// The patch reported failure.
	#[error("'{0}' patch failed to apply")]
	Apply(String),
	/// The history file could not be read or written.
	#[error("cannot access patches history {path}: {error}")]
	History {
		/// History file.
		path: PathBuf,
		/// Underlying error.
		#[source]
		error: std::io::Error,
	},
}

/// Outcome of [`PatchesManager::apply_patches`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchReport {
	/// Patches applied by this call.
	pub applied: Vec<String>,
	/// Patches found in the history.
	pub skipped: Vec<String>,
	/// Patches that reported failure.
	pub failed: Vec<String>,
}

/// Registered patches and their application history.
#[derive(Debug)]
pub struct PatchesManager {
	history_file: PathBuf,
	patches: BTreeMap<String, PatchReg>,
}

impl PatchesManager {
	/// Manager recording into `history_file`; the file is created on first
	/// application.
	pub fn new(history_file: impl Into<PathBuf>) -> Self {
		Self {
			history_file: history_file.into(),
			patches: BTreeMap::new(),
		}
	}

	/// History file location.
	pub fn history_file(&self) -> &Path {
		&self.history_file
	}

	/// Registers one patch.
	pub fn register_patch(&mut self, patch: PatchReg) -> Result<(), PatchError> {
		if self.patches.contains_key(patch.name) {
			return Err(PatchError::Registered(patch.name.to_owned()));
		}
		if self.get_patch_from_uid(patch.uid).is_some() {
			return Err(PatchError::DuplicateUid {
				name: patch.name.to_owned(),
				uid: patch.uid.to_owned(),
			});
		}
		tracing::debug!(patch = patch.name, uid = patch.uid, "engine.patches.register");
		self.patches.insert(patch.name.to_owned(), patch);
		Ok(())
	}

	/// Registers every patch submitted through `inventory`; returns the count.
	pub fn register_patches(&mut self) -> Result<usize, PatchError> {
		let mut count = 0;
		for patch in inventory::iter::<PatchReg> {
			self.register_patch(*patch)?;
			count += 1;
		}
		Ok(count)
	}

	/// Registered patch names in application order.
	pub fn list_patches(&self) -> Vec<String> {
		self.patches.keys().cloned().collect()
	}

	/// Whether a patch is registered under `name`.
	pub fn is_patch_registered(&self, name: &str) -> bool {
		self.patches.contains_key(name)
	}

	/// The patch with `uid`.
	pub fn get_patch_from_uid(&self, uid: &str) -> Option<&PatchReg> {
		self.patches.values().find(|patch| patch.uid == uid)
	}

	/// Uids recorded in the history file.
	pub fn history(&self) -> Result<BTreeSet<String>, PatchError> {
		match fs::read_to_string(&self.history_file) {
			Ok(content) => Ok(content.lines().map(str::trim).filter(|line| !line.is_empty()).map(str::to_owned).collect()),
			Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(BTreeSet::new()),
			Err(error) => Err(self.history_error(error)),
		}
	}

	/// Applies `name` unless its uid is in the history; returns whether it
	/// ran.
	pub fn apply_patch(&self, name: &str, dirs: &AppDirs) -> Result<bool, PatchError> {
		let patch = self.patches.get(name).ok_or_else(|| PatchError::Missing(name.to_owned()))?;
		if self.history()?.contains(patch.uid) {
			tracing::debug!(patch = name, "engine.patches.already_applied");
			return Ok(false);
		}
		if !(patch.apply)(dirs) {
			return Err(PatchError::Apply(name.to_owned()));
		}
		self.record(patch.uid)?;
		tracing::info!(patch = name, uid = patch.uid, "engine.patches.applied");
		Ok(true)
	}

	/// Applies every registered patch in name order.
	///
	/// A failing patch is reported and the rest still run; history errors
	/// abort.
	pub fn apply_patches(&self, dirs: &AppDirs) -> Result<PatchReport, PatchError> {
		let mut report = PatchReport::default();
		for name in self.patches.keys() {
			match self.apply_patch(name, dirs) {
				Ok(true) => report.applied.push(name.clone()),
				Ok(false) => report.skipped.push(name.clone()),
				Err(PatchError::Apply(name)) => report.failed.push(name),
				Err(error) => return Err(error),
			}
		}
		Ok(report)
	}

	fn record(&self, uid: &str) -> Result<(), PatchError> {
		let mut file = OpenOptions::new()
			.create(true)
			.append(true)
			.open(&self.history_file)
			.map_err(|error| self.history_error(error))?;
		writeln!(file, "{uid}").map_err(|error| self.history_error(error))
	}

	fn history_error(&self, error: std::io::Error) -> PatchError {
		PatchError::History {
			path: self.history_file.clone(),
			error,
		}
	}
}

#[cfg(test)]
mod tests;
