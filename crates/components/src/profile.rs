//! Component manifests and on-disk discovery.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{ComponentError, Result};

/// File name marking a component directory.
pub const MANIFEST_FILE: &str = "component.toml";

/// Which lifecycle hooks a component participates in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
	/// Headless: `initialize`/`uninitialize`.
	#[default]
	Default,
	/// Contributes widgets: `addWidget`/`initializeUi` and their mirrors.
	Ui,
}

impl Category {
	/// Manifest spelling.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Default => "default",
			Self::Ui => "ui",
		}
	}
}

impl fmt::Display for Category {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Description of one discovered component.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ComponentProfile {
	/// Unique dotted identifier.
	pub name: String,
	/// Human readable title.
	#[serde(default)]
	pub title: String,
	/// Lifecycle category.
	#[serde(default)]
	pub category: Category,
	/// Ordering hint within a dependency level; missing ranks sort last.
	#[serde(default)]
	pub rank: Option<i64>,
	/// Version string.
	#[serde(default)]
	pub version: String,
	/// Names of components that must be active first.
	#[serde(default)]
	pub requires: Vec<String>,
	/// Factory name used to build the live interface.
	pub interface: String,
	/// Author name.
	#[serde(default)]
	pub author: String,
	/// Author contact.
	#[serde(default)]
	pub email: String,
	/// Project page.
	#[serde(default)]
	pub url: String,
	/// One paragraph summary.
	#[serde(default)]
	pub description: String,
	/// Component directory; empty for components registered in memory.
	#[serde(skip)]
	pub path: PathBuf,
}

impl ComponentProfile {
	/// Creates a profile with only the fields the lifecycle needs.
	pub fn new(name: impl Into<String>, interface: impl Into<String>, category: Category) -> Self {
		let name = name.into();
		Self {
			title: name.clone(),
			name,
			category,
			rank: None,
			version: String::new(),
			requires: Vec::new(),
			interface: interface.into(),
			author: String::new(),
			email: String::new(),
			url: String::new(),
			description: String::new(),
			path: PathBuf::new(),
		}
	}

	/// Sets the rank.
	pub fn with_rank(mut self, rank: i64) -> Self {
		self.rank = Some(rank);
		self
	}

	/// Sets the requirements.
	pub fn with_requires<I, S>(mut self, requires: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.requires = requires.into_iter().map(Into::into).collect();
		self
	}

	/// Parses manifest text. `dir` becomes the profile path.
	pub fn parse(text: &str, dir: &Path) -> Result<Self> {
		let mut profile: Self = toml::from_str(text).map_err(|error| ComponentError::Manifest {
			path: dir.join(MANIFEST_FILE),
			error: Box::new(error),
		})?;
		profile.path = dir.to_path_buf();
		Ok(profile)
	}

	/// Reads `<dir>/component.toml`.
	pub fn load(dir: &Path) -> Result<Self> {
		let path = dir.join(MANIFEST_FILE);
		let text = fs::read_to_string(&path).map_err(|error| ComponentError::Io { path, error })?;
		Self::parse(&text, dir)
	}

	/// Sort key inside a dependency level: rank ascending, unranked last, then name.
	pub(crate) fn order_key(&self) -> (bool, i64, &str) {
		(self.rank.is_none(), self.rank.unwrap_or_default(), &self.name)
	}
}

/// Walks `search_paths` recursively and loads every manifest found.
///
/// Missing search paths are skipped; unreadable or malformed manifests are
/// errors. Results are sorted by directory for determinism.
pub fn discover(search_paths: &[PathBuf]) -> Result<Vec<ComponentProfile>> {
	let mut dirs = Vec::new();
	for root in search_paths {
		if !root.is_dir() {
			tracing::warn!(path = %root.display(), "components.discover.missing_path");
			continue;
		}
		collect_component_dirs(root, &mut dirs)?;
	}
	dirs.sort();
	dirs.dedup();

	let profiles = dirs.iter().map(|dir| ComponentProfile::load(dir)).collect::<Result<Vec<_>>>()?;
	tracing::debug!(count = profiles.len(), "components.discover");
	Ok(profiles)
}

fn collect_component_dirs(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
	let io_err = |error| ComponentError::Io { path: dir.to_path_buf(), error };
	if dir.join(MANIFEST_FILE).is_file() {
		out.push(dir.to_path_buf());
	}
	for entry in fs::read_dir(dir).map_err(io_err)? {
		let path = entry.map_err(io_err)?.path();
		if path.is_dir() {
			collect_component_dirs(&path, out)?;
		}
	}
	Ok(())
}
