//! The settings store and its atomic file persistence.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::{Mutex, RwLock};

use crate::defaults::{LAYOUTS_SECTION, SETTINGS_SECTION, default_preferences};
use crate::{Result, SettingsError, TaggedValue};

type Section = BTreeMap<String, TaggedValue>;
type Sections = BTreeMap<String, Section>;

/// Keyed, sectioned persistent store with type-tagged values.
///
/// All reads load the current snapshot without locking. Writers clone the
/// snapshot under `write_lock`, mutate, then publish; [`Self::sync`] takes
/// the same lock so a flush never observes a half-applied write.
pub struct SettingsStore {
	path: Option<PathBuf>,
	data: ArcSwap<Sections>,
	write_lock: Mutex<()>,
	layouts: RwLock<Vec<String>>,
	first_run: bool,
}

impl SettingsStore {
	/// Opens the store backed by `path`.
	///
	/// A missing file marks a first run and seeds the baked-in preferences.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
		let path = path.into();
		let (sections, first_run) = match std::fs::read_to_string(&path) {
			Ok(text) => {
				let sections: Sections = toml::from_str(&text).map_err(|error| SettingsError::Parse { path: path.clone(), error })?;
				(sections, false)
			}
			Err(error) if error.kind() == std::io::ErrorKind::NotFound => (Sections::new(), true),
			Err(error) => return Err(SettingsError::Io { path, error }),
		};

		let store = Self {
			path: Some(path),
			data: ArcSwap::from_pointee(sections),
			write_lock: Mutex::new(()),
			layouts: RwLock::new(Vec::new()),
			first_run,
		};
		if first_run {
			tracing::info!(path = ?store.path, "settings.first_run");
			store.set_default_preferences();
		}
		Ok(store)
	}

	/// Creates a store with no backing file; [`Self::sync`] is a no-op.
	pub fn in_memory() -> Self {
		let store = Self {
			path: None,
			data: ArcSwap::from_pointee(Sections::new()),
			write_lock: Mutex::new(()),
			layouts: RwLock::new(Vec::new()),
			first_run: true,
		};
		store.set_default_preferences();
		store
	}

	/// Path of the backing file, if any.
	pub fn path(&self) -> Option<&Path> {
		self.path.as_deref()
	}

	/// Returns true when the backing file did not exist at open time.
	pub const fn is_first_run(&self) -> bool {
		self.first_run
	}

	/// Returns the value at `(section, key)`, or [`TaggedValue::Null`] when absent.
	pub fn get_key(&self, section: &str, key: &str) -> TaggedValue {
		self.data.load().get(section).and_then(|entries| entries.get(key)).cloned().unwrap_or_default()
	}

	/// Returns true when `(section, key)` holds a value.
	pub fn key_exists(&self, section: &str, key: &str) -> bool {
		self.data.load().get(section).is_some_and(|entries| entries.contains_key(key))
	}

	/// Stores `value` at `(section, key)`. Storing null removes the key.
	pub fn set_key(&self, section: &str, key: &str, value: impl Into<TaggedValue>) {
		let value = value.into();
		if value.is_null() {
			self.remove_key(section, key);
			return;
		}
		tracing::trace!(section, key, kind = value.type_name(), "settings.set_key");
		self.update(|sections| {
			sections.entry(section.to_owned()).or_default().insert(key.to_owned(), value);
		});
	}

	/// Removes `(section, key)`; returns whether it existed.
	pub fn remove_key(&self, section: &str, key: &str) -> bool {
		if !self.key_exists(section, key) {
			return false;
		}
		self.update(|sections| {
			if let Some(entries) = sections.get_mut(section) {
				entries.remove(key);
				if entries.is_empty() {
					sections.remove(section);
				}
			}
		});
		true
	}

	/// Lists section names in sorted order.
	pub fn sections(&self) -> Vec<String> {
		self.data.load().keys().cloned().collect()
	}

	/// Lists the keys of `section` in sorted order.
	pub fn keys(&self, section: &str) -> Vec<String> {
		self.data.load().get(section).map(|entries| entries.keys().cloned().collect()).unwrap_or_default()
	}

	/// Writes the baked-in `Settings` defaults, overwriting existing values.
	pub fn set_default_preferences(&self) {
		let defaults = default_preferences();
		self.update(|sections| {
			let entries = sections.entry(SETTINGS_SECTION.to_owned()).or_default();
			for (key, value) in defaults {
				entries.insert(key.to_owned(), value);
			}
		});
	}

	/// Registers the known layout slots and seeds their default entries.
	///
	/// Each layout whose name is not listed in `ignored` gets a visible
	/// central widget and active category index 0, unless already stored.
	pub fn set_default_layouts(&self, names: &[&str], ignored: &[&str]) {
		{
			let mut layouts = self.layouts.write();
			for name in names {
				if !layouts.iter().any(|known| known == name) {
					layouts.push((*name).to_owned());
				}
			}
		}

		self.update(|sections| {
			let entries = sections.entry(LAYOUTS_SECTION.to_owned()).or_default();
			for name in names.iter().filter(|name| !ignored.contains(name)) {
				entries.entry(format!("{name}_centralWidget")).or_insert(TaggedValue::Bool(true));
				entries.entry(format!("{name}_activeLabel")).or_insert(TaggedValue::Int(0));
			}
		});
	}

	/// Layout slot names registered through [`Self::set_default_layouts`].
	pub fn default_layouts(&self) -> Vec<String> {
		self.layouts.read().clone()
	}

	/// Flushes the current snapshot to the backing file.
	///
	/// The file is written to a sibling temporary and renamed over the
	/// target, so readers see either the old or the new contents.
	pub fn sync(&self) -> Result<()> {
		let Some(path) = self.path.as_deref() else {
			return Ok(());
		};

		let _guard = self.write_lock.lock();
		let text = toml::to_string(&**self.data.load())?;
		let io_err = |error| SettingsError::Io {
			path: path.to_path_buf(),
			error,
		};

		let dir = match path.parent() {
			Some(dir) if !dir.as_os_str().is_empty() => dir,
			_ => Path::new("."),
		};
		std::fs::create_dir_all(dir).map_err(io_err)?;

		let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
		tmp.write_all(text.as_bytes()).map_err(io_err)?;
		tmp.as_file().sync_all().map_err(io_err)?;
		tmp.persist(path).map_err(|err| io_err(err.error))?;

		tracing::debug!(path = %path.display(), "settings.sync");
		Ok(())
	}

	fn update(&self, apply: impl FnOnce(&mut Sections)) {
		let _guard = self.write_lock.lock();
		let mut next = Sections::clone(&self.data.load());
		apply(&mut next);
		self.data.store(Arc::new(next));
	}
}

impl std::fmt::Debug for SettingsStore {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SettingsStore")
			.field("path", &self.path)
			.field("sections", &self.data.load().len())
			.field("first_run", &self.first_run)
			.finish()
	}
}

#[cfg(test)]
mod tests;
