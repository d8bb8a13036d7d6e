//! Sectioned, type-tagged persistent settings store.
//!
//! Settings are addressed by `(section, key)` and hold [`TaggedValue`]s.
//! Reads go through a lock-free snapshot; writes and [`SettingsStore::sync`]
//! serialize through a short exclusive lock. The backing file is TOML and is
//! replaced atomically on every sync.

#![warn(missing_docs)]

mod defaults;
mod error;
mod store;
mod value;

pub use defaults::{DEFAULT_LAYOUTS, SETTINGS_SECTION, LAYOUTS_SECTION, default_preferences};
pub use error::{Result, SettingsError};
pub use store::SettingsStore;
pub use value::TaggedValue;
