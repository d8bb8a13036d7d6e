//! Window-state snapshots.
//!
//! The [`Window`] trait is everything the core needs from a GUI toolkit:
//! opaque geometry and state blobs, dock panels keyed by [`DockArea`], and
//! widget visibility. [`LayoutManager`] stores named snapshots of a window in
//! the settings store and restores them. [`HeadlessWindow`] implements the
//! trait without any toolkit and backs headless runs and tests.

#![warn(missing_docs)]

mod error;
mod headless;
mod manager;
mod window;

pub use error::{LayoutError, Result};
pub use headless::{Geometry, HeadlessWindow};
pub use manager::{Layout, LayoutEvent, LayoutManager, PENDING_EVENTS, STARTUP_LAYOUT, default_layouts};
pub use window::{DockArea, Window};
