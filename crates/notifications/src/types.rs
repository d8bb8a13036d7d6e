//! Value types shared by notifications and notifiers.

mod anchor;
mod geometry;
mod level;
mod style;

pub use anchor::Anchor;
pub use geometry::{Point, Rect, Size};
pub use level::Level;
pub use style::{NotificationStyle, Rgb};
