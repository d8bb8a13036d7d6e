//! Transient in-window notifications.
//!
//! [`NotificationsManager::notify`] records a [`Notification`] in the history
//! and spawns an on-screen [`Notifier`] that fades in, holds, fades out and
//! retires. Notifiers are advanced by [`NotificationsManager::tick`]; the host
//! calls it from its UI timer. New notifiers push older ones away from the
//! anchor so the stack never overlaps.
//!
//! Nothing here draws. Hosts read [`NotificationsManager::notifiers`] and
//! render each notifier at [`NotificationsManager::notifier_rect`] with its
//! current opacity.

#![warn(missing_docs)]

mod manager;
mod notification;
mod notifier;
mod placement;
mod types;

pub use manager::{NotificationsManager, NotifyOptions, PENDING_REGISTERED, TextMetrics, default_text_metrics};
pub use notification::{ClickHandler, Notification, format_notification};
pub use notifier::{Notifier, NotifierOptions, Phase};
pub use placement::calculate_rect;
pub use types::{Anchor, Level, NotificationStyle, Point, Rect, Rgb, Size};
