//! Inbound events and outbound notifications.
//!
//! # Flow
//!
//! 1. `Transport` yields `Event`s -> poll loop
//! 2. Poll loop, broadcaster and lifecycle emit `Notification`s -> embedder
//!
//! Notifications are best-effort: the channel is bounded and never blocks
//! the core.

pub mod channels;
pub mod types;

pub use channels::{NotificationReceiver, Notifier, notification_channel};
pub use types::{Event, Notification, NotificationKind};
