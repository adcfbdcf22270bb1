//! Runtime configuration for the [`Worker`](crate::Worker).
//!
//! Loading and validating these values from a file is the embedder's job;
//! the core only consumes the resolved struct.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default delay between two `getUpdates` calls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Default capacity of the notification channel.
pub const DEFAULT_NOTIFICATION_BUFFER: usize = 256;

/// Decides when a broadcast is refused for lack of an audience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BroadcastGuard {
    /// Refuse only when no recipient was ever seen, active or not.
    AnyRecipient,
    /// Refuse unless at least one recipient is currently active.
    #[default]
    AnyActive,
}

/// Configuration for a [`Worker`](crate::Worker).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Fixed sleep between two poll iterations.
    pub poll_interval: Duration,
    /// Capacity of the bounded notification channel. Notifications that do
    /// not fit are dropped.
    pub notification_buffer: usize,
    pub broadcast_guard: BroadcastGuard,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            notification_buffer: DEFAULT_NOTIFICATION_BUFFER,
            broadcast_guard: BroadcastGuard::default(),
        }
    }
}
