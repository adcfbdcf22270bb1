//! Notification channel factory and the sending handle used by the core.
//!
//! The channel is bounded and the core never waits for space in it: when
//! the embedder falls behind, new notifications are dropped (and a warning
//! is logged) instead of stalling the poll loop.

use super::types::Notification;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

/// Receiver handle for notifications. The embedder must keep draining it.
pub type NotificationReceiver = mpsc::Receiver<Notification>;

/// Create a new notification channel.
///
/// Returns the core-side [`Notifier`] and the embedder-side receiver.
/// A `capacity` of zero is raised to one.
pub fn notification_channel(capacity: usize) -> (Notifier, NotificationReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (Notifier { tx }, rx)
}

/// Non-blocking sender for [`Notification`]s.
///
/// Cloned into every component that reports to the embedder.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::Sender<Notification>,
}

impl Notifier {
    pub fn info(&self, message: impl Into<String>) {
        self.emit(Notification::info(message));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(Notification::error(message));
    }

    /// Queue a notification, dropping it if the channel is full or closed.
    pub fn emit(&self, notification: Notification) {
        match self.tx.try_send(notification) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => {
                warn!(
                    kind = %dropped.kind,
                    message = %dropped.message,
                    "Notification channel full, dropping notification"
                );
            }
            Err(TrySendError::Closed(dropped)) => {
                debug!(
                    kind = %dropped.kind,
                    message = %dropped.message,
                    "Notification receiver dropped"
                );
            }
        }
    }
}
