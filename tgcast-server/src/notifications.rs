//! Drains the worker's notification stream into the log.

use tgcast_core::{NotificationKind, NotificationReceiver};
use tokio::task::JoinHandle;

/// Spawn a task that logs every notification until the worker is dropped.
pub fn spawn_notification_logger(mut notification_rx: NotificationReceiver) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(notification) = notification_rx.recv().await {
            match notification.kind {
                NotificationKind::Info => {
                    tracing::info!(target: "tgcast::bot", "{}", notification.message);
                }
                NotificationKind::Error => {
                    tracing::error!(target: "tgcast::bot", "{}", notification.message);
                }
            }
        }
        tracing::debug!("Notification stream closed");
    })
}
