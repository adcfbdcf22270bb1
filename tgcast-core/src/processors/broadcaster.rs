//! Broadcaster processor.
//!
//! The Broadcaster is responsible for:
//! - Refusing a broadcast when the audience guard finds nobody to reach
//! - Sending the text to every active recipient, one after another
//! - Reporting each failed delivery as an error notification
//!
//! The subscriber lock is held for the entire fan-out, so a broadcast and a
//! poll batch never interleave. Failed deliveries do not abort the rest.

use crate::config::BroadcastGuard;
use crate::events::Notifier;
use crate::subscribers::SharedSubscribers;
use crate::transport::{Reply, Transport};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that prevent a broadcast from starting.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BroadcastError {
    #[error("bot doesn't have any chats")]
    NoSubscribers,
}

/// Per-call delivery counts. Failures are also reported as notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BroadcastReport {
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// Fans a text out to the active subscribers.
#[derive(Clone)]
pub struct Broadcaster {
    transport: Arc<dyn Transport>,
    subscribers: SharedSubscribers,
    notifier: Notifier,
    guard: BroadcastGuard,
}

impl Broadcaster {
    pub fn new(
        transport: Arc<dyn Transport>,
        subscribers: SharedSubscribers,
        notifier: Notifier,
        guard: BroadcastGuard,
    ) -> Self {
        Self {
            transport,
            subscribers,
            notifier,
            guard,
        }
    }

    pub async fn broadcast(&self, text: &str) -> Result<BroadcastReport, BroadcastError> {
        let table = self.subscribers.lock().await;

        let has_audience = match self.guard {
            BroadcastGuard::AnyRecipient => !table.is_empty(),
            BroadcastGuard::AnyActive => table.has_active(),
        };
        if !has_audience {
            return Err(BroadcastError::NoSubscribers);
        }

        let mut report = BroadcastReport::default();
        for recipient_id in table.active_ids() {
            report.attempted += 1;
            match self.transport.send_message(recipient_id, text).await {
                Ok(Reply::Success(())) => {
                    report.delivered += 1;
                }
                Ok(Reply::Rejected(failure)) => {
                    report.failed += 1;
                    warn!(chat_id = recipient_id, %failure, "sendMessage rejected");
                    self.notifier.error(format!(
                        "sending message failed to chat id: {recipient_id} {failure}"
                    ));
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(chat_id = recipient_id, error = %e, "sendMessage failed");
                    self.notifier.error(format!(
                        "sending message failed to chat id: {recipient_id}: {e}"
                    ));
                }
            }
        }

        debug!(?report, "Broadcast finished");
        Ok(report)
    }
}
