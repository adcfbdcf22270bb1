#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]
#![forbid(unsafe_code)]

pub mod config;
pub mod events;
pub mod processors;
pub mod subscribers;
pub mod transport;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{BroadcastGuard, WorkerConfig};
pub use events::{Event, Notification, NotificationKind, NotificationReceiver};
pub use processors::BroadcastReport;
pub use subscribers::{JsonFileStore, SubscriberMap, SubscriberPersistence, SubscriberSummary};
pub use transport::{ApiFailure, Reply, Transport, TransportError};
pub use worker::{Worker, WorkerError};
