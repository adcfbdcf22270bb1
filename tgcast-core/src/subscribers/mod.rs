//! The subscriber table and its shared, lock-guarded handle.
//!
//! The table maps a recipient id to its consent flag. Recipients that
//! opted out stay in the table with `false`: it records every known
//! recipient, not only the active ones.

mod persistence;

pub use persistence::{DEFAULT_SUBSCRIBERS_PATH, JsonFileStore, StoreError, SubscriberPersistence};

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// Plain recipient-id → active mapping, as loaded and saved.
pub type SubscriberMap = BTreeMap<i64, bool>;

/// Counts reported to the embedder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SubscriberSummary {
    /// Every recipient ever seen, active or not.
    pub known: usize,
    pub active: usize,
}

/// In-memory subscriber state. Only reachable through [`SharedSubscribers`].
#[derive(Debug, Default)]
pub struct SubscriberTable {
    entries: SubscriberMap,
}

impl SubscriberTable {
    /// Set the consent flag of `recipient_id`, returning the previous one.
    pub fn set(&mut self, recipient_id: i64, active: bool) -> Option<bool> {
        self.entries.insert(recipient_id, active)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_active(&self) -> bool {
        self.entries.values().any(|active| *active)
    }

    pub fn active_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.entries
            .iter()
            .filter(|(_, active)| **active)
            .map(|(id, _)| *id)
    }

    pub fn summary(&self) -> SubscriberSummary {
        SubscriberSummary {
            known: self.entries.len(),
            active: self.active_ids().count(),
        }
    }

    /// Merge previously persisted entries into the table.
    ///
    /// Entries already in memory win: a save may have failed since the map
    /// was persisted, so the stored consent can be stale.
    pub fn merge(&mut self, loaded: SubscriberMap) {
        for (recipient_id, active) in loaded {
            self.entries.entry(recipient_id).or_insert(active);
        }
    }

    /// Consistent copy of the table for persistence.
    pub fn snapshot(&self) -> SubscriberMap {
        self.entries.clone()
    }
}

/// Cloneable handle to the subscriber table shared by the poll loop
/// (writer) and the broadcaster (reader).
///
/// A single async mutex guards every access. The broadcaster keeps it for
/// the whole fan-out, so it must be an async lock.
#[derive(Debug, Clone, Default)]
pub struct SharedSubscribers {
    inner: Arc<Mutex<SubscriberTable>>,
}

impl SharedSubscribers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire exclusive access to the table.
    pub async fn lock(&self) -> MutexGuard<'_, SubscriberTable> {
        self.inner.lock().await
    }

    pub async fn snapshot(&self) -> SubscriberMap {
        self.lock().await.snapshot()
    }

    pub async fn summary(&self) -> SubscriberSummary {
        self.lock().await.summary()
    }
}
