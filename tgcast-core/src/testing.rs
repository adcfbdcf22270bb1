//! In-memory doubles for the transport and persistence seams.

use crate::events::{Event, Notification, NotificationReceiver};
use crate::subscribers::{StoreError, SubscriberMap, SubscriberPersistence};
use crate::transport::{Reply, Transport, TransportError};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

type FetchResult = Result<Reply<Vec<Event>>, TransportError>;
type SendResult = Result<Reply<()>, TransportError>;

/// Replays queued fetch results (empty batches once the queue runs dry) and
/// records every call. Optional delays emulate a slow network.
#[derive(Default)]
pub struct ScriptedTransport {
    fetches: Mutex<VecDeque<FetchResult>>,
    fetch_offsets: Mutex<Vec<i64>>,
    send_failures: Mutex<HashMap<i64, SendResult>>,
    sent: Mutex<Vec<(i64, String)>>,
    fetch_delay: Mutex<Duration>,
    send_delay: Mutex<Duration>,
}

impl ScriptedTransport {
    pub fn push_batch(&self, events: Vec<Event>) {
        self.push_fetch(Ok(Reply::Success(events)));
    }

    pub fn push_fetch(&self, result: FetchResult) {
        self.fetches.lock().unwrap().push_back(result);
    }

    /// Make every send to `recipient_id` answer with `result`.
    pub fn fail_send_to(&self, recipient_id: i64, result: SendResult) {
        self.send_failures.lock().unwrap().insert(recipient_id, result);
    }

    /// Every later fetch takes `delay` before answering.
    pub fn set_fetch_delay(&self, delay: Duration) {
        *self.fetch_delay.lock().unwrap() = delay;
    }

    /// Every later send takes `delay` before answering.
    pub fn set_send_delay(&self, delay: Duration) {
        *self.send_delay.lock().unwrap() = delay;
    }

    pub fn fetch_offsets(&self) -> Vec<i64> {
        self.fetch_offsets.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }
}

fn clone_send_result(result: &SendResult) -> SendResult {
    match result {
        Ok(reply) => Ok(reply.clone()),
        Err(e) => Err(TransportError::Other(e.to_string())),
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn fetch_updates(&self, offset: i64) -> FetchResult {
        self.fetch_offsets.lock().unwrap().push(offset);
        let result = self
            .fetches
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Reply::Success(Vec::new())));
        let delay = *self.fetch_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        result
    }

    async fn send_message(&self, recipient_id: i64, text: &str) -> SendResult {
        self.sent.lock().unwrap().push((recipient_id, text.to_string()));
        let delay = *self.send_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match self.send_failures.lock().unwrap().get(&recipient_id) {
            Some(result) => clone_send_result(result),
            None => Ok(Reply::Success(())),
        }
    }
}

/// Keeps the "file" in memory and records every save.
#[derive(Default)]
pub struct MemoryPersistence {
    stored: Mutex<SubscriberMap>,
    saved: Mutex<Vec<SubscriberMap>>,
    fail_loads: bool,
    fail_saves: bool,
}

impl MemoryPersistence {
    pub fn with_map(map: SubscriberMap) -> Self {
        Self {
            stored: Mutex::new(map),
            ..Self::default()
        }
    }

    pub fn failing_loads() -> Self {
        Self {
            fail_loads: true,
            ..Self::default()
        }
    }

    pub fn failing_saves() -> Self {
        Self::default().with_failing_saves()
    }

    pub fn with_failing_saves(self) -> Self {
        Self {
            fail_saves: true,
            ..self
        }
    }

    /// Every snapshot handed to `save`, successful or not.
    pub fn saved(&self) -> Vec<SubscriberMap> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl SubscriberPersistence for MemoryPersistence {
    async fn load(&self) -> Result<SubscriberMap, StoreError> {
        if self.fail_loads {
            return Err(StoreError::Backend("disk on fire".to_string()));
        }
        Ok(self.stored.lock().unwrap().clone())
    }

    async fn save(&self, subscribers: &SubscriberMap) -> Result<(), StoreError> {
        self.saved.lock().unwrap().push(subscribers.clone());
        if self.fail_saves {
            return Err(StoreError::Backend("read-only filesystem".to_string()));
        }
        *self.stored.lock().unwrap() = subscribers.clone();
        Ok(())
    }
}

/// Everything currently queued on the notification channel.
pub fn drain(rx: &mut NotificationReceiver) -> Vec<Notification> {
    let mut notes = Vec::new();
    while let Ok(note) = rx.try_recv() {
        notes.push(note);
    }
    notes
}
