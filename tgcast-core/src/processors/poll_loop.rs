//! PollLoop processor.
//!
//! The PollLoop is responsible for:
//! - Loading the persisted subscriber map when a run begins
//! - Calling `getUpdates` once per polling interval with the current cursor
//! - Feeding every returned event to the `CommandInterpreter`
//! - Advancing the cursor to one past the highest event id seen
//! - Persisting a snapshot of the subscriber table after each batch
//!
//! Transport and persistence failures are reported as error notifications
//! and never end the loop; only the run's stop signal does. The stop signal
//! is observed after each sleep, never during one.
//!
//! Loads and ticks run under a gate shared by every run of the same worker.
//! A run that was stopped mid-fetch finishes its tick before the next run
//! reads the cursor, so no batch is fetched or applied twice.

use super::command_interpreter::CommandInterpreter;
use crate::events::Notifier;
use crate::subscribers::{SharedSubscribers, SubscriberPersistence};
use crate::transport::{Reply, Transport};
use kanau::processor::Processor;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

/// What a single poll iteration did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The transport failed; the cursor did not move.
    FetchFailed,
    /// The remote service rejected the request; the cursor did not move.
    Rejected,
    /// No new events.
    Idle,
    /// `events` events were applied and the snapshot was handed to
    /// persistence (`persisted` tells whether that succeeded).
    Applied { events: usize, persisted: bool },
}

/// The long-polling loop of one worker run.
///
/// The cursor lives in a shared atomic so that a later run of the same
/// worker resumes where this one stopped, and so that it can be observed.
/// Only poll loops write it, and only through `fetch_max`.
pub struct PollLoop {
    transport: Arc<dyn Transport>,
    persistence: Arc<dyn SubscriberPersistence>,
    subscribers: SharedSubscribers,
    notifier: Notifier,
    cursor: Arc<AtomicI64>,
    gate: Arc<Mutex<()>>,
    interval: Duration,
    interpreter: CommandInterpreter,
}

impl PollLoop {
    pub fn new(
        transport: Arc<dyn Transport>,
        persistence: Arc<dyn SubscriberPersistence>,
        subscribers: SharedSubscribers,
        notifier: Notifier,
        cursor: Arc<AtomicI64>,
        gate: Arc<Mutex<()>>,
        interval: Duration,
    ) -> Self {
        Self {
            transport,
            persistence,
            subscribers,
            notifier,
            cursor,
            gate,
            interval,
            interpreter: CommandInterpreter,
        }
    }

    /// Run until `stop_rx` reads `true` after a sleep.
    pub async fn run(self, stop_rx: watch::Receiver<bool>) {
        info!(interval_ms = self.interval.as_millis() as u64, "PollLoop started");
        self.notifier.info("bot is started");
        self.load_subscribers().await;

        loop {
            tokio::time::sleep(self.interval).await;

            if *stop_rx.borrow() {
                break;
            }

            let outcome = self.tick().await;
            debug!(?outcome, cursor = self.cursor(), "Poll iteration finished");
        }

        self.notifier.info("bot is stopped");
        info!("PollLoop shutdown complete");
    }

    pub fn cursor(&self) -> i64 {
        self.cursor.load(Ordering::Acquire)
    }

    /// Merge the persisted map into the table; entries already in memory
    /// are kept. On failure the table keeps whatever it holds (empty on a
    /// fresh worker).
    pub async fn load_subscribers(&self) {
        let _turn = self.gate.lock().await;
        match self.persistence.load().await {
            Ok(loaded) => {
                let count = loaded.len();
                self.subscribers.lock().await.merge(loaded);
                debug!(count, "Loaded subscribers");
            }
            Err(e) => {
                warn!(error = %e, "Failed to load subscribers");
                self.notifier.error(format!("loading subscribers failed: {e}"));
            }
        }
    }

    /// One fetch/apply/persist round.
    pub async fn tick(&self) -> TickOutcome {
        let _turn = self.gate.lock().await;
        let offset = self.cursor();

        let events = match self.transport.fetch_updates(offset).await {
            Ok(Reply::Success(events)) => events,
            Ok(Reply::Rejected(failure)) => {
                warn!(offset, %failure, "getUpdates rejected");
                self.notifier
                    .error(format!("getting updates failed {failure}"));
                return TickOutcome::Rejected;
            }
            Err(e) => {
                warn!(offset, error = %e, "getUpdates failed");
                self.notifier.error(format!("getting updates failed: {e}"));
                return TickOutcome::FetchFailed;
            }
        };

        if events.is_empty() {
            return TickOutcome::Idle;
        }

        let count = events.len();
        let snapshot = {
            let mut table = self.subscribers.lock().await;
            for event in &events {
                let Ok(change) = self.interpreter.process(event).await;
                if let Some(change) = change {
                    table.set(change.recipient_id, change.active);
                }
                self.notifier.info(format!(
                    "{} command received from chat id: {} first name: {} last name: {}",
                    event.command,
                    event.recipient_id,
                    event.sender_first_name,
                    event.sender_last_name
                ));
                self.cursor
                    .fetch_max(event.id.saturating_add(1), Ordering::AcqRel);
            }
            table.snapshot()
        };
        debug!(count, cursor = self.cursor(), "Applied events");

        let persisted = match self.persistence.save(&snapshot).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Failed to save subscribers");
                self.notifier.error(format!("saving subscribers failed: {e}"));
                false
            }
        };

        TickOutcome::Applied {
            events: count,
            persisted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{NotificationKind, NotificationReceiver, notification_channel};
    use crate::events::Event;
    use crate::subscribers::SubscriberMap;
    use crate::testing::{MemoryPersistence, ScriptedTransport, drain};
    use crate::transport::TransportError;

    struct Harness {
        poll: PollLoop,
        transport: Arc<ScriptedTransport>,
        persistence: Arc<MemoryPersistence>,
        subscribers: SharedSubscribers,
        rx: NotificationReceiver,
    }

    fn harness(persistence: MemoryPersistence) -> Harness {
        let transport = Arc::new(ScriptedTransport::default());
        let persistence = Arc::new(persistence);
        let subscribers = SharedSubscribers::new();
        let (notifier, rx) = notification_channel(64);
        let poll = PollLoop::new(
            transport.clone(),
            persistence.clone(),
            subscribers.clone(),
            notifier,
            Arc::new(AtomicI64::new(0)),
            Arc::default(),
            Duration::from_millis(10),
        );
        Harness {
            poll,
            transport,
            persistence,
            subscribers,
            rx,
        }
    }

    #[tokio::test]
    async fn test_single_start_event() {
        let mut h = harness(MemoryPersistence::default());
        h.transport
            .push_batch(vec![Event::new(5, "/start", 42).with_sender("Ada", "Lovelace")]);

        let outcome = h.poll.tick().await;

        assert_eq!(outcome, TickOutcome::Applied { events: 1, persisted: true });
        assert_eq!(h.poll.cursor(), 6);
        assert_eq!(h.transport.fetch_offsets(), vec![0]);
        assert_eq!(h.subscribers.snapshot().await, SubscriberMap::from([(42, true)]));
        assert_eq!(h.persistence.saved(), vec![SubscriberMap::from([(42, true)])]);

        let notes = drain(&mut h.rx);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NotificationKind::Info);
        assert_eq!(
            notes[0].message,
            "/start command received from chat id: 42 first name: Ada last name: Lovelace"
        );
    }

    #[tokio::test]
    async fn test_cursor_is_one_past_highest_id_in_unordered_batch() {
        let h = harness(MemoryPersistence::default());
        h.transport.push_batch(vec![
            Event::new(12, "hello", 1),
            Event::new(10, "/start", 1),
            Event::new(11, "/stop", 2),
        ]);
        h.transport.push_batch(vec![Event::new(13, "/start", 3)]);

        h.poll.tick().await;
        assert_eq!(h.poll.cursor(), 13);
        h.poll.tick().await;
        assert_eq!(h.poll.cursor(), 14);

        assert_eq!(h.transport.fetch_offsets(), vec![0, 13]);
        assert_eq!(
            h.subscribers.snapshot().await,
            SubscriberMap::from([(1, true), (2, false), (3, true)])
        );
    }

    #[tokio::test]
    async fn test_cursor_never_moves_backwards() {
        let h = harness(MemoryPersistence::default());
        h.transport.push_batch(vec![Event::new(20, "x", 1)]);
        h.transport.push_batch(vec![Event::new(3, "y", 1)]);

        h.poll.tick().await;
        h.poll.tick().await;
        assert_eq!(h.poll.cursor(), 21);
    }

    #[tokio::test]
    async fn test_start_then_stop_keeps_recipient() {
        let h = harness(MemoryPersistence::default());
        h.transport.push_batch(vec![Event::new(1, "/start", 42)]);
        h.transport.push_batch(vec![Event::new(2, "/stop", 42)]);

        h.poll.tick().await;
        h.poll.tick().await;

        assert_eq!(h.subscribers.snapshot().await, SubscriberMap::from([(42, false)]));
        assert_eq!(h.persistence.saved().last(), Some(&SubscriberMap::from([(42, false)])));
    }

    #[tokio::test]
    async fn test_unknown_command_is_reported_and_consumed() {
        let mut h = harness(MemoryPersistence::default());
        h.transport.push_batch(vec![Event::new(7, "what?", 9)]);

        let outcome = h.poll.tick().await;

        assert_eq!(outcome, TickOutcome::Applied { events: 1, persisted: true });
        assert_eq!(h.poll.cursor(), 8);
        assert!(h.subscribers.snapshot().await.is_empty());
        let notes = drain(&mut h.rx);
        assert_eq!(notes.len(), 1);
        assert!(notes[0].message.starts_with("what? command received from chat id: 9"));
    }

    #[tokio::test]
    async fn test_transport_failure_keeps_cursor() {
        let mut h = harness(MemoryPersistence::default());
        h.transport
            .push_fetch(Err(TransportError::Other("connection reset".to_string())));

        assert_eq!(h.poll.tick().await, TickOutcome::FetchFailed);
        assert_eq!(h.poll.cursor(), 0);
        assert!(h.persistence.saved().is_empty());

        let notes = drain(&mut h.rx);
        assert_eq!(notes.len(), 1);
        assert!(notes[0].is_error());
        assert_eq!(notes[0].message, "getting updates failed: connection reset");
    }

    #[tokio::test]
    async fn test_rejection_keeps_cursor() {
        let mut h = harness(MemoryPersistence::default());
        h.transport.push_fetch(Ok(Reply::rejected(401, "Unauthorized")));

        assert_eq!(h.poll.tick().await, TickOutcome::Rejected);
        assert_eq!(h.poll.cursor(), 0);

        let notes = drain(&mut h.rx);
        assert_eq!(
            notes[0].message,
            "getting updates failed error code: 401 description: Unauthorized"
        );
        assert!(notes[0].is_error());
    }

    #[tokio::test]
    async fn test_empty_batch_has_no_side_effects() {
        let mut h = harness(MemoryPersistence::default());

        assert_eq!(h.poll.tick().await, TickOutcome::Idle);
        assert!(h.persistence.saved().is_empty());
        assert!(drain(&mut h.rx).is_empty());
    }

    #[tokio::test]
    async fn test_save_failure_is_not_fatal() {
        let mut h = harness(MemoryPersistence::failing_saves());
        h.transport.push_batch(vec![Event::new(1, "/start", 42)]);
        h.transport.push_batch(vec![Event::new(2, "/start", 43)]);

        let first = h.poll.tick().await;
        let second = h.poll.tick().await;

        assert_eq!(first, TickOutcome::Applied { events: 1, persisted: false });
        assert_eq!(second, TickOutcome::Applied { events: 1, persisted: false });
        assert_eq!(h.poll.cursor(), 3);
        assert_eq!(
            h.subscribers.snapshot().await,
            SubscriberMap::from([(42, true), (43, true)])
        );

        let errors: Vec<_> = drain(&mut h.rx).into_iter().filter(|n| n.is_error()).collect();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].message.starts_with("saving subscribers failed"));
    }

    #[tokio::test]
    async fn test_load_merges_persisted_map() {
        let h = harness(MemoryPersistence::with_map(SubscriberMap::from([(1, true), (2, false)])));
        h.poll.load_subscribers().await;
        assert_eq!(
            h.subscribers.snapshot().await,
            SubscriberMap::from([(1, true), (2, false)])
        );
    }

    #[tokio::test]
    async fn test_cursor_saturates_at_max_id() {
        let h = harness(MemoryPersistence::default());
        h.transport.push_batch(vec![Event::new(i64::MAX, "/start", 1)]);

        assert_eq!(h.poll.tick().await, TickOutcome::Applied { events: 1, persisted: true });
        assert_eq!(h.poll.cursor(), i64::MAX);
        assert_eq!(h.subscribers.snapshot().await, SubscriberMap::from([(1, true)]));
    }

    #[tokio::test]
    async fn test_load_does_not_override_in_memory_consent() {
        let h = harness(MemoryPersistence::with_map(SubscriberMap::from([(42, true), (7, true)])));
        h.subscribers.lock().await.set(42, false);

        h.poll.load_subscribers().await;

        assert_eq!(
            h.subscribers.snapshot().await,
            SubscriberMap::from([(7, true), (42, false)])
        );
    }

    #[tokio::test]
    async fn test_load_failure_leaves_table_empty() {
        let mut h = harness(MemoryPersistence::failing_loads());
        h.poll.load_subscribers().await;

        assert!(h.subscribers.snapshot().await.is_empty());
        let notes = drain(&mut h.rx);
        assert_eq!(notes.len(), 1);
        assert!(notes[0].is_error());
        assert!(notes[0].message.starts_with("loading subscribers failed"));
    }
}
