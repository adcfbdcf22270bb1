//! The embedder-facing worker handle.
//!
//! A [`Worker`] owns one subscriber table, one cursor and at most one
//! running [`PollLoop`]. It is a plain value: create as many as needed, clone
//! the handle to share it.
//!
//! ```text
//! Stopped --start()--> Running --stop()--> Stopped
//! ```
//!
//! Every run gets its own stop signal, so a loop that is still finishing its
//! last sleep after `stop()` cannot be revived by an immediate `start()`.
//! All runs share one poll gate: a stopped run still inside a fetch finishes
//! that tick before a newer run may fetch.

use crate::config::WorkerConfig;
use crate::events::{NotificationReceiver, Notifier, notification_channel};
use crate::processors::{BroadcastError, BroadcastReport, Broadcaster, PollLoop};
use crate::subscribers::{SharedSubscribers, SubscriberPersistence, SubscriberSummary};
use crate::transport::Transport;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use thiserror::Error;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::info;

/// Errors returned synchronously by [`Worker`] operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkerError {
    #[error("bot is already started")]
    AlreadyStarted,

    #[error("bot is already stopped")]
    AlreadyStopped,

    #[error("bot is not started")]
    NotStarted,

    #[error(transparent)]
    Broadcast(#[from] BroadcastError),
}

struct RunHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

struct WorkerInner {
    transport: Arc<dyn Transport>,
    persistence: Arc<dyn SubscriberPersistence>,
    subscribers: SharedSubscribers,
    notifier: Notifier,
    cursor: Arc<AtomicI64>,
    poll_gate: Arc<Mutex<()>>,
    config: WorkerConfig,
    broadcaster: Broadcaster,
    run: Mutex<Option<RunHandle>>,
}

/// Long-polling subscription worker with a broadcast primitive.
#[derive(Clone)]
pub struct Worker {
    inner: Arc<WorkerInner>,
}

impl Worker {
    /// Create a stopped worker.
    ///
    /// Returns the worker and the receiving end of its notification stream.
    /// The embedder should keep draining the receiver; notifications that do
    /// not fit in `config.notification_buffer` are dropped.
    pub fn new(
        transport: Arc<dyn Transport>,
        persistence: Arc<dyn SubscriberPersistence>,
        config: WorkerConfig,
    ) -> (Self, NotificationReceiver) {
        let (notifier, notification_rx) = notification_channel(config.notification_buffer);
        let subscribers = SharedSubscribers::new();
        let broadcaster = Broadcaster::new(
            transport.clone(),
            subscribers.clone(),
            notifier.clone(),
            config.broadcast_guard,
        );

        let worker = Self {
            inner: Arc::new(WorkerInner {
                transport,
                persistence,
                subscribers,
                notifier,
                cursor: Arc::new(AtomicI64::new(0)),
                poll_gate: Arc::default(),
                config,
                broadcaster,
                run: Mutex::new(None),
            }),
        };
        (worker, notification_rx)
    }

    /// Launch the poll loop in a background task and return immediately.
    pub async fn start(&self) -> Result<(), WorkerError> {
        let mut run = self.inner.run.lock().await;
        if run.is_some() {
            return Err(WorkerError::AlreadyStarted);
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        let poll_loop = PollLoop::new(
            self.inner.transport.clone(),
            self.inner.persistence.clone(),
            self.inner.subscribers.clone(),
            self.inner.notifier.clone(),
            self.inner.cursor.clone(),
            self.inner.poll_gate.clone(),
            self.inner.config.poll_interval,
        );
        let task = tokio::spawn(poll_loop.run(stop_rx));
        *run = Some(RunHandle { stop_tx, task });

        info!(cursor = self.cursor(), "Worker started");
        Ok(())
    }

    /// Ask the poll loop to exit after its current sleep or fetch.
    ///
    /// Returns the loop's task handle; awaiting it waits for the final
    /// "stopped" notification. Dropping it leaves the loop to finish alone.
    pub async fn stop(&self) -> Result<JoinHandle<()>, WorkerError> {
        let Some(RunHandle { stop_tx, task }) = self.inner.run.lock().await.take() else {
            return Err(WorkerError::AlreadyStopped);
        };

        // The receiver only disappears if the loop task is already gone.
        let _ = stop_tx.send(true);
        info!("Worker stop requested");
        Ok(task)
    }

    /// Send `text` to every active subscriber.
    ///
    /// Individual delivery failures are reported on the notification stream
    /// and counted in the report; they do not make the call fail.
    pub async fn send(&self, text: &str) -> Result<BroadcastReport, WorkerError> {
        if !self.is_running().await {
            return Err(WorkerError::NotStarted);
        }
        Ok(self.inner.broadcaster.broadcast(text).await?)
    }

    pub async fn is_running(&self) -> bool {
        self.inner.run.lock().await.is_some()
    }

    /// Smallest event id the next fetch will ask for.
    pub fn cursor(&self) -> i64 {
        self.inner.cursor.load(Ordering::Acquire)
    }

    pub async fn subscriber_summary(&self) -> SubscriberSummary {
        self.inner.subscribers.summary().await
    }
}
