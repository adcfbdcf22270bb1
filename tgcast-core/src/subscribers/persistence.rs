//! Durable storage of the subscriber map.
//!
//! The core only needs "load" and "save"; [`JsonFileStore`] is the stock
//! implementation and keeps the map as a JSON object keyed by chat id.

use super::SubscriberMap;
use async_trait::async_trait;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Default location of the subscribers file.
pub const DEFAULT_SUBSCRIBERS_PATH: &str = "./chats.json";

/// Errors that can occur while loading or saving subscribers.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to encode subscribers: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    /// Failure reported by a non-file backend.
    #[error("{0}")]
    Backend(String),
}

/// Load/save contract for the subscriber map.
#[async_trait]
pub trait SubscriberPersistence: Send + Sync {
    /// Load the last saved map.
    async fn load(&self) -> Result<SubscriberMap, StoreError>;

    /// Replace the saved map with `subscribers`.
    async fn save(&self, subscribers: &SubscriberMap) -> Result<(), StoreError>;
}

/// Stores the subscriber map as `{"<chat id>": true|false, ...}`.
///
/// Saves go to a sibling `.tmp` file that is then renamed over the target,
/// so a crash mid-write leaves the previous file intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl Default for JsonFileStore {
    fn default() -> Self {
        Self::new(DEFAULT_SUBSCRIBERS_PATH)
    }
}

#[async_trait]
impl SubscriberPersistence for JsonFileStore {
    async fn load(&self) -> Result<SubscriberMap, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Subscribers file not found, starting empty");
                return Ok(SubscriberMap::new());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_slice(&bytes).map_err(|source| StoreError::Decode {
            path: self.path.clone(),
            source,
        })
    }

    async fn save(&self, subscribers: &SubscriberMap) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(subscribers)?;

        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, json)
            .await
            .map_err(|source| StoreError::Write {
                path: temp_path.clone(),
                source,
            })?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })?;

        debug!(path = %self.path.display(), count = subscribers.len(), "Saved subscribers");
        Ok(())
    }
}
