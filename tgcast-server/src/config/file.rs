//! TOML file configuration structures.
//!
//! These structs directly map to the `tgcast.toml` file format.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use tgcast_core::BroadcastGuard;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub worker: WorkerSection,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "127.0.0.1:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

/// Bot API connection section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token. The `TGCAST_BOT_TOKEN` environment variable takes
    /// precedence when set.
    #[serde(default)]
    pub token: Option<String>,
    /// Bot API root. Parsed and validated by the loader.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Timeout applied to every Bot API request.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_base: default_api_base(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_api_base() -> String {
    tgcast_sdk::client::DEFAULT_API_BASE.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Poll loop and broadcast section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerSection {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_notification_buffer")]
    pub notification_buffer: usize,
    #[serde(default)]
    pub broadcast_guard: BroadcastGuard,
}

impl Default for WorkerSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            notification_buffer: default_notification_buffer(),
            broadcast_guard: BroadcastGuard::default(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    tgcast_core::config::DEFAULT_POLL_INTERVAL.as_millis() as u64
}

fn default_notification_buffer() -> usize {
    tgcast_core::config::DEFAULT_NOTIFICATION_BUFFER
}

/// Subscriber persistence section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_subscribers_path")]
    pub subscribers_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            subscribers_path: default_subscribers_path(),
        }
    }
}

fn default_subscribers_path() -> PathBuf {
    PathBuf::from(tgcast_core::subscribers::DEFAULT_SUBSCRIBERS_PATH)
}
