//! Configuration module for tgcast-server.
//!
//! Handles loading configuration from the TOML file and applying CLI and
//! environment overrides.

pub mod file;

use crate::config::file::FileConfig;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tgcast_core::WorkerConfig;
use thiserror::Error;
use url::Url;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("bot token not set (use [telegram].token, --token or TGCAST_BOT_TOKEN)")]
    MissingToken,
}

/// Bot API connection settings after overrides.
#[derive(Debug, Clone)]
pub struct TelegramSettings {
    pub token: String,
    pub api_base: Url,
    pub request_timeout: Duration,
}

/// Loaded configuration result containing all parts.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub listen: SocketAddr,
    pub telegram: TelegramSettings,
    pub worker: WorkerConfig,
    pub subscribers_path: PathBuf,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    listen_override: Option<SocketAddr>,
    token_override: Option<String>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(
        config_path: impl AsRef<Path>,
        listen_override: Option<SocketAddr>,
        token_override: Option<String>,
    ) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
            token_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file (a missing file means all defaults)
    /// 2. Apply CLI/environment overrides
    /// 3. Validate the configuration
    /// 4. Build the loaded configuration
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let mut file_config = match std::fs::read_to_string(&self.config_path) {
            Ok(content) => toml::from_str::<FileConfig>(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = ?self.config_path, "Config file not found, using defaults");
                FileConfig::default()
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }
        if let Some(token) = &self.token_override {
            file_config.telegram.token = Some(token.clone());
        }

        self.validate(&file_config)?;
        self.build_loaded_config(file_config)
    }

    fn validate(&self, config: &FileConfig) -> Result<(), ConfigError> {
        if config.worker.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "worker.poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if config.worker.notification_buffer == 0 {
            return Err(ConfigError::ValidationError(
                "worker.notification_buffer must be greater than zero".to_string(),
            ));
        }
        if config.telegram.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "telegram.request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    fn build_loaded_config(&self, file_config: FileConfig) -> Result<LoadedConfig, ConfigError> {
        let token = file_config
            .telegram
            .token
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let api_base = Url::parse(file_config.telegram.api_base.trim()).map_err(|e| {
            ConfigError::ValidationError(format!("telegram.api_base is not a valid URL: {e}"))
        })?;

        Ok(LoadedConfig {
            listen: file_config.server.listen,
            telegram: TelegramSettings {
                token,
                api_base,
                request_timeout: Duration::from_secs(file_config.telegram.request_timeout_secs),
            },
            worker: WorkerConfig {
                poll_interval: Duration::from_millis(file_config.worker.poll_interval_ms),
                notification_buffer: file_config.worker.notification_buffer,
                broadcast_guard: file_config.worker.broadcast_guard,
            },
            subscribers_path: file_config.storage.subscribers_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tgcast.toml");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_overrides_win_over_file() {
        let (_dir, path) = write_config(
            r#"
[server]
listen = "127.0.0.1:9000"

[telegram]
token = "from-file"
"#,
        );
        let listen: SocketAddr = "0.0.0.0:7000".parse().unwrap();
        let loaded = ConfigLoader::new(&path, Some(listen), Some("from-env".to_string()))
            .load()
            .unwrap();

        assert_eq!(loaded.listen, listen);
        assert_eq!(loaded.telegram.token, "from-env");
        assert_eq!(loaded.worker, WorkerConfig::default());
    }

    #[test]
    fn test_missing_file_with_token_override() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = ConfigLoader::new(dir.path().join("absent.toml"), None, Some("t".to_string()))
            .load()
            .unwrap();
        assert_eq!(loaded.telegram.token, "t");
        assert_eq!(loaded.subscribers_path, PathBuf::from("./chats.json"));
    }

    #[test]
    fn test_missing_token_is_rejected() {
        let (_dir, path) = write_config("[telegram]\ntoken = \"  \"\n");
        let err = ConfigLoader::new(&path, None, None).load().unwrap_err();
        assert!(matches!(err, ConfigError::MissingToken));
    }

    #[test]
    fn test_invalid_api_base_is_rejected() {
        let (_dir, path) = write_config("[telegram]\ntoken = \"t\"\napi_base = \"not a url\"\n");
        let err = ConfigLoader::new(&path, None, None).load().unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let (_dir, path) = write_config("[worker]\npoll_interval_ms = 0\n");
        let err = ConfigLoader::new(&path, None, Some("t".to_string()))
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }
}
