//! tgcast server
//!
//! Runs the long-polling subscription worker and exposes a small HTTP API
//! to start/stop it and to broadcast messages to its subscribers.

mod api;
mod config;
mod notifications;
mod server;
mod shutdown;
mod state;

use clap::Parser;
use config::ConfigLoader;
use notifications::spawn_notification_logger;
use server::{build_router, run_server};
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tgcast_core::{JsonFileStore, Worker};
use tgcast_sdk::client::BotClient;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// tgcast - broadcast messages to everyone who sent /start to your bot
#[derive(Parser, Debug)]
#[command(name = "tgcast-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./tgcast.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Bot token (overrides the config file)
    #[arg(long, env = "TGCAST_BOT_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Do not start polling on startup; wait for POST /api/v1/worker/start
    #[arg(long, default_value = "false")]
    no_autostart: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting tgcast-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = ConfigLoader::new(&args.config, args.listen, args.token);
    let config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!("Configuration loaded from {:?}", args.config);

    // Build the Bot API client
    let http_client = reqwest::Client::builder()
        .timeout(config.telegram.request_timeout)
        .build()?;
    let bot_client = BotClient::new(config.telegram.api_base.clone(), config.telegram.token.clone())
        .with_http_client(http_client);

    // Create the worker and drain its notifications into the log
    let store = JsonFileStore::new(&config.subscribers_path);
    let (worker, notification_rx) = Worker::new(Arc::new(bot_client), Arc::new(store), config.worker);
    let logger = spawn_notification_logger(notification_rx);

    if !args.no_autostart {
        worker.start().await?;
    }

    // Build the router and run the server
    let router = build_router(AppState::new(worker.clone()));
    tracing::info!("Starting HTTP server on {}", config.listen);
    let result = run_server(router, config.listen).await;

    // Stop polling and wait for the loop to finish its last iteration
    if let Ok(handle) = worker.stop().await {
        tracing::info!("Waiting for the poll loop to finish...");
        if let Err(e) = handle.await {
            tracing::error!("Poll loop task failed: {}", e);
        }
    }
    drop(worker);
    if tokio::time::timeout(Duration::from_secs(5), logger).await.is_err() {
        tracing::warn!("Timed out flushing worker notifications");
    }
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
