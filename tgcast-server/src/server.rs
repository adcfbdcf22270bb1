//! HTTP surface of tgcast: a liveness probe plus the worker control API.
//!
//! ```text
//! GET  /health                 liveness and build version
//! GET  /api/v1/worker          lifecycle state, cursor, subscriber counts
//! POST /api/v1/worker/start    start the poll loop
//! POST /api/v1/worker/stop     stop the poll loop
//! POST /api/v1/broadcast       send a text to every active subscriber
//! ```

use crate::api;
use crate::shutdown::shutdown_signal;
use crate::state::AppState;
use axum::{Json, Router, routing::get};
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Router with every tgcast route bound to the shared worker handle.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api::router())
        .with_state(state)
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
}

/// Answers as long as the HTTP server is up, whether or not the bot is
/// polling. Use `GET /api/v1/worker` for the worker state.
async fn health() -> Json<Health> {
    Json(Health {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Serve `router` on `addr` until SIGINT or SIGTERM.
///
/// Returns once in-flight requests have drained; stopping the worker is the
/// caller's job.
pub async fn run_server(router: Router, addr: SocketAddr) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Admin API listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}
