use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use super::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub(super) struct WorkerStatus {
    running: bool,
    cursor: i64,
    known_subscribers: usize,
    active_subscribers: usize,
}

/// `GET /worker`: report lifecycle state, cursor and subscriber counts.
pub(super) async fn worker_status(state: State<AppState>) -> impl IntoResponse {
    let summary = state.worker.subscriber_summary().await;
    Json(WorkerStatus {
        running: state.worker.is_running().await,
        cursor: state.worker.cursor(),
        known_subscribers: summary.known,
        active_subscribers: summary.active,
    })
}

/// `POST /worker/start`: start the poll loop.
pub(super) async fn start_worker(state: State<AppState>) -> Result<StatusCode, ApiError> {
    state.worker.start().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /worker/stop`: ask the poll loop to stop.
///
/// Returns as soon as the stop is requested; the loop finishes its current
/// sleep on its own.
pub(super) async fn stop_worker(state: State<AppState>) -> Result<StatusCode, ApiError> {
    state.worker.stop().await?;
    Ok(StatusCode::NO_CONTENT)
}
