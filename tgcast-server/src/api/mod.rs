//! Control API handlers.
//!
//! These endpoints let the embedding application drive the worker.
//!
//! # Endpoints
//!
//! - `GET  /worker`       – lifecycle state, cursor and subscriber counts
//! - `POST /worker/start` – start the poll loop
//! - `POST /worker/stop`  – stop the poll loop
//! - `POST /broadcast`    – send a text to every active subscriber

use axum::{
    Json, Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Serialize;
use tgcast_core::WorkerError;
use tgcast_core::processors::BroadcastError;

use crate::state::AppState;

mod broadcast;
mod worker;

/// Build the control API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/worker", get(worker::worker_status))
        .route("/worker/start", post(worker::start_worker))
        .route("/worker/stop", post(worker::stop_worker))
        .route("/broadcast", post(broadcast::broadcast))
}

// ---------------------------------------------------------------------------
// Shared error type
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Errors that can occur in control API handlers.
#[derive(Debug)]
pub(crate) enum ApiError {
    Worker(WorkerError),
    EmptyText,
}

impl From<WorkerError> for ApiError {
    fn from(e: WorkerError) -> Self {
        ApiError::Worker(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Worker(e @ WorkerError::Broadcast(BroadcastError::NoSubscribers)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
            ApiError::Worker(e) => (StatusCode::CONFLICT, e.to_string()),
            ApiError::EmptyText => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "text must not be empty".to_string(),
            ),
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
