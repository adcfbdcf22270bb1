use axum::{Json, extract::State};
use serde::Deserialize;
use tgcast_core::BroadcastReport;

use super::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub(super) struct BroadcastRequest {
    text: String,
}

/// `POST /broadcast`: send `text` to every active subscriber.
///
/// Partial delivery failures are not errors: they show up in the report and
/// in the worker's log.
pub(super) async fn broadcast(
    state: State<AppState>,
    Json(request): Json<BroadcastRequest>,
) -> Result<Json<BroadcastReport>, ApiError> {
    if request.text.is_empty() {
        return Err(ApiError::EmptyText);
    }
    let report = state.worker.send(&request.text).await?;
    Ok(Json(report))
}
