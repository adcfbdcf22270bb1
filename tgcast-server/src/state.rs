//! Application state shared across all request handlers.

use tgcast_core::Worker;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (the worker is behind an Arc).
#[derive(Clone)]
pub struct AppState {
    /// The long-polling worker controlled by the API.
    pub worker: Worker,
}

impl AppState {
    /// Create a new AppState around the given worker.
    pub fn new(worker: Worker) -> Self {
        Self { worker }
    }
}
