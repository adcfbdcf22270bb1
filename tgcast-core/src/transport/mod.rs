//! The seam between the core and the remote service.
//!
//! The core consumes a [`Transport`] as a black box: request in, either a
//! [`Reply`] (which may still be an application-level rejection) or a
//! [`TransportError`] out. [`telegram`] adapts the SDK's `BotClient`.

pub mod telegram;

use crate::events::Event;
use async_trait::async_trait;
use tgcast_sdk::client::ClientError;
use thiserror::Error;

/// Errors below the application level: the request never produced an
/// answer the core could interpret.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Failure reported by a non-HTTP transport.
    #[error("{0}")]
    Other(String),
}

/// Rejection reported inside an otherwise well-formed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    pub error_code: Option<i64>,
    pub description: String,
}

impl std::fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.error_code {
            Some(code) => write!(f, "error code: {code} description: {}", self.description),
            None => write!(f, "error code: unknown description: {}", self.description),
        }
    }
}

/// Outcome of a request that reached the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply<T> {
    Success(T),
    Rejected(ApiFailure),
}

impl<T> Reply<T> {
    pub fn rejected(error_code: i64, description: impl Into<String>) -> Self {
        Reply::Rejected(ApiFailure {
            error_code: Some(error_code),
            description: description.into(),
        })
    }
}

/// Event retrieval and message delivery.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch events whose id is at least `offset`, ordered by id.
    async fn fetch_updates(&self, offset: i64) -> Result<Reply<Vec<Event>>, TransportError>;

    /// Deliver `text` to `recipient_id`.
    async fn send_message(&self, recipient_id: i64, text: &str) -> Result<Reply<()>, TransportError>;
}
