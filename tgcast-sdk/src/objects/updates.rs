//! `getUpdates` request and update payloads.

use serde::{Deserialize, Serialize};

use super::message::Message;

/// Body of a `getUpdates` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetUpdatesRequest {
    /// Identifier of the first update to return. Passing `n` confirms every
    /// update with an identifier below `n`.
    pub offset: i64,
}

/// One incoming update.
///
/// Only the `message` kind is modeled; any other kind (edited messages,
/// channel posts, callback queries, ...) arrives with `message` set to
/// `None` and is still acknowledged by advancing the offset past it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
}
