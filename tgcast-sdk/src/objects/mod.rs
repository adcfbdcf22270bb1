pub mod message;
pub mod updates;

pub use message::{Chat, Message, SendMessageRequest, User};
pub use updates::{GetUpdatesRequest, Update};

use serde::{Deserialize, Serialize};

/// The envelope every Bot API method answers with.
///
/// On success `ok` is `true` and `result` carries the payload. On failure
/// `ok` is `false` and `error_code`/`description` explain why. The envelope
/// is sent for non-2xx HTTP statuses as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    // No `default` here: it would require `T: Default` to deserialize.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Build a failed envelope.
    pub fn failure(error_code: i64, description: impl Into<String>) -> Self {
        Self {
            ok: false,
            result: None,
            error_code: Some(error_code),
            description: Some(description.into()),
        }
    }
}
