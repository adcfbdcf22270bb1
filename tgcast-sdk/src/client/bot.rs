//! Bot API client (worker → `api.telegram.org`).
//!
//! Every method is a `POST` with a JSON body to
//! `{base}/bot{token}/{method}`; every answer is an [`ApiResponse`]
//! envelope.

use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::ClientError;
use crate::objects::{ApiResponse, GetUpdatesRequest, Message, SendMessageRequest, Update};

/// Public Bot API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Typed HTTP client for the Bot API methods used by the worker.
#[derive(Clone)]
pub struct BotClient {
    http: Client,
    base_url: Url,
    token: String,
}

impl std::fmt::Debug for BotClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The token grants full control over the bot; keep it out of logs.
        f.debug_struct("BotClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"<redacted>")
            .finish()
    }
}

impl BotClient {
    /// Create a new `BotClient`.
    ///
    /// * `base_url` – root URL of the Bot API (usually [`DEFAULT_API_BASE`]).
    /// * `token` – the bot token issued by BotFather.
    pub fn new(base_url: Url, token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url,
            token: token.into(),
        }
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts or a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `POST /bot{token}/getUpdates` – fetch updates starting at `offset`.
    pub async fn get_updates(&self, offset: i64) -> Result<ApiResponse<Vec<Update>>, ClientError> {
        self.call("getUpdates", &GetUpdatesRequest { offset }).await
    }

    /// `POST /bot{token}/sendMessage` – send `text` to `chat_id`.
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: impl Into<String>,
    ) -> Result<ApiResponse<Message>, ClientError> {
        let body = SendMessageRequest {
            chat_id,
            text: text.into(),
        };
        self.call("sendMessage", &body).await
    }

    fn method_url(&self, method: &str) -> Result<Url, ClientError> {
        // Built as a string rather than via `Url::join`: the token contains a
        // colon, so `bot123:abc/...` would parse as a URL with scheme `bot123`.
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/bot{}/{method}", self.token))?)
    }

    async fn call<B: Serialize, T: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<ApiResponse<T>, ClientError> {
        let url = self.method_url(method)?;

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await?;

        parse_response(resp).await
    }
}

/// Decode the envelope regardless of the HTTP status: the Bot API reports
/// failures such as 401 or 409 as `{"ok": false, ...}` bodies.
async fn parse_response<T: DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<ApiResponse<T>, ClientError> {
    let status = resp.status();
    let bytes = resp.bytes().await?;
    decode_envelope(status, &bytes)
}

fn decode_envelope<T: DeserializeOwned>(
    status: StatusCode,
    bytes: &[u8],
) -> Result<ApiResponse<T>, ClientError> {
    match serde_json::from_slice::<ApiResponse<T>>(bytes) {
        Ok(envelope) => Ok(envelope),
        Err(_) if !status.is_success() => Err(ClientError::Api {
            status,
            body: String::from_utf8_lossy(bytes).into_owned(),
        }),
        Err(e) => Err(ClientError::Json(e)),
    }
}
