//! Event type definitions.
//!
//! [`Event`] flows inbound, from the transport into the poll loop.
//! [`Notification`] flows outbound, from the core to its embedder.

/// An inbound update as the core sees it.
///
/// Produced by the [`Transport`](crate::Transport) and consumed exactly once
/// by the poll loop; deduplication relies on cursor advancement only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Monotonic identifier assigned by the remote service.
    pub id: i64,
    /// Raw message text. Empty for updates that carry no text message.
    pub command: String,
    /// Chat the message came from; broadcasts are addressed to it.
    pub recipient_id: i64,
    pub sender_first_name: String,
    pub sender_last_name: String,
}

impl Event {
    /// Build an event without sender details.
    pub fn new(id: i64, command: impl Into<String>, recipient_id: i64) -> Self {
        Self {
            id,
            command: command.into(),
            recipient_id,
            sender_first_name: String::new(),
            sender_last_name: String::new(),
        }
    }

    /// Attach the sender's name.
    pub fn with_sender(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.sender_first_name = first_name.into();
        self.sender_last_name = last_name.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Info,
    Error,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationKind::Info => write!(f, "info"),
            NotificationKind::Error => write!(f, "error"),
        }
    }
}

/// One-way report from the core to the embedder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NotificationKind::Error
    }
}
