//! Wire types and HTTP client for the subset of the Telegram Bot API that
//! tgcast needs: long-polling `getUpdates` and `sendMessage`.
//!
//! The HTTP client is gated behind the `client` feature so that crates which
//! only need the shared types do not pull in `reqwest`.

#[cfg(feature = "client")]
pub mod client;
pub mod objects;
