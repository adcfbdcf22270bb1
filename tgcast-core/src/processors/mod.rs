//! Processors that make up a worker.
//!
//! - `CommandInterpreter`: turns an inbound `Event` into a subscription change
//! - `PollLoop`: fetches events, applies them, advances the cursor, persists
//! - `Broadcaster`: sends a text to every active subscriber

pub mod broadcaster;
pub mod command_interpreter;
pub mod poll_loop;

pub use broadcaster::{BroadcastError, BroadcastReport, Broadcaster};
pub use command_interpreter::{Command, CommandInterpreter, SubscriptionChange};
pub use poll_loop::{PollLoop, TickOutcome};
