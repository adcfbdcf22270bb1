//! CommandInterpreter processor.
//!
//! Maps the text of an inbound [`Event`] to a change of the subscriber
//! table:
//! - `/start` opts the chat in
//! - `/stop` opts the chat out (the entry is kept)
//! - anything else changes nothing
//!
//! Unknown commands are not errors; the poll loop still reports them and
//! still advances the cursor past them.

use crate::events::Event;
use kanau::processor::Processor;
use std::convert::Infallible;

pub const START_COMMAND: &str = "/start";
pub const STOP_COMMAND: &str = "/stop";

/// Commands understood by the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Other,
}

impl Command {
    /// Exact match only; `/start foo` or `/start@bot` are `Other`.
    pub fn parse(text: &str) -> Self {
        match text {
            START_COMMAND => Command::Start,
            STOP_COMMAND => Command::Stop,
            _ => Command::Other,
        }
    }
}

/// A consent change to apply to the subscriber table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionChange {
    pub recipient_id: i64,
    pub active: bool,
}

/// Stateless interpreter for subscription commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandInterpreter;

impl<'a> Processor<&'a Event> for CommandInterpreter {
    type Output = Option<SubscriptionChange>;
    type Error = Infallible;

    async fn process(&self, event: &'a Event) -> Result<Option<SubscriptionChange>, Infallible> {
        let active = match Command::parse(&event.command) {
            Command::Start => true,
            Command::Stop => false,
            Command::Other => return Ok(None),
        };
        Ok(Some(SubscriptionChange {
            recipient_id: event.recipient_id,
            active,
        }))
    }
}
