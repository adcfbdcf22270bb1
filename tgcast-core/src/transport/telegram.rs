//! [`Transport`] implementation over the Bot API client.

use super::{ApiFailure, Reply, Transport, TransportError};
use crate::events::Event;
use async_trait::async_trait;
use tgcast_sdk::client::BotClient;
use tgcast_sdk::objects::{ApiResponse, Update};

impl From<Update> for Event {
    fn from(update: Update) -> Self {
        let Some(message) = update.message else {
            // Non-message updates still have to be acknowledged through the
            // cursor; an empty command makes them a no-op for subscriptions.
            return Event::new(update.update_id, String::new(), 0);
        };

        let (first_name, last_name) = match message.from {
            Some(user) => (user.first_name, user.last_name.unwrap_or_default()),
            None => (
                message.chat.first_name.unwrap_or_default(),
                message.chat.last_name.unwrap_or_default(),
            ),
        };

        Event::new(
            update.update_id,
            message.text.unwrap_or_default(),
            message.chat.id,
        )
        .with_sender(first_name, last_name)
    }
}

fn into_reply<T, U>(response: ApiResponse<T>, convert: impl FnOnce(Option<T>) -> U) -> Reply<U> {
    if response.ok {
        Reply::Success(convert(response.result))
    } else {
        Reply::Rejected(ApiFailure {
            error_code: response.error_code,
            description: response.description.unwrap_or_default(),
        })
    }
}

#[async_trait]
impl Transport for BotClient {
    async fn fetch_updates(&self, offset: i64) -> Result<Reply<Vec<Event>>, TransportError> {
        let response = self.get_updates(offset).await?;
        Ok(into_reply(response, |updates| {
            updates
                .unwrap_or_default()
                .into_iter()
                .map(Event::from)
                .collect()
        }))
    }

    async fn send_message(&self, recipient_id: i64, text: &str) -> Result<Reply<()>, TransportError> {
        let response = BotClient::send_message(self, recipient_id, text).await?;
        Ok(into_reply(response, |_| ()))
    }
}
