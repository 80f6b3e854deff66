use async_trait::async_trait;
use crate::domain::entities::ChatLine;
use crate::application::errors::BotError;

/// Chat transport - abstraction for the connection to the chat service
#[async_trait]
pub trait ChatTransport: Send {
    /// Send a message to a channel. Delivery is best-effort.
    async fn send(&mut self, channel: &str, text: &str) -> Result<(), BotError>;

    /// Wait for the next chat line. `None` once the transport has closed.
    async fn receive(&mut self) -> Result<Option<ChatLine>, BotError>;
}
