//! Console adapter for development/testing

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::application::errors::BotError;
use crate::domain::entities::{ChatLine, User};
use crate::domain::traits::ChatTransport;

/// Reads lines from a local reader as chat from one configured user and
/// prints replies to stdout.
pub struct ConsoleAdapter<R = BufReader<Stdin>> {
    lines: Lines<R>,
    user: User,
    channel: String,
}

impl ConsoleAdapter {
    pub fn new(user: User, channel: impl Into<String>) -> Self {
        Self::with_reader(BufReader::new(tokio::io::stdin()), user, channel)
    }
}

impl<R: AsyncBufRead + Unpin + Send> ConsoleAdapter<R> {
    pub fn with_reader(reader: R, user: User, channel: impl Into<String>) -> Self {
        Self {
            lines: reader.lines(),
            user,
            channel: channel.into(),
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> ChatTransport for ConsoleAdapter<R> {
    async fn send(&mut self, channel: &str, text: &str) -> Result<(), BotError> {
        println!("[BOT #{}] {}", channel, text);
        Ok(())
    }

    async fn receive(&mut self) -> Result<Option<ChatLine>, BotError> {
        loop {
            let line = self
                .lines
                .next_line()
                .await
                .map_err(|e| BotError::Transport(format!("Failed to read console input: {}", e)))?;

            match line {
                None => {
                    tracing::info!("Console input closed");
                    return Ok(None);
                }
                Some(text) if text.trim().is_empty() => continue,
                Some(text) => {
                    return Ok(Some(ChatLine::new(
                        self.channel.as_str(),
                        self.user.clone(),
                        text.trim_end(),
                    )))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_lines_as_configured_user() {
        let input: &[u8] = b"!quote 1\n\n  \n!quotes\n";
        let mut console =
            ConsoleAdapter::with_reader(input, User::new("tester").with_moderator(), "#Chan");

        let first = console.receive().await.unwrap().unwrap();
        assert_eq!(first.text, "!quote 1");
        assert_eq!(first.channel, "chan");
        assert!(first.sender.is_moderator);

        let second = console.receive().await.unwrap().unwrap();
        assert_eq!(second.text, "!quotes");
        assert!(console.receive().await.unwrap().is_none());
    }
}
