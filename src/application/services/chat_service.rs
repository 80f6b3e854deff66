//! Chat service - the receive, dispatch, reply loop

use std::future::Future;

use crate::application::errors::BotError;
use crate::application::messaging::Router;
use crate::domain::entities::{normalize_channel, ChatLine};
use crate::domain::traits::ChatTransport;

const SHUTDOWN_COMMAND: &str = "shutdown";

/// Who may stop the bot, where it sits and what it says on the way in and out.
#[derive(Debug, Clone, Default)]
pub struct ServiceSettings {
    pub admin: String,
    pub channels: Vec<String>,
    pub entrance_message: Option<String>,
    pub shutdown_message: Option<String>,
}

impl ServiceSettings {
    pub fn new(admin: impl Into<String>) -> Self {
        Self {
            admin: admin.into(),
            ..Self::default()
        }
    }

    pub fn with_channels<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.channels = channels
            .into_iter()
            .map(|c| normalize_channel(c.as_ref()))
            .filter(|c| !c.is_empty())
            .collect();
        self
    }

    pub fn with_entrance_message(mut self, message: Option<String>) -> Self {
        self.entrance_message = message;
        self
    }

    pub fn with_shutdown_message(mut self, message: Option<String>) -> Self {
        self.shutdown_message = message;
        self
    }
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    AdminShutdown,
    Interrupted,
    TransportClosed,
}

/// Single consumer of a transport: every line is fully handled before the
/// next one is read.
pub struct ChatService<T: ChatTransport> {
    transport: T,
    router: Router,
    settings: ServiceSettings,
}

impl<T: ChatTransport> ChatService<T> {
    pub fn new(transport: T, router: Router, settings: ServiceSettings) -> Self {
        Self {
            transport,
            router,
            settings,
        }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Runs until the admin shuts the bot down, Ctrl-C, or the transport closes.
    pub async fn run(&mut self) -> Result<StopReason, BotError> {
        self.run_until(tokio::signal::ctrl_c()).await
    }

    /// [`ChatService::run`] with a custom interrupt in place of Ctrl-C.
    pub async fn run_until<F: Future>(&mut self, interrupt: F) -> Result<StopReason, BotError> {
        if let Err(e) = self.start().await {
            self.router.shutdown();
            return Err(e);
        }

        let outcome = self.serve(interrupt).await;
        match &outcome {
            Ok(reason) => tracing::info!("Stopping: {:?}", reason),
            Err(e) => tracing::error!("Stopping after transport failure: {}", e),
        }
        self.stop().await;
        outcome
    }

    async fn start(&mut self) -> Result<(), BotError> {
        for channel in &self.settings.channels {
            self.router.storage_mut().quotes.open_channel(channel)?;
            tracing::info!("Joined channel: {}", channel);
        }
        if let Some(message) = &self.settings.entrance_message {
            for channel in &self.settings.channels {
                say(&mut self.transport, channel, message).await;
            }
        }
        Ok(())
    }

    async fn serve<F: Future>(&mut self, interrupt: F) -> Result<StopReason, BotError> {
        tokio::pin!(interrupt);
        loop {
            let next = tokio::select! {
                biased;
                _ = &mut interrupt => return Ok(StopReason::Interrupted),
                next = self.transport.receive() => next?,
            };

            let Some(line) = next else {
                return Ok(StopReason::TransportClosed);
            };

            if self.is_admin_shutdown(&line) {
                tracing::info!("[{}] Shutdown requested by {}", line.channel, line.sender);
                return Ok(StopReason::AdminShutdown);
            }

            if let Some(reply) = self.router.dispatch(&line) {
                say(&mut self.transport, &line.channel, &reply).await;
            }
        }
    }

    fn is_admin_shutdown(&self, line: &ChatLine) -> bool {
        line.sender.name.eq_ignore_ascii_case(&self.settings.admin)
            && self
                .router
                .parser()
                .command_text(&line.text)
                .map(str::trim)
                .is_some_and(|command| command.eq_ignore_ascii_case(SHUTDOWN_COMMAND))
    }

    async fn stop(&mut self) {
        if let Some(message) = &self.settings.shutdown_message {
            for channel in &self.settings.channels {
                say(&mut self.transport, channel, message).await;
            }
        }
        self.router.shutdown();
    }
}

/// Best-effort send; a failure is logged and otherwise ignored.
async fn say<T: ChatTransport>(transport: &mut T, channel: &str, text: &str) {
    if let Err(e) = transport.send(channel, text).await {
        tracing::warn!("[{}] Failed to send reply: {}", channel, e);
    }
}
