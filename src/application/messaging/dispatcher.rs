//! Message router - Routes chat lines to exactly one command handler

use std::time::Instant;

use crate::application::errors::CommandError;
use crate::domain::entities::{ChatLine, CommandRegistry, Context, ResponseCommand};
use crate::infrastructure::storage::Storage;
use crate::plugins::PluginManager;
use super::cooldown::CooldownTracker;
use super::parser::MessageParser;
use super::permission::authorize;

/// Owns the command table, cooldown state and storage, and runs one line at a
/// time through match, permission, cooldown and handler.
pub struct Router {
    parser: MessageParser,
    registry: CommandRegistry,
    cooldowns: CooldownTracker,
    storage: Storage,
    plugins: PluginManager,
    shut_down: bool,
}

impl Router {
    /// Registers every plugin's commands. A registration conflict aborts boot.
    pub fn boot(
        prefix: impl Into<String>,
        storage: Storage,
        plugins: PluginManager,
    ) -> Result<Self, CommandError> {
        let mut registry = CommandRegistry::new();
        plugins.install(&mut registry)?;
        tracing::info!(
            "Router ready: {} commands from {} plugins",
            registry.len(),
            plugins.len()
        );

        Ok(Self {
            parser: MessageParser::new(prefix),
            registry,
            cooldowns: CooldownTracker::new(),
            storage,
            plugins,
            shut_down: false,
        })
    }

    pub fn parser(&self) -> &MessageParser {
        &self.parser
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut Storage {
        &mut self.storage
    }

    /// Process one chat line, returning the reply to send, if any.
    pub fn dispatch(&mut self, line: &ChatLine) -> Option<String> {
        self.dispatch_at(line, Instant::now())
    }

    /// [`Router::dispatch`] with an explicit clock reading for cooldowns.
    pub fn dispatch_at(&mut self, line: &ChatLine, now: Instant) -> Option<String> {
        let text = self.parser.command_text(&line.text)?;

        let Some((command, captures)) = self.registry.find(text) else {
            return respond(
                &self.plugins,
                &self.storage,
                &mut self.cooldowns,
                line,
                text,
                now,
            );
        };

        if !authorize(command.level, &line.sender) {
            tracing::debug!(
                "[{}] {} lacks level {} for '{}'",
                line.channel,
                line.sender,
                command.level,
                command.id()
            );
            return None;
        }

        let level = line.sender.level();
        if !self
            .cooldowns
            .check_at(command.id(), &line.channel, level, &command.cooldown, now)
        {
            tracing::debug!("[{}] '{}' is on cooldown", line.channel, command.id());
            return None;
        }

        let mut ctx = Context {
            line,
            captures,
            storage: &mut self.storage,
            prefix: self.parser.prefix(),
            commands: &self.registry,
        };

        match (command.handler)(&mut ctx) {
            Ok(reply) => {
                self.cooldowns.mark_at(command.id(), &line.channel, now);
                reply
            }
            Err(CommandError::Storage(e)) => {
                tracing::error!(
                    "[{}] '{}' from {} failed to persist: {}",
                    line.channel,
                    command.id(),
                    line.sender,
                    e
                );
                Some(CommandError::Storage(e).reply())
            }
            Err(e) => {
                tracing::debug!("[{}] '{}' refused: {}", line.channel, command.id(), e);
                Some(e.reply())
            }
        }
    }

    /// Runs plugin shutdown hooks and closes storage. Only the first call has an effect.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.plugins.shutdown(&mut self.storage);
        self.storage.close();
        tracing::info!("Router shut down");
    }
}

/// Falls back to the response commands plugins define, for text no pattern
/// matched. Same gates as a pattern command; the reply is the stored text.
fn respond(
    plugins: &PluginManager,
    storage: &Storage,
    cooldowns: &mut CooldownTracker,
    line: &ChatLine,
    text: &str,
    now: Instant,
) -> Option<String> {
    let name = text.trim().to_lowercase();
    if !ResponseCommand::valid_name(&name) {
        tracing::debug!("[{}] No command matches '{}'", line.channel, text);
        return None;
    }
    let Some(command) = plugins.lookup(storage, &line.channel, &name) else {
        tracing::debug!("[{}] No command matches '{}'", line.channel, text);
        return None;
    };

    if !authorize(command.level, &line.sender) {
        tracing::debug!(
            "[{}] {} lacks level {} for '{}'",
            line.channel,
            line.sender,
            command.level,
            name
        );
        return None;
    }

    let id = command.cooldown_id();
    if !cooldowns.check_at(&id, &line.channel, line.sender.level(), &command.cooldown(), now) {
        tracing::debug!("[{}] '{}' is on cooldown", line.channel, id);
        return None;
    }

    cooldowns.mark_at(&id, &line.channel, now);
    tracing::info!("[{}] Answered '{}' for {}", line.channel, name, line.sender);
    Some(command.response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::StorageError;
    use crate::application::services::QuoteStore;
    use crate::domain::entities::{CommandDefinition, HandlerResult, Level, User};
    use crate::domain::traits::Store;
    use crate::infrastructure::database::{CounterDb, ResponseDb};
    use crate::plugins::{Plugin, QuotesPlugin};
    use std::collections::BTreeMap;
    use std::time::Duration;
    use tempfile::TempDir;

    struct Echo;

    fn echo(ctx: &mut Context<'_>) -> HandlerResult {
        Ok(Some(format!("echo {}", ctx.arg(1).unwrap_or(""))))
    }

    fn first(_ctx: &mut Context<'_>) -> HandlerResult {
        Ok(Some("first".to_string()))
    }

    fn second(_ctx: &mut Context<'_>) -> HandlerResult {
        Ok(Some("second".to_string()))
    }

    fn refuse(_ctx: &mut Context<'_>) -> HandlerResult {
        Err(CommandError::NotFound("nothing here".to_string()))
    }

    impl Plugin for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "test commands"
        }

        fn register(&self, registry: &mut CommandRegistry) -> Result<(), CommandError> {
            registry.register("echo", CommandDefinition::new("echo (.+)", echo)?)?;
            registry.register("echo", CommandDefinition::new(r"pick \d+", first)?)?;
            registry.register("echo", CommandDefinition::new(r"pick .+", second)?)?;
            registry.register(
                "echo",
                CommandDefinition::new("secret", first)?.with_level(Level::Moderator),
            )?;
            registry.register("echo", CommandDefinition::new("missing", refuse)?)?;
            Ok(())
        }
    }

    fn router() -> (Router, TempDir) {
        let temp = TempDir::new().unwrap();
        let storage = Storage::open(temp.path()).unwrap();
        let mut plugins = PluginManager::new();
        plugins.register(Echo).unwrap();
        (Router::boot("!", storage, plugins).unwrap(), temp)
    }

    fn line(text: &str) -> ChatLine {
        ChatLine::new("chan", User::new("viewer"), text)
    }

    #[test]
    fn routes_to_matching_handler() {
        let (mut router, _temp) = router();
        assert_eq!(router.dispatch(&line("!echo hi")), Some("echo hi".to_string()));
        assert_eq!(router.dispatch(&line("echo hi")), None);
        assert_eq!(router.dispatch(&line("!nothing")), None);
    }

    #[test]
    fn first_registered_pattern_wins() {
        let (mut router, _temp) = router();
        assert_eq!(router.dispatch(&line("!pick 3")), Some("first".to_string()));
        assert_eq!(router.dispatch(&line("!pick x")), Some("second".to_string()));
    }

    #[test]
    fn unauthorized_is_silent_and_leaves_no_cooldown() {
        let (mut router, _temp) = router();
        let t0 = Instant::now();
        assert_eq!(router.dispatch_at(&line("!secret"), t0), None);

        let moderator = ChatLine::new("chan", User::new("m").with_moderator(), "!secret");
        assert_eq!(router.dispatch_at(&moderator, t0), Some("first".to_string()));
    }

    #[test]
    fn cooldown_throttles_silently() {
        let (mut router, _temp) = router();
        let t0 = Instant::now();
        assert!(router.dispatch_at(&line("!echo a"), t0).is_some());
        assert_eq!(router.dispatch_at(&line("!echo a"), t0 + Duration::from_secs(29)), None);
        assert!(router
            .dispatch_at(&line("!echo a"), t0 + Duration::from_secs(30))
            .is_some());

        let elsewhere = ChatLine::new("other", User::new("viewer"), "!echo a");
        assert!(router.dispatch_at(&elsewhere, t0).is_some());
    }

    #[test]
    fn refused_handler_replies_without_consuming_window() {
        let (mut router, _temp) = router();
        let t0 = Instant::now();
        assert_eq!(
            router.dispatch_at(&line("!missing"), t0),
            Some("nothing here".to_string())
        );
        assert_eq!(
            router.dispatch_at(&line("!missing"), t0),
            Some("nothing here".to_string())
        );
    }

    /// Reads find nothing, every write fails.
    struct FailingStore;

    impl Store for FailingStore {
        fn read_log(&self, _channel: &str) -> Result<Vec<String>, StorageError> {
            Ok(Vec::new())
        }
        fn touch_log(&self, _channel: &str) -> Result<(), StorageError> {
            Ok(())
        }
        fn append_log(&self, _channel: &str, _line: &str) -> Result<(), StorageError> {
            Err(StorageError::Corrupt("disk full".to_string()))
        }
        fn write_log(&self, _channel: &str, _lines: &[String]) -> Result<(), StorageError> {
            Err(StorageError::Corrupt("disk full".to_string()))
        }
        fn read_nicknames(&self) -> Result<BTreeMap<String, String>, StorageError> {
            Ok(BTreeMap::new())
        }
        fn write_nicknames(&self, _nicknames: &BTreeMap<String, String>) -> Result<(), StorageError> {
            Err(StorageError::Corrupt("disk full".to_string()))
        }
    }

    #[test]
    fn storage_failure_gets_generic_reply_and_keeps_window() {
        let quotes = QuoteStore::open(Box::new(FailingStore)).unwrap();
        let storage = Storage::new(
            quotes,
            CounterDb::in_memory().unwrap(),
            ResponseDb::in_memory().unwrap(),
        );
        let mut plugins = PluginManager::new();
        plugins.register(QuotesPlugin).unwrap();
        let mut router = Router::boot("!", storage, plugins).unwrap();

        let generic = CommandError::Storage(StorageError::Closed).reply();
        let add = ChatLine::new("chan", User::new("m").with_moderator(), "!quote add x");
        let t0 = Instant::now();
        assert_eq!(router.dispatch_at(&add, t0), Some(generic.clone()));
        assert_eq!(router.dispatch_at(&add, t0), Some(generic));

        assert_eq!(
            router.dispatch_at(&line("!quotes"), t0).as_deref(),
            Some("There are no quotes yet. Time to make some!")
        );
    }

    #[test]
    fn conflicting_plugins_fail_boot() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::open(temp.path()).unwrap();
        let mut plugins = PluginManager::new();
        plugins.register(Echo).unwrap();
        assert!(plugins.register(Echo).is_err());

        struct Copycat;
        impl Plugin for Copycat {
            fn name(&self) -> &str {
                "copycat"
            }
            fn description(&self) -> &str {
                "re-registers echo"
            }
            fn register(&self, registry: &mut CommandRegistry) -> Result<(), CommandError> {
                registry.register("copycat", CommandDefinition::new("echo (.+)", echo)?)
            }
        }
        plugins.register(Copycat).unwrap();
        assert!(matches!(
            Router::boot("!", storage, plugins),
            Err(CommandError::RegistrationConflict { .. })
        ));
    }

    #[test]
    fn shutdown_closes_storage_once() {
        let (mut router, _temp) = router();
        router.shutdown();
        assert!(!router.storage().counters.is_open());
        router.shutdown();
    }
}
