use std::collections::HashMap;
use std::time::Duration;

use regex_lite::Regex;

use super::{ChatLine, Level, User};
use crate::application::errors::CommandError;
use crate::infrastructure::storage::Storage;

/// Seconds used for both cooldowns when a command does not set its own.
pub const DEFAULT_COOLDOWN_SECS: u64 = 30;

/// Command handler result: an optional reply for the channel.
pub type HandlerResult = Result<Option<String>, CommandError>;

/// Command handler function type
pub type Handler = Box<dyn Fn(&mut Context<'_>) -> HandlerResult + Send + Sync>;

/// Everything a handler may touch while it runs.
pub struct Context<'a> {
    pub line: &'a ChatLine,
    /// Capture groups of the matched pattern, group 1 first.
    pub captures: Vec<Option<String>>,
    pub storage: &'a mut Storage,
    pub prefix: &'a str,
    /// The registry the command was matched in, read-only.
    pub commands: &'a CommandRegistry,
}

impl<'a> Context<'a> {
    /// Capture group `group` (1-based, as in the pattern), if it participated.
    pub fn arg(&self, group: usize) -> Option<&str> {
        group
            .checked_sub(1)
            .and_then(|i| self.captures.get(i))
            .and_then(|c| c.as_deref())
    }

    pub fn channel(&self) -> &str {
        &self.line.channel
    }

    pub fn sender(&self) -> &User {
        &self.line.sender
    }
}

/// Text-matching rule for a command.
///
/// The source is compiled anchored at both ends and tried against the line
/// with the command prefix stripped. Its literal leading word is the token
/// that reservations are checked against.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
    leading: String,
}

impl Pattern {
    pub fn new(source: impl Into<String>) -> Result<Self, CommandError> {
        let source = source.into();
        let regex = Regex::new(&format!("^(?:{})$", source)).map_err(|e| {
            CommandError::InvalidPattern {
                pattern: source.clone(),
                reason: e.to_string(),
            }
        })?;

        let mut leading: String = source
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .collect();
        // A quantifier right after the word makes its last character optional.
        if matches!(source[leading.len()..].chars().next(), Some('?' | '*' | '{')) {
            leading.pop();
        }
        if leading.is_empty() {
            return Err(CommandError::InvalidPattern {
                pattern: source,
                reason: "pattern must start with a literal command word".to_string(),
            });
        }

        Ok(Self {
            source,
            regex,
            leading: leading.to_lowercase(),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn leading_token(&self) -> &str {
        &self.leading
    }

    /// Capture groups if the whole command text matches.
    pub fn captures(&self, text: &str) -> Option<Vec<Option<String>>> {
        let caps = self.regex.captures(text)?;
        Some(
            (1..caps.len())
                .map(|i| caps.get(i).map(|m| m.as_str().to_string()))
                .collect(),
        )
    }
}

/// Cooldown durations for one command: moderators and above use `moderator`,
/// everyone else uses `everyone`. Zero means unthrottled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownPolicy {
    pub moderator: Duration,
    pub everyone: Duration,
}

impl CooldownPolicy {
    pub fn from_secs(moderator: u64, everyone: u64) -> Self {
        Self {
            moderator: Duration::from_secs(moderator),
            everyone: Duration::from_secs(everyone),
        }
    }

    pub fn none() -> Self {
        Self::from_secs(0, 0)
    }

    pub fn duration_for(&self, level: Level) -> Duration {
        if level >= Level::Moderator {
            self.moderator
        } else {
            self.everyone
        }
    }
}

impl Default for CooldownPolicy {
    fn default() -> Self {
        Self::from_secs(DEFAULT_COOLDOWN_SECS, DEFAULT_COOLDOWN_SECS)
    }
}

/// Represents a bot command
pub struct CommandDefinition {
    pub pattern: Pattern,
    pub description: Option<String>,
    pub level: Level,
    pub cooldown: CooldownPolicy,
    pub handler: Handler,
}

impl CommandDefinition {
    pub fn new<F>(pattern: &str, handler: F) -> Result<Self, CommandError>
    where
        F: Fn(&mut Context<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        Ok(Self {
            pattern: Pattern::new(pattern)?,
            description: None,
            level: Level::Everyone,
            cooldown: CooldownPolicy::default(),
            handler: Box::new(handler),
        })
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_cooldowns(mut self, moderator_secs: u64, everyone_secs: u64) -> Self {
        self.cooldown = CooldownPolicy::from_secs(moderator_secs, everyone_secs);
        self
    }

    pub fn with_moderator_cooldown(mut self, secs: u64) -> Self {
        self.cooldown.moderator = Duration::from_secs(secs);
        self
    }

    /// Identity used for cooldown bookkeeping; unique because patterns are.
    pub fn id(&self) -> &str {
        self.pattern.source()
    }
}

struct Registered {
    owner: String,
    command: CommandDefinition,
}

/// Ordered command table shared by every module.
///
/// Patterns are unique across all modules, and a word reserved by one module
/// cannot lead a pattern registered by another. Matching is first-registered
/// wins.
#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<Registered>,
    reserved: HashMap<String, String>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, owner: &str, command: CommandDefinition) -> Result<(), CommandError> {
        if let Some(existing) = self
            .commands
            .iter()
            .find(|r| r.command.pattern.source() == command.pattern.source())
        {
            return Err(CommandError::RegistrationConflict {
                token: command.pattern.source().to_string(),
                owner: existing.owner.clone(),
            });
        }

        let token = command.pattern.leading_token();
        if let Some(holder) = self.reserved.get(token) {
            if holder != owner {
                return Err(CommandError::RegistrationConflict {
                    token: token.to_string(),
                    owner: holder.clone(),
                });
            }
        }

        tracing::debug!("{} registered '{}' ({})", owner, command.id(), command.level);
        self.commands.push(Registered {
            owner: owner.to_string(),
            command,
        });
        Ok(())
    }

    /// Claims command words for `owner` without registering a command for them.
    pub fn reserve(&mut self, owner: &str, names: &[&str]) -> Result<(), CommandError> {
        for name in names {
            let name = name.to_lowercase();
            if let Some(holder) = self.reserved.get(&name) {
                if holder != owner {
                    return Err(CommandError::RegistrationConflict {
                        token: name,
                        owner: holder.clone(),
                    });
                }
            }
            if let Some(user) = self
                .commands
                .iter()
                .find(|r| r.owner != owner && r.command.pattern.leading_token() == name)
            {
                return Err(CommandError::RegistrationConflict {
                    token: name,
                    owner: user.owner.clone(),
                });
            }
            self.reserved.insert(name, owner.to_string());
        }
        Ok(())
    }

    /// First command, in registration order, whose pattern matches `text`.
    pub fn find(&self, text: &str) -> Option<(&CommandDefinition, Vec<Option<String>>)> {
        self.commands.iter().find_map(|r| {
            r.command
                .pattern
                .captures(text)
                .map(|captures| (&r.command, captures))
        })
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.contains_key(&name.to_lowercase())
    }

    /// Whether a module already answers to `name`: reserved, leading a
    /// pattern, or matched by one as a whole.
    pub fn is_taken(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.is_reserved(&name)
            || self.find(&name).is_some()
            || self
                .commands
                .iter()
                .any(|r| r.command.pattern.leading_token() == name)
    }

    pub fn all(&self) -> impl Iterator<Item = &CommandDefinition> {
        self.commands.iter().map(|r| &r.command)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
