use super::{CooldownPolicy, Level};

/// Namespace for the cooldown ids of response commands, kept apart from
/// pattern sources.
const COOLDOWN_NAMESPACE: &str = "commands:";

/// A channel-defined command that answers with fixed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseCommand {
    /// Lowercase word, without the command prefix.
    pub name: String,
    pub response: String,
    pub level: Level,
    pub cooldown_secs: u64,
}

impl ResponseCommand {
    pub fn new(name: &str, response: impl Into<String>, level: Level, cooldown_secs: u64) -> Self {
        Self {
            name: name.to_lowercase(),
            response: response.into(),
            level,
            cooldown_secs,
        }
    }

    /// Same window for every caller level.
    pub fn cooldown(&self) -> CooldownPolicy {
        CooldownPolicy::from_secs(self.cooldown_secs, self.cooldown_secs)
    }

    pub fn cooldown_id(&self) -> String {
        format!("{}{}", COOLDOWN_NAMESPACE, self.name)
    }

    /// Response command names are a single word of letters, digits or `_`.
    pub fn valid_name(name: &str) -> bool {
        !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_single_words() {
        assert!(ResponseCommand::valid_name("discord"));
        assert!(ResponseCommand::valid_name("so_2"));
        assert!(!ResponseCommand::valid_name(""));
        assert!(!ResponseCommand::valid_name("two words"));
        assert!(!ResponseCommand::valid_name("!bang"));
    }

    #[test]
    fn cooldown_is_level_independent() {
        let cmd = ResponseCommand::new("Discord", "join us", Level::Everyone, 10);
        assert_eq!(cmd.name, "discord");
        assert_eq!(cmd.cooldown(), CooldownPolicy::from_secs(10, 10));
        assert_eq!(cmd.cooldown_id(), "commands:discord");
    }
}
