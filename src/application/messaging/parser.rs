//! Message parser - Finds the command text inside a raw chat line

/// Default prefix marking a chat line as a command.
pub const DEFAULT_COMMAND_PREFIX: &str = "!";

/// Strips the command prefix from incoming chat text
#[derive(Debug, Clone)]
pub struct MessageParser {
    command_prefix: String,
}

impl MessageParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            command_prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.command_prefix
    }

    /// The text after the prefix, or `None` if the line is not a command.
    pub fn command_text<'a>(&self, text: &'a str) -> Option<&'a str> {
        let text = text.trim();
        let rest = text.strip_prefix(self.command_prefix.as_str())?;
        let rest = rest.trim();
        if rest.is_empty() {
            None
        } else {
            Some(rest)
        }
    }

    /// Is `text` exactly `<prefix><name>`, ignoring case?
    pub fn is_command(&self, text: &str, name: &str) -> bool {
        self.command_text(text)
            .map(|cmd| cmd.eq_ignore_ascii_case(name))
            .unwrap_or(false)
    }
}

impl Default for MessageParser {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_prefix() {
        let parser = MessageParser::default();
        assert_eq!(parser.command_text("!quote 3"), Some("quote 3"));
        assert_eq!(parser.command_text("  !quotes  "), Some("quotes"));
        assert_eq!(parser.command_text("quote 3"), None);
        assert_eq!(parser.command_text("!"), None);
    }

    #[test]
    fn custom_prefix() {
        let parser = MessageParser::new("~");
        assert_eq!(parser.command_text("~dc"), Some("dc"));
        assert!(parser.is_command("~Shutdown", "shutdown"));
        assert!(!parser.is_command("!shutdown", "shutdown"));
    }
}
