use std::fmt;
use super::Level;

/// A chatter as seen on an inbound line, with the role flags the transport reported.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct User {
    pub name: String,
    pub is_moderator: bool,
    pub is_subscriber: bool,
    pub is_broadcaster: bool,
}

impl User {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_moderator: false,
            is_subscriber: false,
            is_broadcaster: false,
        }
    }

    pub fn with_moderator(mut self) -> Self {
        self.is_moderator = true;
        self
    }

    pub fn with_subscriber(mut self) -> Self {
        self.is_subscriber = true;
        self
    }

    pub fn with_broadcaster(mut self) -> Self {
        self.is_broadcaster = true;
        self
    }

    /// Grants the role named by `level` on top of the existing flags.
    pub fn with_level(self, level: Level) -> Self {
        match level {
            Level::Everyone => self,
            Level::Subscriber => self.with_subscriber(),
            Level::Moderator => self.with_moderator(),
            Level::Broadcaster => self.with_broadcaster(),
        }
    }

    /// Effective level: the highest role held.
    pub fn level(&self) -> Level {
        if self.is_broadcaster {
            Level::Broadcaster
        } else if self.is_moderator {
            Level::Moderator
        } else if self.is_subscriber {
            Level::Subscriber
        } else {
            Level::Everyone
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
