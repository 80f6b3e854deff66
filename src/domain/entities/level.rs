use std::fmt;
use std::str::FromStr;

/// Role level a caller holds, or a command requires.
///
/// Ordered so that `Everyone < Subscriber < Moderator < Broadcaster`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Level {
    #[default]
    Everyone,
    Subscriber,
    Moderator,
    Broadcaster,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Everyone => "everyone",
            Level::Subscriber => "subscriber",
            Level::Moderator => "moderator",
            Level::Broadcaster => "broadcaster",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "everyone" => Ok(Level::Everyone),
            "subscriber" | "sub" => Ok(Level::Subscriber),
            "moderator" | "mod" => Ok(Level::Moderator),
            "broadcaster" => Ok(Level::Broadcaster),
            other => Err(format!("unknown level '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered() {
        assert!(Level::Everyone < Level::Subscriber);
        assert!(Level::Subscriber < Level::Moderator);
        assert!(Level::Moderator < Level::Broadcaster);
    }

    #[test]
    fn parses_aliases() {
        assert_eq!("MOD".parse::<Level>(), Ok(Level::Moderator));
        assert_eq!("sub".parse::<Level>(), Ok(Level::Subscriber));
        assert!("admin".parse::<Level>().is_err());
    }
}
