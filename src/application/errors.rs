//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Plugin error: {0}")]
    Plugin(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Command registration and execution errors.
///
/// The variants a handler returns decide what the caller sees: input,
/// not-found and conflict errors are replied verbatim, storage errors are
/// logged and answered with a generic failure.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Conflict(String),

    #[error("'{token}' is already claimed by module '{owner}'")]
    RegistrationConflict { token: String, owner: String },

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl CommandError {
    /// Text sent back to the chat for this failure, if any.
    pub fn reply(&self) -> String {
        match self {
            CommandError::Storage(_)
            | CommandError::RegistrationConflict { .. }
            | CommandError::InvalidPattern { .. } => {
                "Something went wrong while doing that, please try again later.".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Value out of range: {0}")]
    Overflow(String),

    #[error("Store is closed")]
    Closed,
}

/// Quote store errors
#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("Quote numbers must not be negative.")]
    NegativeIndex(i64),

    #[error("There is no quote #0, quotes start at #1.")]
    ZeroIndex,

    #[error("Quote #{index} does not exist.")]
    IndexTooLarge { index: i64, len: usize },

    #[error("That quote is the same as quote #{existing}!")]
    Duplicate { existing: usize },

    #[error("Your quote was too large, please shorten it!")]
    TooLarge,

    #[error("{0}")]
    InvalidText(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<QuoteError> for CommandError {
    fn from(err: QuoteError) -> Self {
        match err {
            QuoteError::Storage(e) => CommandError::Storage(e),
            QuoteError::IndexTooLarge { .. } => CommandError::NotFound(err.to_string()),
            QuoteError::Duplicate { .. } => CommandError::Conflict(err.to_string()),
            other => CommandError::InvalidArgs(other.to_string()),
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
