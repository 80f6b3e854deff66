use std::collections::BTreeMap;
use crate::application::errors::StorageError;

/// Store trait - per-channel ordered logs and the nickname table
///
/// Logs are line oriented: every entry is one line without its newline.
pub trait Store: Send {
    /// All lines of a channel's log, in order. Empty if the log does not exist.
    fn read_log(&self, channel: &str) -> Result<Vec<String>, StorageError>;

    /// Create the channel's log if it does not exist yet.
    fn touch_log(&self, channel: &str) -> Result<(), StorageError>;

    /// Append one line to the end of a channel's log.
    fn append_log(&self, channel: &str, line: &str) -> Result<(), StorageError>;

    /// Replace a channel's log with `lines`. Either every line is written or
    /// the previous log is left in place.
    fn write_log(&self, channel: &str, lines: &[String]) -> Result<(), StorageError>;

    fn read_nicknames(&self) -> Result<BTreeMap<String, String>, StorageError>;

    fn write_nicknames(&self, nicknames: &BTreeMap<String, String>) -> Result<(), StorageError>;
}
