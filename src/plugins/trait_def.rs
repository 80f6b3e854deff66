//! Plugin trait definitions

use crate::application::errors::{CommandError, StorageError};
use crate::domain::entities::{CommandRegistry, ResponseCommand};
use crate::infrastructure::storage::Storage;

/// A module of chat commands sharing the router's registry and storage.
pub trait Plugin: Send + Sync {
    /// Unique identifier for the plugin, also the owner name of its commands
    fn name(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    /// Register commands and reserve command words. Runs once, before any
    /// line is routed.
    fn register(&self, registry: &mut CommandRegistry) -> Result<(), CommandError>;

    /// Optional: answer a command word no registered pattern matched.
    /// `name` is lowercase, without the prefix.
    fn lookup(
        &self,
        _storage: &Storage,
        _channel: &str,
        _name: &str,
    ) -> Result<Option<ResponseCommand>, StorageError> {
        Ok(None)
    }

    /// Optional: release resources when the bot stops
    fn shutdown(&self, _storage: &mut Storage) {}
}
