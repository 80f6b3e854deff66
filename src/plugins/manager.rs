//! Plugin manager - handles plugin registration and shutdown hooks

use crate::application::errors::{BotError, CommandError};
use crate::domain::entities::{CommandRegistry, ResponseCommand};
use crate::infrastructure::storage::Storage;
use crate::plugins::trait_def::Plugin;
use tracing::info;

/// Manages all plugins for the bot, in registration order
#[derive(Default)]
pub struct PluginManager {
    plugins: Vec<Box<dyn Plugin>>,
}

impl PluginManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin
    pub fn register<P: Plugin + 'static>(&mut self, plugin: P) -> Result<(), BotError> {
        let name = plugin.name().to_string();

        if self.has_plugin(&name) {
            return Err(BotError::Plugin(format!("Plugin '{}' already registered", name)));
        }

        info!("Registering plugin: {}", name);
        self.plugins.push(Box::new(plugin));
        Ok(())
    }

    /// Lets every plugin register its commands; stops at the first conflict.
    pub fn install(&self, registry: &mut CommandRegistry) -> Result<(), CommandError> {
        for plugin in &self.plugins {
            plugin.register(registry).map_err(|e| {
                tracing::error!("Plugin '{}' failed to register: {}", plugin.name(), e);
                e
            })?;
        }
        Ok(())
    }

    /// First plugin, in registration order, that knows a command called `name`.
    /// A failing lookup is logged and the next plugin is asked.
    pub fn lookup(&self, storage: &Storage, channel: &str, name: &str) -> Option<ResponseCommand> {
        self.plugins.iter().find_map(|plugin| {
            plugin
                .lookup(storage, channel, name)
                .unwrap_or_else(|e| {
                    tracing::error!(
                        "[{}] Plugin '{}' failed to look up '{}': {}",
                        channel,
                        plugin.name(),
                        name,
                        e
                    );
                    None
                })
        })
    }

    /// Runs shutdown hooks in registration order.
    pub fn shutdown(&self, storage: &mut Storage) {
        for plugin in &self.plugins {
            info!("Shutting down plugin: {}", plugin.name());
            plugin.shutdown(storage);
        }
    }

    /// List all registered plugins
    pub fn list_plugins(&self) -> Vec<PluginInfo> {
        self.plugins
            .iter()
            .map(|plugin| PluginInfo {
                name: plugin.name().to_string(),
                description: plugin.description().to_string(),
            })
            .collect()
    }

    /// Check if a plugin exists
    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.iter().any(|p| p.name() == name)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

/// Plugin information for listing
#[derive(Debug, Clone)]
pub struct PluginInfo {
    pub name: String,
    pub description: String,
}
