//! Command modules for pepper-bot
//!
//! Each plugin registers its commands against the shared registry at boot.

pub mod commands;
pub mod deathcount;
pub mod manager;
pub mod quotes;
pub mod sacrifice;
pub mod trait_def;

pub use commands::CommandsPlugin;
pub use deathcount::DeathCountPlugin;
pub use manager::PluginManager;
pub use quotes::QuotesPlugin;
pub use sacrifice::SacrificePlugin;
pub use trait_def::Plugin;

/// Plugins shipped with the bot, in registration order.
pub fn default_plugins() -> Result<PluginManager, crate::application::errors::BotError> {
    let mut manager = PluginManager::new();
    manager.register(QuotesPlugin)?;
    manager.register(DeathCountPlugin)?;
    manager.register(CommandsPlugin)?;
    manager.register(SacrificePlugin::new())?;
    Ok(manager)
}
