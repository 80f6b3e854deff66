//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::application::errors::ConfigError;
use crate::domain::entities::{Level, User};

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub console: ConsoleConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
    pub prefix: String,
    /// User allowed to stop the bot with `<prefix>shutdown`.
    pub admin: String,
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub entrance_message: Option<String>,
    #[serde(default)]
    pub shutdown_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StorageConfig {
    pub directory: PathBuf,
}

/// Identity the console transport speaks with.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConsoleConfig {
    pub user: String,
    pub channel: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./data"),
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            user: "pepper".to_string(),
            channel: "pepper".to_string(),
            roles: vec!["broadcaster".to_string()],
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                name: "pepper-bot".to_string(),
                prefix: "!".to_string(),
                admin: "pepper".to_string(),
                channels: vec!["pepper".to_string()],
                entrance_message: Some("Hello everyone! pepper-bot is here.".to_string()),
                shutdown_message: Some("pepper-bot is heading out. Bye!".to_string()),
            },
            storage: StorageConfig::default(),
            console: ConsoleConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `BOT_PREFIX`, `BOT_ADMIN`, `BOT_CHANNELS` and `BOT_DATA_DIR`.
    pub fn load_env() -> Self {
        let mut config = Config::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(prefix) = var("BOT_PREFIX") {
            self.bot.prefix = prefix;
        }
        if let Some(admin) = var("BOT_ADMIN") {
            self.bot.admin = admin;
        }
        if let Some(channels) = var("BOT_CHANNELS") {
            self.bot.channels = channels
                .split(',')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect();
        }
        if let Some(dir) = var("BOT_DATA_DIR") {
            self.storage.directory = PathBuf::from(dir);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.prefix.is_empty() {
            return Err(ConfigError::MissingField("bot.prefix".to_string()));
        }
        if self.bot.prefix.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidValue(format!(
                "bot.prefix '{}' must not contain whitespace",
                self.bot.prefix
            )));
        }
        if self.bot.admin.trim().is_empty() {
            return Err(ConfigError::MissingField("bot.admin".to_string()));
        }
        self.console_user()?;
        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// The chatter console lines are attributed to, with the configured roles.
    pub fn console_user(&self) -> Result<User, ConfigError> {
        self.console
            .roles
            .iter()
            .try_fold(User::new(&self.console.user), |user, role| {
                role.parse::<Level>()
                    .map(|level| user.with_level(level))
                    .map_err(|e| ConfigError::InvalidValue(format!("console.roles: {}", e)))
            })
    }
}
