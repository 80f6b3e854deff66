use clap::{Parser, Subcommand};
use std::path::Path;

use pepper_bot::application::errors::BotError;
use pepper_bot::application::messaging::Router;
use pepper_bot::application::services::{ChatService, ServiceSettings};
use pepper_bot::infrastructure::adapters::ConsoleAdapter;
use pepper_bot::infrastructure::config::Config;
use pepper_bot::infrastructure::storage::Storage;
use pepper_bot::plugins::default_plugins;

#[derive(Parser)]
#[command(name = "pepper-bot")]
#[command(about = "A chat command bot with quotes and death counters", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml", global = true)]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run {
        /// Channels to join (overrides the config list)
        channels: Vec<String>,
    },
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { channels } => {
            if let Err(e) = run_bot(&cli.config, channels) {
                tracing::error!("pepper-bot stopped with an error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Version => {
            println!("pepper-bot v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            if let Err(e) = init_config() {
                eprintln!("Failed to generate config: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn load_config(config_path: &str) -> Config {
    if Path::new(config_path).exists() {
        Config::load(config_path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::load_env()
        })
    } else {
        Config::load_env()
    }
}

fn run_bot(config_path: &str, channels: Vec<String>) -> Result<(), BotError> {
    let mut config = load_config(config_path);
    if !channels.is_empty() {
        config.bot.channels = channels;
    }
    config.validate()?;

    tracing::info!("Starting {} in {:?}", config.bot.name, config.bot.channels);

    let storage = Storage::open(&config.storage.directory)?;
    let plugins = default_plugins()?;
    for plugin in plugins.list_plugins() {
        tracing::info!("Plugin {}: {}", plugin.name, plugin.description);
    }
    let router = Router::boot(config.bot.prefix.clone(), storage, plugins)?;

    let settings = ServiceSettings::new(config.bot.admin.clone())
        .with_channels(&config.bot.channels)
        .with_entrance_message(config.bot.entrance_message.clone())
        .with_shutdown_message(config.bot.shutdown_message.clone());

    let transport = ConsoleAdapter::new(config.console_user()?, config.console.channel.clone());

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| BotError::Internal(format!("Failed to start runtime: {}", e)))?;
    let reason = rt.block_on(async {
        let mut service = ChatService::new(transport, router, settings);
        service.run().await
    })?;

    tracing::info!("pepper-bot stopped: {:?}", reason);
    Ok(())
}

fn init_config() -> Result<(), BotError> {
    let yaml = Config::default().to_yaml()?;
    println!("{}", yaml);
    println!("\nSave this to config.yaml and adjust as needed.");
    Ok(())
}
