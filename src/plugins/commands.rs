//! General commands plugin - channel-defined commands that answer with fixed text

use tracing::info;

use crate::application::errors::{CommandError, StorageError};
use crate::domain::entities::{
    CommandDefinition, CommandRegistry, Context, HandlerResult, Level, ResponseCommand,
    DEFAULT_COOLDOWN_SECS, MAX_MESSAGE_LEN,
};
use crate::infrastructure::storage::Storage;
use crate::plugins::trait_def::Plugin;

const NAME: &str = "commands";
const RESERVED_COMMAND_NAMES: &[&str] = &["commands"];
const MODERATOR_COOLDOWN_SECS: u64 = 3;

pub struct CommandsPlugin;

impl Plugin for CommandsPlugin {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Simple response commands defined per channel"
    }

    fn register(&self, registry: &mut CommandRegistry) -> Result<(), CommandError> {
        registry.register(
            NAME,
            CommandDefinition::new(r"commands add((?: --\w+=\w+)*) (\S+) (.+)", commands_add)?
                .with_description("Create a command, optionally --userlevel=<level> --cooldown=<secs>")
                .with_level(Level::Moderator)
                .with_moderator_cooldown(MODERATOR_COOLDOWN_SECS),
        )?;
        registry.register(
            NAME,
            CommandDefinition::new(r"commands edit((?: --\w+=\w+)*) (\S+) (.+)", commands_edit)?
                .with_description("Change a command's response or options")
                .with_level(Level::Moderator)
                .with_moderator_cooldown(MODERATOR_COOLDOWN_SECS),
        )?;
        registry.register(
            NAME,
            CommandDefinition::new(r"commands (?:delete|remove) (\S+)", commands_delete)?
                .with_level(Level::Moderator)
                .with_moderator_cooldown(MODERATOR_COOLDOWN_SECS),
        )?;
        registry.register(
            NAME,
            CommandDefinition::new(r"commands rename (\S+) (\S+)", commands_rename)?
                .with_level(Level::Moderator)
                .with_moderator_cooldown(MODERATOR_COOLDOWN_SECS),
        )?;
        registry.reserve(NAME, RESERVED_COMMAND_NAMES)
    }

    fn lookup(
        &self,
        storage: &Storage,
        channel: &str,
        name: &str,
    ) -> Result<Option<ResponseCommand>, StorageError> {
        storage.responses.get(channel, name)
    }

    fn shutdown(&self, storage: &mut Storage) {
        info!("Closing the general command database");
        if let Err(e) = storage.responses.close() {
            tracing::error!("Failed to close general command database: {}", e);
        }
    }
}

/// `--userlevel` and `--cooldown`, as given. Unknown keys are ignored.
#[derive(Debug, Default, PartialEq, Eq)]
struct Options {
    level: Option<Level>,
    cooldown_secs: Option<u64>,
}

fn parse_options(raw: Option<&str>) -> Options {
    let mut options = Options::default();
    for token in raw.unwrap_or_default().split_whitespace() {
        let Some((key, value)) = token.trim_start_matches('-').split_once('=') else {
            continue;
        };
        match key.to_lowercase().as_str() {
            // An unknown level falls back to everyone.
            "userlevel" => options.level = Some(value.parse().unwrap_or(Level::Everyone)),
            "cooldown" => match value.parse() {
                Ok(secs) => options.cooldown_secs = Some(secs),
                Err(_) => tracing::debug!("Ignoring cooldown '{}'", value),
            },
            other => tracing::debug!("Ignoring option '{}'", other),
        }
    }
    options
}

/// The lowercase name in `!name`, for the router's prefix.
fn command_name(prefix: &str, raw: Option<&str>) -> Result<String, CommandError> {
    raw.unwrap_or_default()
        .strip_prefix(prefix)
        .filter(|name| ResponseCommand::valid_name(name))
        .map(str::to_lowercase)
        .ok_or_else(|| {
            CommandError::InvalidArgs(format!(
                "Command names look like '{}name': the prefix, then one word.",
                prefix
            ))
        })
}

fn check_response(response: &str) -> Result<String, CommandError> {
    let response = response.trim();
    if response.is_empty() {
        return Err(CommandError::InvalidArgs("A command needs a response.".to_string()));
    }
    if response.len() > MAX_MESSAGE_LEN {
        return Err(CommandError::InvalidArgs(
            "That response is too long for chat, please shorten it!".to_string(),
        ));
    }
    Ok(response.to_string())
}

fn in_use(name: &str) -> CommandError {
    CommandError::Conflict(format!("The name '{}' is already in use.", name))
}

fn unknown(name: &str) -> CommandError {
    CommandError::NotFound(format!("There is no command named '{}'.", name))
}

fn commands_add(ctx: &mut Context<'_>) -> HandlerResult {
    let line = ctx.line;
    let options = parse_options(ctx.arg(1));
    let name = command_name(ctx.prefix, ctx.arg(2))?;
    let response = check_response(ctx.arg(3).unwrap_or_default())?;

    if ctx.commands.is_taken(&name) {
        return Err(in_use(&name));
    }

    let command = ResponseCommand::new(
        &name,
        response,
        options.level.unwrap_or_default(),
        options.cooldown_secs.unwrap_or(DEFAULT_COOLDOWN_SECS),
    );
    if !ctx.storage.responses.add(&line.channel, &command)? {
        return Err(in_use(&name));
    }

    info!(
        "{} has created command '{}' ({}, {}s) in channel '{}': {}",
        line.sender, name, command.level, command.cooldown_secs, line.channel, command.response
    );
    Ok(Some(format!("Command '{}' has been created PogChamp", name)))
}

fn commands_edit(ctx: &mut Context<'_>) -> HandlerResult {
    let line = ctx.line;
    let options = parse_options(ctx.arg(1));
    let name = command_name(ctx.prefix, ctx.arg(2))?;
    let response = check_response(ctx.arg(3).unwrap_or_default())?;

    let Some(mut command) = ctx.storage.responses.get(&line.channel, &name)? else {
        return Err(unknown(&name));
    };
    command.response = response;
    if let Some(level) = options.level {
        command.level = level;
    }
    if let Some(secs) = options.cooldown_secs {
        command.cooldown_secs = secs;
    }
    if !ctx.storage.responses.update(&line.channel, &command)? {
        return Err(unknown(&name));
    }

    info!(
        "{} has edited command '{}' in channel '{}': {}",
        line.sender, name, line.channel, command.response
    );
    Ok(Some(format!("Command '{}' has been updated.", name)))
}

fn commands_delete(ctx: &mut Context<'_>) -> HandlerResult {
    let line = ctx.line;
    let name = command_name(ctx.prefix, ctx.arg(1))?;

    if !ctx.storage.responses.remove(&line.channel, &name)? {
        return Err(unknown(&name));
    }

    info!(
        "{} has deleted command '{}' in channel '{}'",
        line.sender, name, line.channel
    );
    Ok(Some(format!("Command '{}' has been deleted.", name)))
}

fn commands_rename(ctx: &mut Context<'_>) -> HandlerResult {
    let line = ctx.line;
    let from = command_name(ctx.prefix, ctx.arg(1))?;
    let to = command_name(ctx.prefix, ctx.arg(2))?;

    if ctx.commands.is_taken(&to) {
        return Err(in_use(&to));
    }
    if ctx.storage.responses.get(&line.channel, &from)?.is_none() {
        return Err(unknown(&from));
    }
    if !ctx.storage.responses.rename(&line.channel, &from, &to)? {
        return Err(in_use(&to));
    }

    info!(
        "{} has renamed command '{}' to '{}' in channel '{}'",
        line.sender, from, to, line.channel
    );
    Ok(Some(format!("Command '{}' has been renamed to '{}'.", from, to)))
}
