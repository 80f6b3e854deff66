//! Death counter plugin - per-channel counters for the game being played

use tracing::info;

use crate::application::errors::{CommandError, StorageError};
use crate::domain::entities::{CommandDefinition, CommandRegistry, Context, HandlerResult, Level};
use crate::infrastructure::storage::Storage;
use crate::plugins::trait_def::Plugin;

const NAME: &str = "deathcount";
const RESERVED_COMMAND_NAMES: &[&str] = &["dc", "d", "dd", "deathcount"];
const MODERATOR_COOLDOWN_SECS: u64 = 15;

pub struct DeathCountPlugin;

impl Plugin for DeathCountPlugin {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Death counters for the games a channel plays"
    }

    fn register(&self, registry: &mut CommandRegistry) -> Result<(), CommandError> {
        registry.register(
            NAME,
            CommandDefinition::new(r"d( \d+)?", increment_deaths)?
                .with_description("Add deaths to the current game")
                .with_level(Level::Moderator)
                .with_moderator_cooldown(MODERATOR_COOLDOWN_SECS),
        )?;
        registry.register(
            NAME,
            CommandDefinition::new(r"dd( \d+)?", decrement_deaths)?
                .with_description("Take deaths away from the current game")
                .with_level(Level::Moderator)
                .with_moderator_cooldown(MODERATOR_COOLDOWN_SECS),
        )?;
        registry.register(
            NAME,
            CommandDefinition::new(r"dc( [\w\W ]+)?", death_count)?
                .with_description("Show the death count"),
        )?;
        registry.register(
            NAME,
            CommandDefinition::new("deathcount reset", reset_deaths)?
                .with_level(Level::Broadcaster),
        )?;
        registry.register(
            NAME,
            CommandDefinition::new(r"deathcount remove game (.+)", remove_game)?
                .with_level(Level::Moderator),
        )?;
        registry.register(
            NAME,
            CommandDefinition::new(r"deathcount add game (.+)", add_game)?
                .with_level(Level::Moderator)
                .with_moderator_cooldown(MODERATOR_COOLDOWN_SECS),
        )?;
        registry.register(
            NAME,
            CommandDefinition::new(r"deathcount set game (.+)", set_game)?
                .with_level(Level::Moderator),
        )?;
        registry.reserve(NAME, RESERVED_COMMAND_NAMES)
    }

    fn shutdown(&self, storage: &mut Storage) {
        info!("Saving death counters and closing the database");
        if let Err(e) = storage.counters.close() {
            tracing::error!("Failed to close death counter database: {}", e);
        }
    }
}

fn no_game(prefix: &str) -> CommandError {
    CommandError::NotFound(format!(
        "No game has been set for the death counter. The streamer or a mod \
         can set the game by using '{}deathcount set game <game>'",
        prefix
    ))
}

fn too_many_deaths() -> CommandError {
    CommandError::InvalidArgs("That's way too many deaths.".to_string())
}

fn amount(raw: Option<&str>) -> Result<i64, CommandError> {
    match raw {
        None => Ok(1),
        Some(raw) => raw.trim().parse().map_err(|_| too_many_deaths()),
    }
}

fn default_game(ctx: &Context<'_>) -> Result<String, CommandError> {
    ctx.storage
        .counters
        .default_key(&ctx.line.channel)?
        .ok_or_else(|| no_game(ctx.prefix))
}

fn increment_deaths(ctx: &mut Context<'_>) -> HandlerResult {
    let line = ctx.line;
    let by = amount(ctx.arg(1))?;
    let game = default_game(ctx)?;

    ctx.storage
        .counters
        .increment(&line.channel, &game, by)
        .map_err(|e| match e {
            StorageError::Overflow(_) => too_many_deaths(),
            other => CommandError::Storage(other),
        })?
        .ok_or_else(|| CommandError::NotFound("The game you've given is not in the list of games!".to_string()))?;

    info!(
        "{} has incremented the death count by {}, for the game '{}', in channel '{}'",
        line.sender, by, game, line.channel
    );
    Ok(Some(format!(
        "Death count has been incremented by {}, for the game '{}'. RIP",
        by, game
    )))
}

fn decrement_deaths(ctx: &mut Context<'_>) -> HandlerResult {
    let line = ctx.line;
    let by = amount(ctx.arg(1))?;
    let game = default_game(ctx)?;

    ctx.storage
        .counters
        .decrement(&line.channel, &game, by)?
        .ok_or_else(|| CommandError::NotFound("The game you've given is not in the list of games!".to_string()))?;

    info!(
        "{} has decremented the death count for the game '{}' by {} in channel '{}'",
        line.sender, game, by, line.channel
    );
    Ok(Some(format!(
        "Death count has been decremented by {} for the game '{}'.",
        by, game
    )))
}

fn reset_deaths(ctx: &mut Context<'_>) -> HandlerResult {
    let line = ctx.line;
    let game = default_game(ctx)?;

    if !ctx.storage.counters.reset(&line.channel, &game)? {
        return Err(CommandError::NotFound(
            "The game currently set is not in the list of games.".to_string(),
        ));
    }

    info!("Reset death count for game '{}' in channel '{}'", game, line.channel);
    Ok(Some(format!(
        "Deaths have been reset to zero for the game '{}'.",
        game
    )))
}

fn death_count(ctx: &mut Context<'_>) -> HandlerResult {
    let line = ctx.line;
    let game = match ctx.arg(1) {
        Some(raw) => raw.trim().to_lowercase(),
        None => default_game(ctx)?,
    };

    let Some(deaths) = ctx.storage.counters.get(&line.channel, &game)? else {
        return Err(CommandError::NotFound(format!(
            "{} is not in the list of games.",
            game
        )));
    };
    let streamer = ctx.storage.quotes.nickname(&line.channel);

    info!(
        "Read death count of {} for the game '{}' in channel '{}'",
        deaths, game, line.channel
    );
    let reply = match deaths {
        0 => format!("{} has yet to die!", streamer),
        1 => format!("{} has died 1 time. RIP", streamer),
        n => format!("{} has died {} times. RIP", streamer, n),
    };
    Ok(Some(reply))
}

fn add_game(ctx: &mut Context<'_>) -> HandlerResult {
    let line = ctx.line;
    let game = ctx.arg(1).unwrap_or_default().trim().to_string();

    if !ctx.storage.counters.add_key(&line.channel, &game)? {
        return Err(CommandError::Conflict(format!(
            "'{}' is already in the list of games.",
            game
        )));
    }

    info!(
        "{} has added the game '{}' to channel '{}'",
        line.sender, game, line.channel
    );
    Ok(Some(format!("'{}' is now in the list of games!", game)))
}

fn remove_game(ctx: &mut Context<'_>) -> HandlerResult {
    let line = ctx.line;
    let game = ctx.arg(1).unwrap_or_default().trim().to_string();

    if !ctx.storage.counters.remove_key(&line.channel, &game)? {
        return Err(CommandError::NotFound(format!(
            "{} is not in the list of games.",
            game
        )));
    }

    info!(
        "{} has removed the game '{}' from channel '{}'",
        line.sender, game, line.channel
    );
    Ok(Some(format!("{} has been removed from the list of games! RIP", game)))
}

fn set_game(ctx: &mut Context<'_>) -> HandlerResult {
    let line = ctx.line;
    let game = ctx.arg(1).unwrap_or_default().trim().to_string();

    if !ctx.storage.counters.set_default(&line.channel, &game)? {
        return Err(CommandError::NotFound(format!(
            "{game} is not in the list of games. If you'd like to add it to the \
             list of games (and are a moderator), run '{prefix}deathcount add game {game}'.",
            game = game,
            prefix = ctx.prefix
        )));
    }

    info!(
        "Default game for channel '{}' has been set to '{}' by {}",
        line.channel, game, line.sender
    );
    Ok(Some(format!("Game has been changed to {}.", game)))
}
