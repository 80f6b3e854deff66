//! Quotes plugin - create, read, edit and delete channel quotes

use tracing::info;

use crate::application::errors::CommandError;
use crate::application::services::{DeleteOutcome, EditOutcome};
use crate::domain::entities::{CommandDefinition, CommandRegistry, Context, HandlerResult, Level, QuoteView};
use crate::infrastructure::storage::Storage;
use crate::plugins::trait_def::Plugin;

const NAME: &str = "quotes";
const RESERVED_COMMAND_NAMES: &[&str] = &["quote"];

pub struct QuotesPlugin;

impl Plugin for QuotesPlugin {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Channel quotes with numbered, recoverable slots"
    }

    fn register(&self, registry: &mut CommandRegistry) -> Result<(), CommandError> {
        registry.register(
            NAME,
            CommandDefinition::new("quotes", quote_count)?.with_description("Count the channel's quotes"),
        )?;
        registry.register(
            NAME,
            CommandDefinition::new(r"quote add( --\w+=\w+)? (.+)", quote_add)?
                .with_description("Add a quote, optionally --name=<who>")
                .with_level(Level::Moderator),
        )?;
        registry.register(
            NAME,
            CommandDefinition::new(r"quote edit (\d+)( --\w+=\w+)? (.+)", quote_edit)?
                .with_description("Replace a quote's text")
                .with_level(Level::Moderator),
        )?;
        registry.register(
            NAME,
            CommandDefinition::new(r"quote delete (\d+)", quote_delete)?
                .with_description("Delete a quote")
                .with_level(Level::Moderator),
        )?;
        registry.register(
            NAME,
            CommandDefinition::new(r"quote set nickname (.+)", quote_set_nickname)?
                .with_description("Set the name new quotes are attributed to")
                .with_level(Level::Moderator),
        )?;
        registry.register(
            NAME,
            CommandDefinition::new(r"quote( \d+)?", quote_read)?
                .with_description("Show a quote, or a random one"),
        )?;
        registry.reserve(NAME, RESERVED_COMMAND_NAMES)
    }

    fn shutdown(&self, storage: &mut Storage) {
        if let Err(e) = storage.quotes.save_all() {
            tracing::error!("Failed to save quotes on shutdown: {}", e);
        }
    }
}

fn parse_index(raw: &str) -> Result<i64, CommandError> {
    raw.trim()
        .parse()
        .map_err(|_| CommandError::InvalidArgs("Not even sure what you're trying to do.".to_string()))
}

/// Value of a ` --name=<value>` option group.
fn name_option(option: Option<&str>) -> Option<String> {
    let (key, value) = option?.trim().trim_start_matches('-').split_once('=')?;
    if key.eq_ignore_ascii_case("name") && !value.is_empty() {
        Some(value.to_string())
    } else {
        None
    }
}

/// Whether `text` is nothing but a `--key=value` option.
fn is_option_token(text: &str) -> bool {
    text.trim()
        .strip_prefix("--")
        .and_then(|rest| rest.split_once('='))
        .is_some_and(|(key, value)| {
            let word = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_');
            word(key) && word(value)
        })
}

/// Quote text from a capture, refusing a lone option with nothing after it.
fn quote_text(raw: Option<&str>) -> Result<String, CommandError> {
    let text = raw.unwrap_or_default();
    if is_option_token(text) {
        return Err(CommandError::InvalidArgs("A quote needs some text.".to_string()));
    }
    Ok(text.to_string())
}

/// Chat answer for `quotes`, banded by how many there are.
pub fn describe_count(total: usize, deleted: usize) -> String {
    if total == 0 {
        return "There are no quotes yet. Time to make some!".to_string();
    }
    if total == deleted {
        return if total == 1 {
            "There is only one quote and it was deleted!".to_string()
        } else {
            format!("There are only deleted quotes, {} of them!", deleted)
        };
    }
    if total > 150 {
        format!(
            "There are {} quotes and {} are deleted! Will they ever stop!?",
            total, deleted
        )
    } else if total > 100 {
        format!("{} quotes, {} were burned at the stake!", total, deleted)
    } else if total > 50 {
        format!("There are {} quotes and {} of those were deleted!", total, deleted)
    } else if total == 1 {
        "There is 1 quote.".to_string()
    } else {
        let deleted_message = if deleted == 1 {
            "1 was deleted.".to_string()
        } else {
            format!("{} were deleted.", deleted)
        };
        format!("There are {} quotes, of which {}", total, deleted_message)
    }
}

fn quote_count(ctx: &mut Context<'_>) -> HandlerResult {
    let line = ctx.line;
    let (total, deleted) = ctx.storage.quotes.count(&line.channel)?;
    info!(
        "Read quote count of {} for channel '{}'. {} are deleted.",
        total, line.channel, deleted
    );
    Ok(Some(describe_count(total, deleted)))
}

fn quote_read(ctx: &mut Context<'_>) -> HandlerResult {
    let line = ctx.line;
    let index = match ctx.arg(1) {
        Some(raw) => parse_index(raw)?,
        None => 0,
    };

    let view = if index == 0 {
        ctx.storage.quotes.random(&line.channel)?
    } else {
        ctx.storage.quotes.get(&line.channel, index)?
    };

    match view {
        QuoteView::Missing { .. } | QuoteView::Empty | QuoteView::NoLive => {
            Err(CommandError::NotFound(view.to_string()))
        }
        view => Ok(Some(view.to_string())),
    }
}

fn quote_add(ctx: &mut Context<'_>) -> HandlerResult {
    let line = ctx.line;
    let name = name_option(ctx.arg(1));
    let text = quote_text(ctx.arg(2))?;

    let attributed = name.unwrap_or_else(|| ctx.storage.quotes.nickname(&line.channel));
    let index = ctx.storage.quotes.add(&line.channel, &text, &attributed)?;

    info!(
        "User {}, in channel {}, has created quote #{}: {}",
        line.sender, line.channel, index, text
    );
    Ok(Some(format!("Quote #{} has been created!", index)))
}

fn quote_edit(ctx: &mut Context<'_>) -> HandlerResult {
    let line = ctx.line;
    let index = parse_index(ctx.arg(1).unwrap_or_default())?;
    let name = name_option(ctx.arg(2));
    let text = quote_text(ctx.arg(3))?;

    match ctx
        .storage
        .quotes
        .edit(&line.channel, index, &text, name.as_deref())?
    {
        EditOutcome::Revived => {
            info!(
                "{} has edited quote #{}, which was previously deleted, in channel '{}': {}",
                line.sender, index, line.channel, text
            );
            Ok(Some(format!(
                "Previously deleted quote #{} has been reborn as a new quote!",
                index
            )))
        }
        EditOutcome::Edited { previous } => {
            info!(
                "{} has edited quote #{} in channel '{}': {} -> {}",
                line.sender, index, line.channel, previous.text, text
            );
            Ok(Some(format!("Quote #{} has been successfully edited!", index)))
        }
    }
}

fn quote_delete(ctx: &mut Context<'_>) -> HandlerResult {
    let line = ctx.line;
    let index = parse_index(ctx.arg(1).unwrap_or_default())?;

    match ctx
        .storage
        .quotes
        .delete(&line.channel, index, &line.sender.name)?
    {
        DeleteOutcome::Deleted { .. } => Ok(Some(format!(
            "Quote #{index} has been deleted. Rip quote #{index}",
            index = index
        ))),
        DeleteOutcome::AlreadyDeleted { date } => Ok(Some(format!(
            "Quote #{} was already deleted on {}.",
            index,
            date.format("%Y-%m-%d")
        ))),
    }
}

fn quote_set_nickname(ctx: &mut Context<'_>) -> HandlerResult {
    let line = ctx.line;
    let nickname = ctx.arg(1).unwrap_or_default().trim().to_string();
    let moved = ctx.storage.quotes.set_nickname(&line.channel, &nickname)?;

    info!(
        "User '{}' has changed the nickname of channel '{}' to '{}' ({} quotes updated)",
        line.sender, line.channel, nickname, moved
    );
    Ok(Some(format!("Nickname has been changed to '{}'", nickname)))
}
