//! Sacrifice plugin - chatters volunteer, moderators draw one at random

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use rand::seq::IndexedRandom;
use tracing::info;

use crate::application::errors::CommandError;
use crate::domain::entities::{CommandDefinition, CommandRegistry, Context, HandlerResult, Level};
use crate::plugins::trait_def::Plugin;

const NAME: &str = "sacrifice";
const RESERVED_COMMAND_NAMES: &[&str] = &["sacrifice"];
const MODERATOR_COOLDOWN_SECS: u64 = 5;
const NOBODY: &str = "Nobody has offered themselves as a sacrifice.";

/// One channel's volunteers for the current day, split by role.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Offerings {
    day: NaiveDate,
    mods: Vec<String>,
    subs: Vec<String>,
    others: Vec<String>,
}

impl Offerings {
    fn new(day: NaiveDate) -> Self {
        Self {
            day,
            mods: Vec::new(),
            subs: Vec::new(),
            others: Vec::new(),
        }
    }

    fn contains(&self, name: &str) -> bool {
        [&self.mods, &self.subs, &self.others]
            .into_iter()
            .any(|list| list.iter().any(|n| n == name))
    }

    fn len(&self) -> usize {
        self.mods.len() + self.subs.len() + self.others.len()
    }

    fn everyone(&self) -> Vec<&String> {
        self.others.iter().chain(&self.subs).chain(&self.mods).collect()
    }
}

/// Volunteers per channel. Kept in memory only and emptied when the day changes.
struct Altar {
    today: fn() -> NaiveDate,
    channels: HashMap<String, Offerings>,
}

impl Altar {
    fn offerings(&mut self, channel: &str) -> &mut Offerings {
        let today = (self.today)();
        let offerings = self
            .channels
            .entry(channel.to_string())
            .or_insert_with(|| Offerings::new(today));
        if offerings.day != today {
            info!("New day, clearing the sacrifices of channel '{}'", channel);
            *offerings = Offerings::new(today);
        }
        offerings
    }
}

fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub struct SacrificePlugin {
    altar: Arc<Mutex<Altar>>,
}

impl Default for SacrificePlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl SacrificePlugin {
    pub fn new() -> Self {
        Self::with_today(local_today)
    }

    /// Overrides the clock deciding when the lists are emptied.
    pub fn with_today(today: fn() -> NaiveDate) -> Self {
        Self {
            altar: Arc::new(Mutex::new(Altar {
                today,
                channels: HashMap::new(),
            })),
        }
    }
}

impl Plugin for SacrificePlugin {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Pick a random volunteer from chat"
    }

    fn register(&self, registry: &mut CommandRegistry) -> Result<(), CommandError> {
        let altar = Arc::clone(&self.altar);
        registry.register(
            NAME,
            CommandDefinition::new(r"sacrifice( subs| mods)?", move |ctx| draw(&altar, ctx))?
                .with_description("Draw a volunteer, optionally only subs or mods")
                .with_level(Level::Moderator)
                .with_moderator_cooldown(MODERATOR_COOLDOWN_SECS),
        )?;
        let altar = Arc::clone(&self.altar);
        registry.register(
            NAME,
            CommandDefinition::new("sacrifice reset", move |ctx| reset(&altar, ctx))?
                .with_description("Clear today's volunteers")
                .with_level(Level::Moderator),
        )?;
        let altar = Arc::clone(&self.altar);
        registry.register(
            NAME,
            CommandDefinition::new("sacrifices", move |ctx| count(&altar, ctx))?
                .with_description("Count today's volunteers"),
        )?;
        let altar = Arc::clone(&self.altar);
        registry.register(
            NAME,
            CommandDefinition::new("sacrificeme", move |ctx| volunteer(&altar, ctx))?
                .with_description("Offer yourself")
                .with_cooldowns(0, 0),
        )?;
        registry.reserve(NAME, RESERVED_COMMAND_NAMES)
    }
}

fn lock(altar: &Mutex<Altar>) -> MutexGuard<'_, Altar> {
    altar.lock().unwrap_or_else(PoisonError::into_inner)
}

fn draw(altar: &Mutex<Altar>, ctx: &mut Context<'_>) -> HandlerResult {
    let line = ctx.line;
    let option = ctx.arg(1).map(str::trim);

    let mut altar = lock(altar);
    let offerings = altar.offerings(&line.channel);
    let mut rng = rand::rng();
    let (chosen, reply) = match option {
        Some("subs") => (
            offerings.subs.choose(&mut rng),
            "Subscriber sacrifice is @",
        ),
        Some("mods") => (
            offerings.mods.choose(&mut rng),
            "Moderator sacrifice is @",
        ),
        _ => (
            offerings.everyone().choose(&mut rng).copied(),
            "Today's sacrifice is @",
        ),
    };

    let Some(chosen) = chosen else {
        let empty = match option {
            Some("subs") => "No subscribers have offered themselves as a sacrifice.",
            Some("mods") => "No moderators have offered themselves as a sacrifice.",
            _ => NOBODY,
        };
        return Err(CommandError::NotFound(empty.to_string()));
    };

    info!("Sacrificed user '{}' in channel '{}'", chosen, line.channel);
    Ok(Some(format!("{}{}", reply, chosen)))
}

fn reset(altar: &Mutex<Altar>, ctx: &mut Context<'_>) -> HandlerResult {
    let line = ctx.line;
    let mut altar = lock(altar);
    let offerings = altar.offerings(&line.channel);
    *offerings = Offerings::new(offerings.day);

    info!(
        "Sacrifice list has been cleared by '{}' in channel '{}'",
        line.sender, line.channel
    );
    Ok(Some("List of sacrifices has been cleared.".to_string()))
}

fn count(altar: &Mutex<Altar>, ctx: &mut Context<'_>) -> HandlerResult {
    let line = ctx.line;
    let mut altar = lock(altar);
    let count = altar.offerings(&line.channel).len();

    info!("Read sacrifice count of {} for channel '{}'", count, line.channel);
    let reply = match count {
        0 => NOBODY.to_string(),
        1 => "There is 1 soon-to-be sacrifice!".to_string(),
        n => format!("There are {} soon-to-be sacrifices!", n),
    };
    Ok(Some(reply))
}

/// Adds the caller to the list for their role. Silent, and a no-op for
/// anyone already listed today.
fn volunteer(altar: &Mutex<Altar>, ctx: &mut Context<'_>) -> HandlerResult {
    let line = ctx.line;
    let name = line.sender.name.to_lowercase();
    let mut altar = lock(altar);
    let offerings = altar.offerings(&line.channel);
    if offerings.contains(&name) {
        return Ok(None);
    }

    let (list, role) = match line.sender.level() {
        Level::Broadcaster | Level::Moderator => (&mut offerings.mods, "mods"),
        Level::Subscriber => (&mut offerings.subs, "subs"),
        Level::Everyone => (&mut offerings.others, "everyone else"),
    };
    info!(
        "Adding '{}' to the {} sacrifice list for channel '{}'",
        name, role, line.channel
    );
    list.push(name);
    Ok(None)
}
