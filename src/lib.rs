//! pepper-bot - a chat command bot with quotes and death counters
//!
//! Layers:
//! - `domain`: entities and the ports infrastructure implements
//! - `application`: routing, cooldowns, quote store and the chat loop
//! - `infrastructure`: config, file and SQLite storage, transports
//! - `plugins`: the command modules the bot ships with

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod plugins;
