//! Domain layer - Core business objects and the ports they rely on
//!
//! This layer contains:
//! - Entities: levels, chat lines, commands and the registry, quote records
//! - Traits: abstractions for infrastructure (transport, store)

pub mod entities;
pub mod traits;
