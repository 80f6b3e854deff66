//! Application layer - routing and the services built on the domain
//!
//! - `messaging`: prefix parsing, role gate, cooldowns, the command router
//! - `services`: quote bookkeeping and the chat service loop
//! - `errors`: error types shared by every layer

pub mod errors;
pub mod messaging;
pub mod services;
