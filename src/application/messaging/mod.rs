//! Message handling - match, authorize, throttle, dispatch

pub mod cooldown;
pub mod dispatcher;
pub mod parser;
pub mod permission;

pub use cooldown::CooldownTracker;
pub use dispatcher::Router;
pub use parser::{MessageParser, DEFAULT_COMMAND_PREFIX};
pub use permission::authorize;
