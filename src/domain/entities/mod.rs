//! Domain entities - Core business objects

pub mod level;
pub mod user;
pub mod message;
pub mod command;
pub mod quote;
pub mod response;

pub use level::Level;
pub use user::User;
pub use message::{normalize_channel, ChatLine, EmoteSpan};
pub use command::{
    CommandDefinition, CommandRegistry, Context, CooldownPolicy, Handler, HandlerResult, Pattern,
    DEFAULT_COOLDOWN_SECS,
};
pub use quote::{QuoteRecord, QuoteView, DELETED_FILL, MAX_MESSAGE_LEN, SIZE_MARGIN};
pub use response::ResponseCommand;
