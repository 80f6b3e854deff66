//! Application services - quote bookkeeping and the chat loop

pub mod chat_service;
pub mod quote_store;

pub use chat_service::{ChatService, ServiceSettings, StopReason};
pub use quote_store::{DeleteOutcome, EditOutcome, QuoteStore};
