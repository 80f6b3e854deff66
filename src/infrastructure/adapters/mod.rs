//! Platform adapters - chat transports

pub mod console;

pub use console::ConsoleAdapter;
