//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Storage: Quote logs and nickname files
//! - Database: SQLite counters
//! - Adapters: Chat transports

pub mod config;
pub mod storage;
pub mod database;
pub mod adapters;
