use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

use crate::application::errors::StorageError;

mod responses;

pub use responses::ResponseDb;

/// Per-channel named counters, one of which may be flagged as the default.
pub struct CounterDb {
    conn: Option<Connection>,
}

impl CounterDb {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        let db = Self { conn: Some(conn) };
        db.init_tables()?;
        Ok(db)
    }

    pub fn in_memory() -> Result<Self, StorageError> {
        let db = Self {
            conn: Some(Connection::open_in_memory()?),
        };
        db.init_tables()?;
        Ok(db)
    }

    fn init_tables(&self) -> Result<(), StorageError> {
        self.conn()?.execute(
            "CREATE TABLE IF NOT EXISTS counters (
                channel TEXT NOT NULL,
                key TEXT NOT NULL,
                count INTEGER NOT NULL DEFAULT 0,
                is_default INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (channel, key)
            )",
            [],
        )?;
        Ok(())
    }

    fn conn(&self) -> Result<&Connection, StorageError> {
        self.conn.as_ref().ok_or(StorageError::Closed)
    }

    /// Adds a key at zero. Returns false if the channel already has it.
    pub fn add_key(&self, channel: &str, key: &str) -> Result<bool, StorageError> {
        let rows = self.conn()?.execute(
            "INSERT OR IGNORE INTO counters (channel, key, count, is_default) VALUES (?1, ?2, 0, 0)",
            rusqlite::params![channel.to_lowercase(), key.to_lowercase()],
        )?;
        Ok(rows > 0)
    }

    pub fn remove_key(&self, channel: &str, key: &str) -> Result<bool, StorageError> {
        let rows = self.conn()?.execute(
            "DELETE FROM counters WHERE channel = ?1 AND key = ?2",
            rusqlite::params![channel.to_lowercase(), key.to_lowercase()],
        )?;
        Ok(rows > 0)
    }

    pub fn get(&self, channel: &str, key: &str) -> Result<Option<i64>, StorageError> {
        let count = self
            .conn()?
            .query_row(
                "SELECT count FROM counters WHERE channel = ?1 AND key = ?2",
                rusqlite::params![channel.to_lowercase(), key.to_lowercase()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(count)
    }

    /// Adds `amount` and returns the new count, or `None` if the key is unknown.
    /// A sum past `i64::MAX` is refused and leaves the count as it was.
    pub fn increment(&self, channel: &str, key: &str, amount: i64) -> Result<Option<i64>, StorageError> {
        let conn = self.conn()?;
        let (channel, key) = (channel.to_lowercase(), key.to_lowercase());

        let tx = conn.unchecked_transaction()?;
        let current: Option<i64> = tx
            .query_row(
                "SELECT count FROM counters WHERE channel = ?1 AND key = ?2",
                rusqlite::params![channel, key],
                |row| row.get(0),
            )
            .optional()?;
        let Some(current) = current else {
            return Ok(None);
        };
        let updated = current
            .checked_add(amount)
            .ok_or_else(|| StorageError::Overflow(format!("{} + {}", current, amount)))?;
        tx.execute(
            "UPDATE counters SET count = ?1 WHERE channel = ?2 AND key = ?3",
            rusqlite::params![updated, channel, key],
        )?;
        tx.commit()?;
        Ok(Some(updated))
    }

    /// Subtracts `amount`, never going below zero.
    pub fn decrement(&self, channel: &str, key: &str, amount: i64) -> Result<Option<i64>, StorageError> {
        let rows = self.conn()?.execute(
            "UPDATE counters SET count = MAX(count - ?1, 0) WHERE channel = ?2 AND key = ?3",
            rusqlite::params![amount, channel.to_lowercase(), key.to_lowercase()],
        )?;
        if rows == 0 {
            return Ok(None);
        }
        self.get(channel, key)
    }

    pub fn reset(&self, channel: &str, key: &str) -> Result<bool, StorageError> {
        let rows = self.conn()?.execute(
            "UPDATE counters SET count = 0 WHERE channel = ?1 AND key = ?2",
            rusqlite::params![channel.to_lowercase(), key.to_lowercase()],
        )?;
        Ok(rows > 0)
    }

    /// The key used when a command does not name one.
    pub fn default_key(&self, channel: &str) -> Result<Option<String>, StorageError> {
        let key = self
            .conn()?
            .query_row(
                "SELECT key FROM counters WHERE channel = ?1 AND is_default = 1",
                [channel.to_lowercase()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(key)
    }

    /// Makes `key` the channel's only default. Returns false if the key is unknown.
    pub fn set_default(&self, channel: &str, key: &str) -> Result<bool, StorageError> {
        let conn = self.conn()?;
        let (channel, key) = (channel.to_lowercase(), key.to_lowercase());

        let tx = conn.unchecked_transaction()?;
        let exists = tx
            .query_row(
                "SELECT 1 FROM counters WHERE channel = ?1 AND key = ?2",
                rusqlite::params![channel, key],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if !exists {
            return Ok(false);
        }
        tx.execute(
            "UPDATE counters SET is_default = 0 WHERE channel = ?1 AND is_default = 1",
            [&channel],
        )?;
        tx.execute(
            "UPDATE counters SET is_default = 1 WHERE channel = ?1 AND key = ?2",
            rusqlite::params![channel, key],
        )?;
        tx.commit()?;
        Ok(true)
    }

    pub fn key_count(&self, channel: &str) -> Result<usize, StorageError> {
        let count: i64 = self.conn()?.query_row(
            "SELECT COUNT(*) FROM counters WHERE channel = ?1",
            [channel.to_lowercase()],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as usize)
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    pub fn close(&mut self) -> Result<(), StorageError> {
        if let Some(conn) = self.conn.take() {
            conn.close().map_err(|(_, e)| StorageError::Database(e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_unique_per_channel() {
        let db = CounterDb::in_memory().unwrap();
        assert!(db.add_key("chan", "Dark Souls").unwrap());
        assert!(!db.add_key("CHAN", "dark souls").unwrap());
        assert!(db.add_key("other", "dark souls").unwrap());
        assert_eq!(db.key_count("chan").unwrap(), 1);
    }

    #[test]
    fn decrement_floors_at_zero() {
        let db = CounterDb::in_memory().unwrap();
        db.add_key("chan", "game").unwrap();
        assert_eq!(db.increment("chan", "game", 3).unwrap(), Some(3));
        assert_eq!(db.decrement("chan", "game", 5).unwrap(), Some(0));
        assert_eq!(db.increment("chan", "missing", 1).unwrap(), None);
    }

    #[test]
    fn increment_past_max_is_refused() {
        let db = CounterDb::in_memory().unwrap();
        db.add_key("chan", "game").unwrap();
        assert_eq!(db.increment("chan", "game", i64::MAX).unwrap(), Some(i64::MAX));
        assert!(matches!(
            db.increment("chan", "game", 1),
            Err(StorageError::Overflow(_))
        ));
        assert_eq!(db.get("chan", "game").unwrap(), Some(i64::MAX));
        assert_eq!(db.decrement("chan", "game", i64::MAX).unwrap(), Some(0));
    }

    #[test]
    fn only_one_default_per_channel() {
        let db = CounterDb::in_memory().unwrap();
        db.add_key("chan", "a").unwrap();
        db.add_key("chan", "b").unwrap();
        assert_eq!(db.default_key("chan").unwrap(), None);

        assert!(db.set_default("chan", "a").unwrap());
        assert!(db.set_default("chan", "b").unwrap());
        assert_eq!(db.default_key("chan").unwrap(), Some("b".to_string()));
        assert!(!db.set_default("chan", "nope").unwrap());
        assert_eq!(db.default_key("chan").unwrap(), Some("b".to_string()));
    }

    #[test]
    fn closed_db_reports_closed() {
        let mut db = CounterDb::in_memory().unwrap();
        db.close().unwrap();
        assert!(!db.is_open());
        assert!(matches!(db.get("chan", "a"), Err(StorageError::Closed)));
    }
}
