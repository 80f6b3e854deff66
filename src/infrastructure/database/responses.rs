//! Per-channel response commands

use std::path::Path;

use rusqlite::{Connection, OptionalExtension};

use crate::application::errors::StorageError;
use crate::domain::entities::{Level, ResponseCommand};

/// SQLite table of response commands, keyed by channel and name.
pub struct ResponseDb {
    conn: Option<Connection>,
}

impl ResponseDb {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db = Self {
            conn: Some(Connection::open(path)?),
        };
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
            "CREATE TABLE IF NOT EXISTS responses (
                channel TEXT NOT NULL,
                name TEXT NOT NULL,
                response TEXT NOT NULL,
                level TEXT NOT NULL DEFAULT 'everyone',
                cooldown INTEGER NOT NULL DEFAULT 30,
                PRIMARY KEY (channel, name)
            )",
            [],
        )?;
        Ok(())
    }

    fn conn(&self) -> Result<&Connection, StorageError> {
        self.conn.as_ref().ok_or(StorageError::Closed)
    }

    /// Stores a new command. Returns false if the channel already has the name.
    pub fn add(&self, channel: &str, command: &ResponseCommand) -> Result<bool, StorageError> {
        let rows = self.conn()?.execute(
            "INSERT OR IGNORE INTO responses (channel, name, response, level, cooldown)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                channel.to_lowercase(),
                command.name,
                command.response,
                command.level.as_str(),
                cooldown_column(command.cooldown_secs),
            ],
        )?;
        Ok(rows > 0)
    }

    pub fn get(&self, channel: &str, name: &str) -> Result<Option<ResponseCommand>, StorageError> {
        let row = self
            .conn()?
            .query_row(
                "SELECT name, response, level, cooldown FROM responses WHERE channel = ?1 AND name = ?2",
                rusqlite::params![channel.to_lowercase(), name.to_lowercase()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((name, response, level, cooldown)) = row else {
            return Ok(None);
        };
        let level = level.parse::<Level>().unwrap_or_else(|e| {
            tracing::warn!("Command '{}' in channel {} has {}, using everyone", name, channel, e);
            Level::Everyone
        });
        Ok(Some(ResponseCommand::new(
            &name,
            response,
            level,
            u64::try_from(cooldown).unwrap_or(0),
        )))
    }

    /// Replaces the stored command of the same name. Returns false if there is none.
    pub fn update(&self, channel: &str, command: &ResponseCommand) -> Result<bool, StorageError> {
        let rows = self.conn()?.execute(
            "UPDATE responses SET response = ?1, level = ?2, cooldown = ?3
             WHERE channel = ?4 AND name = ?5",
            rusqlite::params![
                command.response,
                command.level.as_str(),
                cooldown_column(command.cooldown_secs),
                channel.to_lowercase(),
                command.name,
            ],
        )?;
        Ok(rows > 0)
    }

    pub fn remove(&self, channel: &str, name: &str) -> Result<bool, StorageError> {
        let rows = self.conn()?.execute(
            "DELETE FROM responses WHERE channel = ?1 AND name = ?2",
            rusqlite::params![channel.to_lowercase(), name.to_lowercase()],
        )?;
        Ok(rows > 0)
    }

    /// Moves `from` to `to`. Returns false if `from` is unknown or `to` is taken.
    pub fn rename(&self, channel: &str, from: &str, to: &str) -> Result<bool, StorageError> {
        let (channel, from, to) = (channel.to_lowercase(), from.to_lowercase(), to.to_lowercase());
        let conn = self.conn()?;

        let tx = conn.unchecked_transaction()?;
        let taken = tx
            .query_row(
                "SELECT 1 FROM responses WHERE channel = ?1 AND name = ?2",
                rusqlite::params![channel, to],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if taken {
            return Ok(false);
        }
        let rows = tx.execute(
            "UPDATE responses SET name = ?1 WHERE channel = ?2 AND name = ?3",
            rusqlite::params![to, channel, from],
        )?;
        tx.commit()?;
        Ok(rows > 0)
    }

    pub fn count(&self, channel: &str) -> Result<usize, StorageError> {
        let count: i64 = self.conn()?.query_row(
            "SELECT COUNT(*) FROM responses WHERE channel = ?1",
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

fn cooldown_column(secs: u64) -> i64 {
    i64::try_from(secs).unwrap_or(i64::MAX)
}
