//! SQLite storage backend (feature `sqlite`)

use crate::error::Result;
use crate::storage::KeyValueStorage;
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::Path;

const SQL_GET: &str = "SELECT value FROM kv WHERE key = ?1";
const SQL_UPSERT: &str =
    "INSERT INTO kv (key, value) VALUES (?1, ?2) ON CONFLICT(key) DO UPDATE SET value = excluded.value";

/// Key-value storage in a single SQLite table
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Open (or create) the database at `db_path`
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }
        Self::with_connection(Connection::open(db_path)?)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Self { conn })
    }
}

impl KeyValueStorage for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(SQL_GET, params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(SQL_UPSERT, params![key, value])?;
        Ok(())
    }

    /// All entries are written in one transaction
    fn set_many(&mut self, entries: &[(&str, String)]) -> Result<()> {
        let tx = self.conn.transaction()?;
        for (key, value) in entries {
            tx.execute(SQL_UPSERT, params![key, value])?;
        }
        tx.commit()?;
        Ok(())
    }
}
