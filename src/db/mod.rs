//! Database module - SQLite key-value storage
//!
//! The public get/set helpers never return errors: failures are logged and
//! the caller gets the default (reads) or `false` (writes).

pub mod keys;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

/// Database wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).with_context(|| format!("open database {}", path))?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_kv_updated_at ON kv(updated_at)",
            [],
        )?;

        Ok(())
    }

    fn read_raw(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn write_raw(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Raw string value, or `default` when missing or unreadable
    pub fn get(&self, key: &str, default: &str) -> String {
        match self.read_raw(key) {
            Ok(Some(v)) => v,
            Ok(None) => default.to_string(),
            Err(e) => {
                warn!("storage read failed for {}: {}", key, e);
                default.to_string()
            }
        }
    }

    pub fn set(&self, key: &str, value: &str) -> bool {
        match self.write_raw(key, value) {
            Ok(()) => true,
            Err(e) => {
                warn!("storage write failed for {}: {}", key, e);
                false
            }
        }
    }

    /// Decoded JSON value; missing keys and undecodable blobs give `default`
    pub fn get_json<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.read_raw(key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(v) => v,
                Err(e) => {
                    warn!("discarding malformed JSON under {}: {}", key, e);
                    default
                }
            },
            Ok(None) => default,
            Err(e) => {
                warn!("storage read failed for {}: {}", key, e);
                default
            }
        }
    }

    /// Like `get_json` but distinguishes a missing key
    pub fn get_json_opt<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_json::<Option<T>>(key, None)
    }

    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> bool {
        match serde_json::to_string(value) {
            Ok(raw) => self.set(key, &raw),
            Err(e) => {
                warn!("failed to encode value for {}: {}", key, e);
                false
            }
        }
    }

    pub fn remove(&self, key: &str) -> bool {
        match self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key]) {
            Ok(_) => true,
            Err(e) => {
                warn!("storage delete failed for {}: {}", key, e);
                false
            }
        }
    }

    /// Read-modify-write of one JSON record inside a single transaction.
    ///
    /// Returns the stored value, or `None` if the update could not be committed.
    pub fn update_json<T, F>(&self, key: &str, default: T, f: F) -> Option<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut T),
    {
        match self.try_update_json(key, default, f) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("storage update failed for {}: {}", key, e);
                None
            }
        }
    }

    fn try_update_json<T, F>(&self, key: &str, default: T, f: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut T),
    {
        let tx = self.conn.unchecked_transaction()?;

        let mut value = match self.read_raw(key)? {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("discarding malformed JSON under {}: {}", key, e);
                default
            }),
            None => default,
        };

        f(&mut value);
        let raw = serde_json::to_string(&value)?;
        self.write_raw(key, &raw)?;
        tx.commit()?;

        debug!("updated {}", key);
        Ok(value)
    }

    /// All keys starting with `prefix`, sorted
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let result = (|| -> Result<Vec<String>> {
            let mut stmt = self
                .conn
                .prepare("SELECT key FROM kv WHERE substr(key, 1, ?2) = ?1 ORDER BY key")?;
            let keys = stmt
                .query_map(params![prefix, prefix.chars().count() as i64], |row| row.get(0))?
                .collect::<Result<Vec<String>, _>>()?;
            Ok(keys)
        })();

        result.unwrap_or_else(|e| {
            warn!("key scan failed for {}: {}", prefix, e);
            Vec::new()
        })
    }

    /// Reject every later write, so tests can see how failures surface
    #[cfg(test)]
    pub(crate) fn make_read_only(&self) {
        self.conn
            .pragma_update(None, "query_only", true)
            .expect("set query_only");
    }
}
