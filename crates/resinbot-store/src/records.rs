//! SQLite-backed record store — one row per user, last write wins.
//!
//! Rows carry an expiry stamp (when the record has been past the cap for
//! longer than the overflow grace window) and expired rows read as absent.
//! The thread id is stored alongside the record so the startup recovery pass
//! knows where a re-armed reminder should be delivered.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use resinbot_core::error::{ResinBotError, Result};
use resinbot_core::regen::ResinRecord;

/// A stored row: the record plus delivery and expiry bookkeeping.
#[derive(Debug, Clone)]
pub struct StoredRecord {
    pub user_key: String,
    pub thread_id: String,
    pub record: ResinRecord,
    pub expires_at: DateTime<Utc>,
}

/// Per-user record store.
pub struct RecordStore {
    conn: Mutex<Connection>,
}

impl RecordStore {
    /// Open or create the store at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(store_err)?;
        Self::init(conn)
    }

    /// In-memory store, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(store_err)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS resin_records (
                user_key TEXT PRIMARY KEY,
                thread_id TEXT NOT NULL,
                value INTEGER NOT NULL,
                recorded_at TEXT NOT NULL,
                expires_at TEXT NOT NULL
            );",
        )
        .map_err(store_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Fetch a user's record. Expired rows read as absent.
    pub fn get(&self, user_key: &str) -> Result<Option<ResinRecord>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT value, recorded_at, expires_at FROM resin_records WHERE user_key = ?1",
                params![user_key],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()
            .map_err(store_err)?;

        let Some((value, recorded_at, expires_at)) = row else {
            return Ok(None);
        };
        if parse_timestamp(&expires_at)? <= Utc::now() {
            return Ok(None);
        }
        Ok(Some(ResinRecord::new(
            value as u32,
            parse_timestamp(&recorded_at)?,
        )))
    }

    /// Insert or overwrite a user's record. Concurrent writers for the same
    /// key resolve as last write wins.
    pub fn put(
        &self,
        user_key: &str,
        thread_id: &str,
        record: &ResinRecord,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO resin_records (user_key, thread_id, value, recorded_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user_key,
                thread_id,
                record.value as i64,
                record.recorded_at.to_rfc3339(),
                expires_at.to_rfc3339(),
            ],
        )
        .map_err(store_err)?;
        tracing::debug!("💾 stored record for {user_key}: {} resin", record.value);
        Ok(())
    }

    /// All unexpired rows — the startup recovery pass walks these.
    pub fn active_records(&self) -> Result<Vec<StoredRecord>> {
        let now = Utc::now();
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT user_key, thread_id, value, recorded_at, expires_at FROM resin_records",
            )
            .map_err(store_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })
            .map_err(store_err)?;

        let mut records = Vec::new();
        for row in rows {
            let (user_key, thread_id, value, recorded_at, expires_at) = row.map_err(store_err)?;
            let expires_at = parse_timestamp(&expires_at)?;
            if expires_at <= now {
                continue;
            }
            records.push(StoredRecord {
                user_key,
                thread_id,
                record: ResinRecord::new(value as u32, parse_timestamp(&recorded_at)?),
                expires_at,
            });
        }
        Ok(records)
    }

    /// Drop expired rows. Returns how many were removed.
    pub fn purge_expired(&self) -> Result<usize> {
        let conn = self.lock()?;
        let purged = conn
            .execute(
                "DELETE FROM resin_records WHERE expires_at <= ?1",
                params![Utc::now().to_rfc3339()],
            )
            .map_err(store_err)?;
        if purged > 0 {
            tracing::debug!("purged {purged} expired record(s)");
        }
        Ok(purged)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ResinBotError::Store(format!("store lock poisoned: {e}")))
    }
}

fn store_err(e: rusqlite::Error) -> ResinBotError {
    ResinBotError::Store(e.to_string())
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| ResinBotError::Store(format!("bad timestamp '{s}': {e}")))
}
