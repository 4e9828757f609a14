//! SQLite-backed call store.
//!
//! A single connection behind a mutex; every read-modify-write runs in one
//! transaction, which is what makes the lifecycle races deterministic
//! (second concurrent start observes Conflict, second close observes
//! InvalidState).

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, types::Type, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::CallStore;
use crate::core::{Error, Result};
use crate::domain::{CallOutcome, CallRecord};

/// Call store over a single SQLite database
pub struct SqliteCallStore {
    conn: Mutex<Connection>,
}

impl SqliteCallStore {
    /// Open (or create) the database at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            // Ignore failures here; the open below reports the real error
            let _ = std::fs::create_dir_all(parent);
        }
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// In-memory store, used by tests and ad-hoc tooling
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS call_records (
                id TEXT PRIMARY KEY,
                user_id INTEGER NOT NULL,
                started_at TEXT NOT NULL,
                ended_at TEXT NULL,
                outcome TEXT NOT NULL,
                snooze_count INTEGER NOT NULL DEFAULT 0,
                conversation_data TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_call_records_user
                ON call_records(user_id);
            CREATE INDEX IF NOT EXISTS idx_call_records_user_open
                ON call_records(user_id) WHERE ended_at IS NULL;
            "#,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn parse_timestamp(row_idx: usize, value: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(row_idx, Type::Text, Box::new(e)))
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<CallRecord> {
    let id: String = row.get(0)?;
    let id = Uuid::parse_str(&id)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;

    let started_at = parse_timestamp(2, row.get(2)?)?;
    let ended_at = match row.get::<_, Option<String>>(3)? {
        Some(value) => Some(parse_timestamp(3, value)?),
        None => None,
    };

    let outcome: String = row.get(4)?;
    let outcome = CallOutcome::parse(&outcome).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            Type::Text,
            format!("unknown outcome: {}", outcome).into(),
        )
    })?;

    let snooze_count: i64 = row.get(5)?;

    Ok(CallRecord {
        id,
        user_id: row.get(1)?,
        started_at,
        ended_at,
        outcome,
        snooze_count: snooze_count.clamp(0, 3) as u8,
        conversation_payload: row.get(6)?,
        created_at: parse_timestamp(7, row.get(7)?)?,
    })
}

const SELECT_COLUMNS: &str = "id, user_id, started_at, ended_at, outcome, snooze_count, \
     conversation_data, created_at";

impl CallStore for SqliteCallStore {
    fn insert_open_call(&self, record: &CallRecord) -> Result<()> {
        let mut conn = self.conn.lock().expect("store lock poisoned");
        let tx = conn.transaction()?;

        let open_calls: u32 = tx.query_row(
            "SELECT COUNT(*) FROM call_records WHERE user_id = ?1 AND ended_at IS NULL",
            params![record.user_id],
            |row| row.get(0),
        )?;
        if open_calls > 0 {
            return Err(Error::Conflict(format!(
                "user {} already has a call in progress",
                record.user_id
            )));
        }

        tx.execute(
            "INSERT INTO call_records \
             (id, user_id, started_at, ended_at, outcome, snooze_count, conversation_data, created_at) \
             VALUES (?1, ?2, ?3, NULL, ?4, ?5, ?6, ?7)",
            params![
                record.id.to_string(),
                record.user_id,
                record.started_at.to_rfc3339(),
                record.outcome.as_str(),
                record.snooze_count as i64,
                record.conversation_payload,
                record.created_at.to_rfc3339(),
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn fetch(&self, user_id: i64, call_id: Uuid) -> Result<Option<CallRecord>> {
        let conn = self.conn.lock().expect("store lock poisoned");
        let record = conn
            .query_row(
                &format!(
                    "SELECT {} FROM call_records WHERE id = ?1 AND user_id = ?2",
                    SELECT_COLUMNS
                ),
                params![call_id.to_string(), user_id],
                row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    fn update_conversation(&self, user_id: i64, call_id: Uuid, payload: &str) -> Result<()> {
        let mut conn = self.conn.lock().expect("store lock poisoned");
        let tx = conn.transaction()?;

        let ended_at: Option<String> = tx
            .query_row(
                "SELECT ended_at FROM call_records WHERE id = ?1 AND user_id = ?2",
                params![call_id.to_string(), user_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| Error::NotFound(format!("no call {} for user {}", call_id, user_id)))?;
        if ended_at.is_some() {
            return Err(Error::InvalidState(format!("call {} already ended", call_id)));
        }

        tx.execute(
            "UPDATE call_records SET conversation_data = ?1 \
             WHERE id = ?2 AND user_id = ?3 AND ended_at IS NULL",
            params![payload, call_id.to_string(), user_id],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn close_call(
        &self,
        user_id: i64,
        call_id: Uuid,
        ended_at: DateTime<Utc>,
        outcome: CallOutcome,
        snooze_count: u8,
    ) -> Result<()> {
        let mut conn = self.conn.lock().expect("store lock poisoned");
        let tx = conn.transaction()?;

        let current_end: Option<String> = tx
            .query_row(
                "SELECT ended_at FROM call_records WHERE id = ?1 AND user_id = ?2",
                params![call_id.to_string(), user_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| Error::NotFound(format!("no call {} for user {}", call_id, user_id)))?;
        if current_end.is_some() {
            return Err(Error::InvalidState(format!("call {} already ended", call_id)));
        }

        tx.execute(
            "UPDATE call_records SET ended_at = ?1, outcome = ?2, snooze_count = ?3 \
             WHERE id = ?4 AND user_id = ?5 AND ended_at IS NULL",
            params![
                ended_at.to_rfc3339(),
                outcome.as_str(),
                snooze_count as i64,
                call_id.to_string(),
                user_id,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn open_call_snooze(&self, user_id: i64) -> Result<Option<u8>> {
        let conn = self.conn.lock().expect("store lock poisoned");
        let snooze: Option<i64> = conn
            .query_row(
                "SELECT snooze_count FROM call_records \
                 WHERE user_id = ?1 AND ended_at IS NULL",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(snooze.map(|s| s.clamp(0, 3) as u8))
    }

    fn open_call_count(&self, user_id: i64) -> Result<u32> {
        let conn = self.conn.lock().expect("store lock poisoned");
        let count: u32 = conn.query_row(
            "SELECT COUNT(*) FROM call_records WHERE user_id = ?1 AND ended_at IS NULL",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
