//! Storage layer for the BR interval tracker.
//!
//! Implements [`br_core::EventStore`] on top of `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A tracker session owns its `Database`; there is one writer per owner.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in ISO 8601 format with millisecond precision
//! (e.g., `2024-01-15T10:30:00.000Z`). This format ensures:
//! - Lexicographic ordering matches chronological ordering
//! - Human-readable values in the database
//! - Timezone-aware (always UTC)

use std::path::Path;

use br_core::{Category, Event, EventId, EventStore, OwnerId, StoreError, StoreOp};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, params};
use thiserror::Error;
use uuid::Uuid;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse an entry timestamp.
    #[error("invalid timestamp for entry {entry_id}: {timestamp}")]
    TimestampParse {
        entry_id: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored row does not map onto an entry.
    #[error("invalid entry data for {entry_id}: {message}")]
    InvalidEntryData { entry_id: String, message: String },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// A raw entry row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord {
    pub id: String,
    pub user_id: String,
    pub date: String,
    pub kind: String,
    pub created_at: String,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- br_entries: one row per logged entry
            -- date: ISO 8601 UTC instant (e.g., '2024-01-15T10:30:00.000Z')
            -- type: category label (e.g., 'Départ', 'TikTok')
            CREATE TABLE IF NOT EXISTS br_entries (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                date TEXT NOT NULL,
                type TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_br_entries_user_date ON br_entries(user_id, date);
            ",
        )?;
        Ok(())
    }

    /// Inserts a new entry and returns its row.
    pub fn insert_entry(
        &mut self,
        user_id: &str,
        date: DateTime<Utc>,
        kind: &str,
    ) -> Result<EntryRecord, DbError> {
        self.insert_entry_at(user_id, date, kind, Utc::now())
    }

    fn insert_entry_at(
        &mut self,
        user_id: &str,
        date: DateTime<Utc>,
        kind: &str,
        now: DateTime<Utc>,
    ) -> Result<EntryRecord, DbError> {
        let record = EntryRecord {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            date: format_timestamp(date),
            kind: kind.to_string(),
            created_at: format_timestamp(now),
        };
        self.conn.execute(
            "INSERT INTO br_entries (id, user_id, date, type, created_at) VALUES (?, ?, ?, ?, ?)",
            params![
                record.id,
                record.user_id,
                record.date,
                record.kind,
                record.created_at,
            ],
        )?;
        Ok(record)
    }

    /// Lists one user's entries, most recent first.
    pub fn list_entries(&self, user_id: &str) -> Result<Vec<EntryRecord>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, user_id, date, type, created_at
            FROM br_entries
            WHERE user_id = ?
            ORDER BY date DESC, id DESC
            ",
        )?;
        let rows = stmt.query_map([user_id], |row| {
            Ok(EntryRecord {
                id: row.get(0)?,
                user_id: row.get(1)?,
                date: row.get(2)?,
                kind: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    /// Deletes one of a user's entries. Returns the number of rows removed.
    pub fn delete_entry(&mut self, user_id: &str, id: &str) -> Result<usize, DbError> {
        let deleted = self.conn.execute(
            "DELETE FROM br_entries WHERE id = ? AND user_id = ?",
            params![id, user_id],
        )?;
        Ok(deleted)
    }
}

impl EventStore for Database {
    fn list(&self, owner: &OwnerId) -> Result<Vec<Event>, StoreError> {
        self.list_entries(owner.as_str())
            .and_then(|records| records.into_iter().map(record_to_event).collect())
            .map_err(|err| StoreError::unavailable(StoreOp::List, err))
    }

    fn append(
        &mut self,
        owner: &OwnerId,
        timestamp: DateTime<Utc>,
        category: Category,
    ) -> Result<Event, StoreError> {
        self.insert_entry(owner.as_str(), timestamp, category.as_str())
            .and_then(record_to_event)
            .map_err(|err| StoreError::unavailable(StoreOp::Append, err))
    }

    fn delete(&mut self, owner: &OwnerId, id: &EventId) -> Result<(), StoreError> {
        let deleted = self
            .delete_entry(owner.as_str(), id.as_str())
            .map_err(|err| StoreError::unavailable(StoreOp::Delete, err))?;
        if deleted == 0 {
            tracing::debug!(%id, "no entry matched delete");
        }
        Ok(())
    }
}

fn record_to_event(record: EntryRecord) -> Result<Event, DbError> {
    let invalid = |message: String| DbError::InvalidEntryData {
        entry_id: record.id.clone(),
        message,
    };
    let timestamp = parse_timestamp(&record.date, &record.id)?;
    let category = record
        .kind
        .parse::<Category>()
        .map_err(|err| invalid(err.to_string()))?;
    let id = EventId::new(record.id.clone()).map_err(|err| invalid(err.to_string()))?;
    let owner = OwnerId::new(record.user_id.clone()).map_err(|err| invalid(err.to_string()))?;
    Ok(Event {
        id,
        owner,
        timestamp,
        category,
    })
}

fn parse_timestamp(timestamp: &str, entry_id: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            entry_id: entry_id.to_string(),
            timestamp: timestamp.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
