//! Storage layer for the day planner.
//!
//! Provides persistence for calendar events using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! This means a `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization.
//!
//! # Schema
//!
//! A single `events` table. `start_time` and `end_time` are nullable: all-day
//! events may be stored without a date.
//!
//! ## Timestamp Format
//!
//! Event instants are wall-clock values with no timezone and are stored as TEXT
//! in `YYYY-MM-DDTHH:MM:SS` form, so lexicographic ordering matches
//! chronological ordering and range queries can compare strings directly.
//!
//! Audit columns (`created_at`, `updated_at`) are UTC instants stored as
//! RFC 3339 with millisecond precision (e.g., `2024-01-15T10:30:00.000Z`).

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use dp_core::{
    CalendarEvent, Color, EventDraft, EventId, EventPatch, ValidationError, detect_overlaps,
};
use rusqlite::{Connection, OptionalExtension, Params, Row, params};
use thiserror::Error;
use uuid::Uuid;

/// Storage format for event instants. Fractional seconds are dropped.
const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp for event {event_id}: {timestamp}")]
    TimestampParse {
        event_id: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored row does not describe a valid event.
    #[error("invalid event row {event_id}: {message}")]
    InvalidRow { event_id: String, message: String },
    /// The event being written failed validation.
    #[error("invalid event: {0}")]
    Validation(#[from] ValidationError),
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// Aggregate counts shown by `dp status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSummary {
    pub total_events: usize,
    pub all_day_events: usize,
    pub first_start: Option<NaiveDateTime>,
    pub last_start: Option<NaiveDateTime>,
}

/// An `events` row as stored, before parsing.
struct EventRow {
    id: String,
    title: String,
    description: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
    is_all_day: bool,
    color: String,
    created_at: String,
    updated_at: String,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        tracing::debug!(path = %path.display(), "opened event store");
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
            -- start_time/end_time: 'YYYY-MM-DDTHH:MM:SS', NULL for undated all-day events
            -- is_all_day: 0/1
            CREATE TABLE IF NOT EXISTS events (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT,
                start_time TEXT,
                end_time TEXT,
                is_all_day INTEGER NOT NULL DEFAULT 0,
                color TEXT NOT NULL DEFAULT '#1976d2',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_events_start_time ON events(start_time);
            CREATE INDEX IF NOT EXISTS idx_events_end_time ON events(end_time);
            CREATE INDEX IF NOT EXISTS idx_events_is_all_day ON events(is_all_day);
            CREATE INDEX IF NOT EXISTS idx_events_created_at ON events(created_at);
            ",
        )?;
        Ok(())
    }

    /// Validates and stores a new event, returning it with its generated ID.
    ///
    /// Instants are stored at whole-second precision; fractional seconds are
    /// truncated, and the returned event is the stored row.
    pub fn create_event(&mut self, draft: &EventDraft) -> Result<CalendarEvent, DbError> {
        self.create_event_at(draft, Utc::now())
    }

    fn create_event_at(
        &mut self,
        draft: &EventDraft,
        now: DateTime<Utc>,
    ) -> Result<CalendarEvent, DbError> {
        draft.validate()?;
        let id = EventId::new(Uuid::new_v4().to_string())?;
        let now = format_timestamp(now);
        self.conn.execute(
            "
            INSERT INTO events
            (id, title, description, start_time, end_time, is_all_day, color, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
            params![
                id.as_str(),
                draft.title,
                draft.description,
                draft.start_time.map(format_naive),
                draft.end_time.map(format_naive),
                draft.is_all_day,
                draft.color.as_str(),
                now,
                now,
            ],
        )?;
        tracing::debug!(event_id = %id, title = %draft.title, "created event");

        self.get_event(&id)?.ok_or_else(|| DbError::InvalidRow {
            event_id: id.to_string(),
            message: "event missing after insert".to_string(),
        })
    }

    /// Fetches a single event by ID.
    pub fn get_event(&self, id: &EventId) -> Result<Option<CalendarEvent>, DbError> {
        let row = self
            .conn
            .query_row(
                "
                SELECT id, title, description, start_time, end_time, is_all_day, color, created_at, updated_at
                FROM events
                WHERE id = ?
                ",
                [id.as_str()],
                read_row,
            )
            .optional()?;
        row.map(EventRow::into_event).transpose()
    }

    /// Lists all events ordered by start time then creation time.
    ///
    /// Undated all-day events sort first.
    pub fn list_events(&self) -> Result<Vec<CalendarEvent>, DbError> {
        self.query_events(
            "
            SELECT id, title, description, start_time, end_time, is_all_day, color, created_at, updated_at
            FROM events
            ORDER BY start_time ASC, created_at ASC
            ",
            [],
        )
    }

    /// Lists events touching a range, inclusive at both ends.
    ///
    /// An event matches if it is an undated all-day event, starts in the range,
    /// ends in the range, or spans the whole range.
    pub fn list_events_in_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<CalendarEvent>, DbError> {
        if end < start {
            return Ok(Vec::new());
        }
        let start = format_naive(start);
        let end = format_naive(end);
        self.query_events(
            "
            SELECT id, title, description, start_time, end_time, is_all_day, color, created_at, updated_at
            FROM events
            WHERE
                (start_time IS NULL AND is_all_day = 1) OR
                (start_time >= ?1 AND start_time <= ?2) OR
                (end_time >= ?1 AND end_time <= ?2) OR
                (start_time <= ?1 AND end_time >= ?2)
            ORDER BY start_time ASC, created_at ASC
            ",
            params![start, end],
        )
    }

    /// Lists events touching a single calendar date.
    pub fn events_for_date(&self, date: NaiveDate) -> Result<Vec<CalendarEvent>, DbError> {
        let start = date.and_time(NaiveTime::MIN);
        let end = date.and_hms_opt(23, 59, 59).unwrap_or(start);
        self.list_events_in_range(start, end)
    }

    /// Applies a partial update.
    ///
    /// Returns `Ok(None)` if no event has this ID. The merged event is validated
    /// before anything is written. As with [`Database::create_event`],
    /// fractional seconds are truncated.
    pub fn update_event(
        &mut self,
        id: &EventId,
        patch: &EventPatch,
    ) -> Result<Option<CalendarEvent>, DbError> {
        self.update_event_at(id, patch, Utc::now())
    }

    fn update_event_at(
        &mut self,
        id: &EventId,
        patch: &EventPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<CalendarEvent>, DbError> {
        let Some(existing) = self.get_event(id)? else {
            return Ok(None);
        };
        let updated = patch.apply_to(&existing)?;

        self.conn.execute(
            "
            UPDATE events
            SET title = ?, description = ?, start_time = ?, end_time = ?,
                is_all_day = ?, color = ?, updated_at = ?
            WHERE id = ?
            ",
            params![
                updated.title,
                updated.description,
                updated.start_time.map(format_naive),
                updated.end_time.map(format_naive),
                updated.is_all_day,
                updated.color.as_str(),
                format_timestamp(now),
                id.as_str(),
            ],
        )?;
        tracing::debug!(event_id = %id, "updated event");

        self.get_event(id)
    }

    /// Deletes an event. Returns false if it did not exist.
    pub fn delete_event(&mut self, id: &EventId) -> Result<bool, DbError> {
        let changed = self
            .conn
            .execute("DELETE FROM events WHERE id = ?", [id.as_str()])?;
        tracing::debug!(event_id = %id, deleted = changed > 0, "delete event");
        Ok(changed > 0)
    }

    /// Finds stored events that conflict with `event` on its start date.
    ///
    /// `exclude` names an additional event to skip, used when re-checking an
    /// edited event against its own stored copy. Events without a start time
    /// have no conflicts.
    pub fn find_conflicts(
        &self,
        event: &CalendarEvent,
        exclude: Option<&EventId>,
    ) -> Result<Vec<CalendarEvent>, DbError> {
        let Some(start) = event.start_time else {
            return Ok(Vec::new());
        };
        let same_day = self.events_for_date(start.date())?;
        let conflicts: Vec<CalendarEvent> = detect_overlaps(event, &same_day, exclude)
            .into_iter()
            .cloned()
            .collect();
        tracing::debug!(event_id = %event.id, conflicts = conflicts.len(), "checked conflicts");
        Ok(conflicts)
    }

    /// Summarizes the store contents.
    pub fn summary(&self) -> Result<StoreSummary, DbError> {
        let (total, all_day, first, last): (i64, i64, Option<String>, Option<String>) =
            self.conn.query_row(
                "
                SELECT COUNT(*), COALESCE(SUM(is_all_day), 0), MIN(start_time), MAX(start_time)
                FROM events
                ",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )?;
        Ok(StoreSummary {
            total_events: usize::try_from(total).unwrap_or_default(),
            all_day_events: usize::try_from(all_day).unwrap_or_default(),
            first_start: first
                .map(|s| parse_naive(&s, "summary"))
                .transpose()?,
            last_start: last.map(|s| parse_naive(&s, "summary")).transpose()?,
        })
    }

    fn query_events<P: Params>(&self, sql: &str, params: P) -> Result<Vec<CalendarEvent>, DbError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, read_row)?;
        let mut events = Vec::new();
        for row in rows {
            events.push(row?.into_event()?);
        }
        Ok(events)
    }
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<EventRow> {
    Ok(EventRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        start_time: row.get(3)?,
        end_time: row.get(4)?,
        is_all_day: row.get(5)?,
        color: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

impl EventRow {
    fn into_event(self) -> Result<CalendarEvent, DbError> {
        let invalid = |err: ValidationError| DbError::InvalidRow {
            event_id: self.id.clone(),
            message: err.to_string(),
        };
        let id = EventId::new(self.id.clone()).map_err(invalid)?;
        let color = Color::new(self.color.clone()).map_err(invalid)?;
        let start_time = self
            .start_time
            .as_deref()
            .map(|s| parse_naive(s, &self.id))
            .transpose()?;
        let end_time = self
            .end_time
            .as_deref()
            .map(|s| parse_naive(s, &self.id))
            .transpose()?;
        let created_at = parse_timestamp(&self.created_at, &self.id)?;
        let updated_at = parse_timestamp(&self.updated_at, &self.id)?;

        Ok(CalendarEvent {
            id,
            title: self.title,
            description: self.description,
            start_time,
            end_time,
            is_all_day: self.is_all_day,
            color,
            created_at,
            updated_at,
        })
    }
}

fn format_naive(value: NaiveDateTime) -> String {
    value.format(NAIVE_FORMAT).to_string()
}

fn parse_naive(value: &str, event_id: &str) -> Result<NaiveDateTime, DbError> {
    NaiveDateTime::parse_from_str(value, NAIVE_FORMAT).map_err(|source| DbError::TimestampParse {
        event_id: event_id.to_string(),
        timestamp: value.to_string(),
        source,
    })
}

fn parse_timestamp(timestamp: &str, event_id: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            event_id: event_id.to_string(),
            timestamp: timestamp.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
