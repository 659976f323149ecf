//! SQLite-backed sync store

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use rusqlite_migration::{M, Migrations};

use super::traits::{SyncStore, TimeRange};
use super::{parse_stamp, stamp_text};
use crate::models::{
    Calendar, CalendarEvent, Contact, Message, MessageId, ResourceDomain, SyncWatermark, Thread,
    ThreadId,
};
use crate::query::MailQuery;

/// Database migrations
///
/// Each migration is applied in order. The user_version pragma tracks which
/// migrations have been applied.
fn migrations() -> Migrations<'static> {
    Migrations::new(vec![
        // Migration 1: Initial schema
        M::up(
            r#"
            CREATE TABLE gmail_threads (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                snippet TEXT NOT NULL DEFAULT ''
            );

            CREATE INDEX idx_gmail_threads_user_id ON gmail_threads(user_id);

            CREATE TABLE gmail_messages (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                thread_id TEXT NOT NULL,
                label_ids TEXT NOT NULL DEFAULT '[]',  -- JSON array
                snippet TEXT NOT NULL DEFAULT '',
                internal_date INTEGER NOT NULL,
                payload TEXT NOT NULL DEFAULT '{}',
                history_id INTEGER
            );

            CREATE INDEX idx_gmail_messages_user_date
                ON gmail_messages(user_id, internal_date DESC);
            CREATE INDEX idx_gmail_messages_user_history
                ON gmail_messages(user_id, history_id);

            -- One monotonic counter per user
            CREATE TABLE history_counters (
                user_id TEXT PRIMARY KEY,
                history_id INTEGER NOT NULL
            );

            CREATE TABLE calendars (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                summary TEXT NOT NULL DEFAULT ''
            );

            CREATE TABLE calendar_events (
                id TEXT PRIMARY KEY,
                calendar_id TEXT NOT NULL,
                summary TEXT NOT NULL DEFAULT '',
                description TEXT NOT NULL DEFAULT '',
                start_time TEXT NOT NULL DEFAULT '',
                end_time TEXT NOT NULL DEFAULT '',
                attendees TEXT NOT NULL DEFAULT '[]',   -- JSON array
                location TEXT,
                organizer TEXT,                         -- JSON object
                recurrence TEXT NOT NULL DEFAULT '[]',  -- JSON array
                updated_at TEXT
            );

            CREATE INDEX idx_calendar_events_start
                ON calendar_events(calendar_id, start_time);
            CREATE INDEX idx_calendar_events_updated
                ON calendar_events(calendar_id, updated_at);

            CREATE TABLE people (
                resource_name TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                data TEXT NOT NULL DEFAULT '{}',
                updated_at TEXT
            );

            CREATE INDEX idx_people_user_id ON people(user_id, resource_name);

            -- Most recently issued sync token per (domain, owner)
            CREATE TABLE sync_tokens (
                resource_type TEXT NOT NULL,
                owner_key TEXT NOT NULL,
                token TEXT NOT NULL,
                issued_at TEXT NOT NULL,
                PRIMARY KEY (resource_type, owner_key)
            );
            "#,
        ),
    ])
}

const MESSAGE_COLUMNS: &str =
    "id, user_id, thread_id, label_ids, snippet, internal_date, payload, history_id";

const EVENT_COLUMNS: &str = "id, calendar_id, summary, description, start_time, end_time,
     attendees, location, organizer, recurrence, updated_at";

const CONTACT_COLUMNS: &str = "resource_name, user_id, data, updated_at";

/// Stamp substituted for rows that were never stamped
const EPOCH_STAMP: &str = "1970-01-01T00:00:00Z";

/// SQLite-based sync storage
///
/// All access goes through one connection behind a mutex, so every statement
/// observes the effects of the previous one.
pub struct SqliteSyncStore {
    conn: Mutex<Connection>,
}

impl SqliteSyncStore {
    /// Open (creating if needed) a database file and bring its schema up to date
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(db_path.as_ref())
            .with_context(|| format!("Failed to open database at {:?}", db_path.as_ref()))?;

        // WAL lets readers proceed while a write is in flight
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            "#,
        )?;

        Self::from_connection(conn)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        migrations()
            .to_latest(&mut conn)
            .context("Failed to run database migrations")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database connection mutex poisoned"))
    }
}

fn sql_offset(offset: u64) -> i64 {
    i64::try_from(offset).unwrap_or(i64::MAX)
}

fn message_from_row(row: &Row) -> rusqlite::Result<Message> {
    let labels_json: String = row.get(3)?;
    let history_id: Option<i64> = row.get(7)?;
    Ok(Message {
        id: MessageId::new(row.get::<_, String>(0)?),
        user_id: row.get(1)?,
        thread_id: ThreadId::new(row.get::<_, String>(2)?),
        label_ids: serde_json::from_str(&labels_json).unwrap_or_default(),
        snippet: row.get(4)?,
        internal_date: row.get(5)?,
        payload: row.get(6)?,
        history_id: history_id.map(|h| h.max(0) as u64),
    })
}

fn event_from_row(row: &Row) -> rusqlite::Result<CalendarEvent> {
    let attendees: String = row.get(6)?;
    let organizer: Option<String> = row.get(8)?;
    let recurrence: String = row.get(9)?;
    let updated_at: Option<String> = row.get(10)?;
    Ok(CalendarEvent {
        id: row.get(0)?,
        calendar_id: row.get(1)?,
        summary: row.get(2)?,
        description: row.get(3)?,
        start: row.get(4)?,
        end: row.get(5)?,
        attendees: serde_json::from_str(&attendees).unwrap_or_default(),
        location: row.get(7)?,
        organizer: organizer.and_then(|o| serde_json::from_str(&o).ok()),
        recurrence: serde_json::from_str(&recurrence).unwrap_or_default(),
        updated: updated_at.as_deref().and_then(parse_stamp),
    })
}

fn contact_from_row(row: &Row) -> rusqlite::Result<Contact> {
    let data: String = row.get(2)?;
    let updated_at: Option<String> = row.get(3)?;
    Ok(Contact {
        resource_name: row.get(0)?,
        user_id: row.get(1)?,
        data: serde_json::from_str(&data).unwrap_or(serde_json::Value::Null),
        updated: updated_at.as_deref().and_then(parse_stamp),
    })
}

fn watermark_from_row(row: &Row) -> rusqlite::Result<Option<SyncWatermark>> {
    let resource_type: String = row.get(0)?;
    let issued_at: String = row.get(3)?;
    Ok(ResourceDomain::parse(&resource_type).map(|domain| SyncWatermark {
        domain,
        owner_key: row.get(1).unwrap_or_default(),
        token: row.get(2).unwrap_or_default(),
        issued_at: parse_stamp(&issued_at).unwrap_or(DateTime::UNIX_EPOCH),
    }))
}

/// Escape `%`, `_` and the escape character itself for a LIKE pattern
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Parameters shared by event inserts and updates, in column order
fn event_values(event: &CalendarEvent) -> Result<Vec<Value>> {
    let organizer = event
        .organizer
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    Ok(vec![
        Value::Text(event.id.clone()),
        Value::Text(event.calendar_id.clone()),
        Value::Text(event.summary.clone()),
        Value::Text(event.description.clone()),
        Value::Text(event.start.clone()),
        Value::Text(event.end.clone()),
        Value::Text(serde_json::to_string(&event.attendees)?),
        event.location.clone().map_or(Value::Null, Value::Text),
        organizer.map_or(Value::Null, Value::Text),
        Value::Text(serde_json::to_string(&event.recurrence)?),
        event
            .updated
            .map(stamp_text)
            .map_or(Value::Null, Value::Text),
    ])
}

impl SyncStore for SqliteSyncStore {
    fn upsert_thread(&self, thread: Thread) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO gmail_threads (id, user_id, snippet) VALUES (?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                user_id = excluded.user_id,
                snippet = excluded.snippet",
            params![thread.id.as_str(), thread.user_id, thread.snippet],
        )?;
        Ok(())
    }

    fn upsert_message(&self, message: Message) -> Result<()> {
        let labels_json = serde_json::to_string(&message.label_ids)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO gmail_messages
             (id, user_id, thread_id, label_ids, snippet, internal_date, payload, history_id)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                user_id = excluded.user_id,
                thread_id = excluded.thread_id,
                label_ids = excluded.label_ids,
                snippet = excluded.snippet,
                internal_date = excluded.internal_date,
                payload = excluded.payload,
                history_id = excluded.history_id",
            params![
                message.id.as_str(),
                message.user_id,
                message.thread_id.as_str(),
                labels_json,
                message.snippet,
                message.internal_date,
                message.payload,
                message.history_id.map(|h| h as i64),
            ],
        )?;
        Ok(())
    }

    fn get_message(&self, user_id: &str, id: &MessageId) -> Result<Option<Message>> {
        let conn = self.conn()?;
        let message = conn
            .query_row(
                &format!("SELECT {MESSAGE_COLUMNS} FROM gmail_messages WHERE user_id = ? AND id = ?"),
                params![user_id, id.as_str()],
                message_from_row,
            )
            .optional()?;
        Ok(message)
    }

    fn delete_message(&self, user_id: &str, id: &MessageId) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM gmail_messages WHERE user_id = ? AND id = ?",
            params![user_id, id.as_str()],
        )?;
        Ok(deleted > 0)
    }

    fn list_messages(
        &self,
        user_id: &str,
        query: &MailQuery,
        limit: usize,
        offset: u64,
    ) -> Result<Vec<Message>> {
        let mut sql = format!("SELECT {MESSAGE_COLUMNS} FROM gmail_messages WHERE user_id = ?");
        let mut args = vec![Value::Text(user_id.to_string())];

        for label in &query.labels {
            // label_ids is a JSON array of strings; match one element exactly
            sql.push_str(" AND EXISTS (SELECT 1 FROM json_each(label_ids) WHERE value = ?)");
            args.push(Value::Text(label.clone()));
        }
        if let Some(after) = query.received_after {
            sql.push_str(" AND internal_date >= ?");
            args.push(Value::Integer(after));
        }

        sql.push_str(" ORDER BY internal_date DESC, id ASC LIMIT ? OFFSET ?");
        args.push(Value::Integer(limit as i64));
        args.push(Value::Integer(sql_offset(offset)));

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let messages = stmt
            .query_map(params_from_iter(args.iter()), message_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(messages)
    }

    fn list_messages_from_history(
        &self,
        user_id: &str,
        start_history_id: u64,
        limit: usize,
        offset: u64,
    ) -> Result<Vec<Message>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM gmail_messages
             WHERE user_id = ? AND COALESCE(history_id, 0) >= ?
             ORDER BY COALESCE(history_id, 0) ASC, id ASC
             LIMIT ? OFFSET ?"
        ))?;
        let messages = stmt
            .query_map(
                params![
                    user_id,
                    sql_offset(start_history_id),
                    limit as i64,
                    sql_offset(offset)
                ],
                message_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(messages)
    }

    fn count_messages(&self, user_id: &str) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM gmail_messages WHERE user_id = ?",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn count_threads(&self, user_id: &str) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM gmail_threads WHERE user_id = ?",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn advance_history(&self, user_id: &str) -> Result<u64> {
        let conn = self.conn()?;
        // Single statement, so concurrent writers cannot lose an increment
        let value: i64 = conn.query_row(
            "INSERT INTO history_counters (user_id, history_id) VALUES (?, 1)
             ON CONFLICT(user_id) DO UPDATE SET history_id = history_id + 1
             RETURNING history_id",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(value.max(0) as u64)
    }

    fn current_history(&self, user_id: &str) -> Result<Option<u64>> {
        let conn = self.conn()?;
        let value: Option<i64> = conn
            .query_row(
                "SELECT history_id FROM history_counters WHERE user_id = ?",
                [user_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value.map(|v| v.max(0) as u64))
    }

    fn upsert_calendar(&self, calendar: Calendar) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO calendars (id, user_id, summary) VALUES (?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                user_id = excluded.user_id,
                summary = excluded.summary",
            params![calendar.id, calendar.user_id, calendar.summary],
        )?;
        Ok(())
    }

    fn upsert_event(&self, event: CalendarEvent) -> Result<()> {
        let values = event_values(&event)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO calendar_events
             (id, calendar_id, summary, description, start_time, end_time,
              attendees, location, organizer, recurrence, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                calendar_id = excluded.calendar_id,
                summary = excluded.summary,
                description = excluded.description,
                start_time = excluded.start_time,
                end_time = excluded.end_time,
                attendees = excluded.attendees,
                location = excluded.location,
                organizer = excluded.organizer,
                recurrence = excluded.recurrence,
                updated_at = excluded.updated_at",
            params_from_iter(values.iter()),
        )
        .with_context(|| format!("Failed to store event {}", event.id))?;
        Ok(())
    }

    fn update_event(&self, event: &CalendarEvent) -> Result<bool> {
        let mut values = event_values(event)?;
        // Rotate id and calendar_id to the WHERE clause
        let id = values.remove(0);
        let calendar_id = values.remove(0);
        values.push(calendar_id);
        values.push(id);

        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE calendar_events SET
                summary = ?, description = ?, start_time = ?, end_time = ?,
                attendees = ?, location = ?, organizer = ?, recurrence = ?, updated_at = ?
             WHERE calendar_id = ? AND id = ?",
            params_from_iter(values.iter()),
        )?;
        Ok(updated > 0)
    }

    fn get_event(&self, calendar_id: &str, event_id: &str) -> Result<Option<CalendarEvent>> {
        let conn = self.conn()?;
        let event = conn
            .query_row(
                &format!(
                    "SELECT {EVENT_COLUMNS} FROM calendar_events WHERE calendar_id = ? AND id = ?"
                ),
                params![calendar_id, event_id],
                event_from_row,
            )
            .optional()?;
        Ok(event)
    }

    fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM calendar_events WHERE calendar_id = ? AND id = ?",
            params![calendar_id, event_id],
        )?;
        Ok(deleted > 0)
    }

    fn list_events(
        &self,
        calendar_id: &str,
        range: &TimeRange,
        limit: usize,
        offset: u64,
    ) -> Result<Vec<CalendarEvent>> {
        let mut sql = format!("SELECT {EVENT_COLUMNS} FROM calendar_events WHERE calendar_id = ?");
        let mut args = vec![Value::Text(calendar_id.to_string())];

        if let Some(min) = &range.min {
            sql.push_str(" AND start_time >= ?");
            args.push(Value::Text(min.clone()));
        }
        if let Some(max) = &range.max {
            sql.push_str(" AND start_time <= ?");
            args.push(Value::Text(max.clone()));
        }

        sql.push_str(" ORDER BY start_time ASC, id ASC LIMIT ? OFFSET ?");
        args.push(Value::Integer(limit as i64));
        args.push(Value::Integer(sql_offset(offset)));

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let events = stmt
            .query_map(params_from_iter(args.iter()), event_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(events)
    }

    fn list_events_since(
        &self,
        calendar_id: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<CalendarEvent>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {EVENT_COLUMNS} FROM calendar_events
             WHERE calendar_id = ? AND COALESCE(updated_at, '{EPOCH_STAMP}') > ?
             ORDER BY COALESCE(updated_at, '{EPOCH_STAMP}') ASC, id ASC
             LIMIT ?"
        ))?;
        let events = stmt
            .query_map(
                params![calendar_id, stamp_text(since), limit as i64],
                event_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(events)
    }

    fn upsert_contact(&self, contact: Contact) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO people (resource_name, user_id, data, updated_at) VALUES (?, ?, ?, ?)
             ON CONFLICT(resource_name) DO UPDATE SET
                user_id = excluded.user_id,
                data = excluded.data,
                updated_at = excluded.updated_at",
            params![
                contact.resource_name,
                contact.user_id,
                contact.data.to_string(),
                contact.updated.map(stamp_text),
            ],
        )?;
        Ok(())
    }

    fn update_contact(&self, contact: &Contact) -> Result<bool> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE people SET data = ?, updated_at = ? WHERE user_id = ? AND resource_name = ?",
            params![
                contact.data.to_string(),
                contact.updated.map(stamp_text),
                contact.user_id,
                contact.resource_name,
            ],
        )?;
        Ok(updated > 0)
    }

    fn get_contact(&self, user_id: &str, resource_name: &str) -> Result<Option<Contact>> {
        let conn = self.conn()?;
        let contact = conn
            .query_row(
                &format!("SELECT {CONTACT_COLUMNS} FROM people WHERE user_id = ? AND resource_name = ?"),
                params![user_id, resource_name],
                contact_from_row,
            )
            .optional()?;
        Ok(contact)
    }

    fn delete_contact(&self, user_id: &str, resource_name: &str) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM people WHERE user_id = ? AND resource_name = ?",
            params![user_id, resource_name],
        )?;
        Ok(deleted > 0)
    }

    fn list_contacts(
        &self,
        user_id: &str,
        search: Option<&str>,
        limit: usize,
        offset: u64,
    ) -> Result<Vec<Contact>> {
        let mut sql = format!("SELECT {CONTACT_COLUMNS} FROM people WHERE user_id = ?");
        let mut args = vec![Value::Text(user_id.to_string())];

        if let Some(search) = search.filter(|s| !s.is_empty()) {
            sql.push_str(" AND data LIKE ? ESCAPE '\\'");
            args.push(Value::Text(like_pattern(search)));
        }

        sql.push_str(" ORDER BY resource_name ASC LIMIT ? OFFSET ?");
        args.push(Value::Integer(limit as i64));
        args.push(Value::Integer(sql_offset(offset)));

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let contacts = stmt
            .query_map(params_from_iter(args.iter()), contact_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(contacts)
    }

    fn list_contacts_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Contact>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {CONTACT_COLUMNS} FROM people
             WHERE user_id = ? AND COALESCE(updated_at, '{EPOCH_STAMP}') > ?
             ORDER BY COALESCE(updated_at, '{EPOCH_STAMP}') ASC, resource_name ASC
             LIMIT ?"
        ))?;
        let contacts = stmt
            .query_map(
                params![user_id, stamp_text(since), limit as i64],
                contact_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(contacts)
    }

    fn get_watermark(
        &self,
        domain: ResourceDomain,
        owner_key: &str,
    ) -> Result<Option<SyncWatermark>> {
        let conn = self.conn()?;
        let watermark = conn
            .query_row(
                "SELECT resource_type, owner_key, token, issued_at FROM sync_tokens
                 WHERE resource_type = ? AND owner_key = ?",
                params![domain.as_str(), owner_key],
                watermark_from_row,
            )
            .optional()?;
        Ok(watermark.flatten())
    }

    fn insert_watermark_if_absent(&self, watermark: SyncWatermark) -> Result<SyncWatermark> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO sync_tokens (resource_type, owner_key, token, issued_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(resource_type, owner_key) DO NOTHING",
            params![
                watermark.domain.as_str(),
                watermark.owner_key,
                watermark.token,
                watermark.issued_at.to_rfc3339(),
            ],
        )?;
        let stored = tx
            .query_row(
                "SELECT resource_type, owner_key, token, issued_at FROM sync_tokens
                 WHERE resource_type = ? AND owner_key = ?",
                params![watermark.domain.as_str(), watermark.owner_key],
                watermark_from_row,
            )?
            .context("Stored watermark has an unknown resource type")?;
        tx.commit()?;
        Ok(stored)
    }

    fn save_watermark(&self, watermark: SyncWatermark) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO sync_tokens (resource_type, owner_key, token, issued_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(resource_type, owner_key) DO UPDATE SET
                token = excluded.token,
                issued_at = excluded.issued_at",
            params![
                watermark.domain.as_str(),
                watermark.owner_key,
                watermark.token,
                watermark.issued_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(
            "DELETE FROM gmail_messages;
             DELETE FROM gmail_threads;
             DELETE FROM history_counters;
             DELETE FROM calendar_events;
             DELETE FROM calendars;
             DELETE FROM people;
             DELETE FROM sync_tokens;",
        )?;
        Ok(())
    }
}
