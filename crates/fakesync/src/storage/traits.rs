//! Storage trait definitions

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::models::{
    Calendar, CalendarEvent, Contact, Message, MessageId, ResourceDomain, SyncWatermark, Thread,
};
use crate::query::MailQuery;

/// Inclusive bounds on an event's start time, compared as RFC 3339 text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeRange {
    pub min: Option<String>,
    pub max: Option<String>,
}

impl TimeRange {
    pub fn contains(&self, start: &str) -> bool {
        self.min.as_deref().is_none_or(|min| start >= min)
            && self.max.as_deref().is_none_or(|max| start <= max)
    }
}

/// Trait for the record collections the sync engine lists over
///
/// Listing methods take an `offset` and a `limit` and return at most `limit`
/// rows in the collection's stable order. The `*_since` methods return rows
/// whose last-modified stamp is strictly newer than `since` at second
/// resolution, treating absent stamps as the epoch, ordered oldest first.
pub trait SyncStore: Send + Sync {
    // === Mail ===

    /// Insert or update a thread
    fn upsert_thread(&self, thread: Thread) -> Result<()>;

    /// Insert or update a message
    fn upsert_message(&self, message: Message) -> Result<()>;

    fn get_message(&self, user_id: &str, id: &MessageId) -> Result<Option<Message>>;

    /// Delete a message, returning whether it existed
    fn delete_message(&self, user_id: &str, id: &MessageId) -> Result<bool>;

    /// List a user's messages matching `query`, newest first
    fn list_messages(
        &self,
        user_id: &str,
        query: &MailQuery,
        limit: usize,
        offset: u64,
    ) -> Result<Vec<Message>>;

    /// List messages whose recorded history id is at least `start_history_id`,
    /// ascending by history id
    fn list_messages_from_history(
        &self,
        user_id: &str,
        start_history_id: u64,
        limit: usize,
        offset: u64,
    ) -> Result<Vec<Message>>;

    fn count_messages(&self, user_id: &str) -> Result<usize>;

    fn count_threads(&self, user_id: &str) -> Result<usize>;

    /// Atomically increment the user's history counter and return the new value
    fn advance_history(&self, user_id: &str) -> Result<u64>;

    /// Current history counter, `None` if it was never advanced
    fn current_history(&self, user_id: &str) -> Result<Option<u64>>;

    // === Calendar ===

    fn upsert_calendar(&self, calendar: Calendar) -> Result<()>;

    fn upsert_event(&self, event: CalendarEvent) -> Result<()>;

    /// Overwrite an existing event, returning whether it existed
    fn update_event(&self, event: &CalendarEvent) -> Result<bool>;

    fn get_event(&self, calendar_id: &str, event_id: &str) -> Result<Option<CalendarEvent>>;

    fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<bool>;

    /// List a calendar's events by start time ascending
    fn list_events(
        &self,
        calendar_id: &str,
        range: &TimeRange,
        limit: usize,
        offset: u64,
    ) -> Result<Vec<CalendarEvent>>;

    fn list_events_since(
        &self,
        calendar_id: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<CalendarEvent>>;

    // === Contacts ===

    fn upsert_contact(&self, contact: Contact) -> Result<()>;

    /// Overwrite an existing contact, returning whether it existed
    fn update_contact(&self, contact: &Contact) -> Result<bool>;

    fn get_contact(&self, user_id: &str, resource_name: &str) -> Result<Option<Contact>>;

    fn delete_contact(&self, user_id: &str, resource_name: &str) -> Result<bool>;

    /// List a user's contacts by resource name, optionally only those whose
    /// data contains `search` (case-insensitive)
    fn list_contacts(
        &self,
        user_id: &str,
        search: Option<&str>,
        limit: usize,
        offset: u64,
    ) -> Result<Vec<Contact>>;

    fn list_contacts_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Contact>>;

    // === Watermarks ===

    fn get_watermark(&self, domain: ResourceDomain, owner_key: &str)
    -> Result<Option<SyncWatermark>>;

    /// Persist `watermark` unless one already exists for its (domain, owner),
    /// returning whichever row is stored afterwards
    fn insert_watermark_if_absent(&self, watermark: SyncWatermark) -> Result<SyncWatermark>;

    /// Insert or overwrite the watermark for its (domain, owner)
    fn save_watermark(&self, watermark: SyncWatermark) -> Result<()>;

    /// Clear all data (for testing)
    fn clear(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_range_contains() {
        let open = TimeRange::default();
        assert!(open.contains("2025-01-01T00:00:00Z"));

        let range = TimeRange {
            min: Some("2025-01-01T00:00:00Z".to_string()),
            max: Some("2025-01-31T23:59:59Z".to_string()),
        };
        assert!(range.contains("2025-01-01T00:00:00Z"));
        assert!(range.contains("2025-01-15T10:00:00Z"));
        assert!(range.contains("2025-01-31T23:59:59Z"));
        assert!(!range.contains("2024-12-31T23:59:59Z"));
        assert!(!range.contains("2025-02-01T00:00:00Z"));
    }
}
