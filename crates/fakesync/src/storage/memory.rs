//! In-memory storage implementation
//!
//! Used by unit tests and by callers that want a throwaway engine. Ordering
//! and filtering mirror the SQLite store row for row.

use anyhow::{Result, anyhow};
use chrono::{DateTime, SubsecRound, Utc};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::traits::{SyncStore, TimeRange};
use crate::models::{
    Calendar, CalendarEvent, Contact, Message, MessageId, Record, ResourceDomain, SyncWatermark,
    Thread,
};
use crate::query::MailQuery;

/// In-memory implementation of SyncStore
///
/// Uses HashMaps protected by RwLocks for thread-safe access.
#[derive(Default)]
pub struct InMemorySyncStore {
    threads: RwLock<HashMap<String, Thread>>,
    messages: RwLock<HashMap<String, Message>>,
    history: RwLock<HashMap<String, u64>>,
    calendars: RwLock<HashMap<String, Calendar>>,
    events: RwLock<HashMap<String, CalendarEvent>>,
    contacts: RwLock<HashMap<String, Contact>>,
    watermarks: RwLock<HashMap<(ResourceDomain, String), SyncWatermark>>,
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read().map_err(|_| anyhow!("in-memory store lock poisoned"))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write().map_err(|_| anyhow!("in-memory store lock poisoned"))
}

/// Apply an offset/limit window to an already sorted list
fn window<T>(items: Vec<T>, limit: usize, offset: u64) -> Vec<T> {
    let skip = usize::try_from(offset).unwrap_or(usize::MAX);
    items.into_iter().skip(skip).take(limit).collect()
}

/// Whether `record` belongs to `container` and changed after `since`,
/// compared at whole seconds
fn changed_since<R: Record>(record: &R, container: &str, since: DateTime<Utc>) -> bool {
    record.container() == container && record.stamp().trunc_subsecs(0) > since.trunc_subsecs(0)
}

impl InMemorySyncStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }
}

impl SyncStore for InMemorySyncStore {
    fn upsert_thread(&self, thread: Thread) -> Result<()> {
        write(&self.threads)?.insert(thread.id.as_str().to_string(), thread);
        Ok(())
    }

    fn upsert_message(&self, message: Message) -> Result<()> {
        write(&self.messages)?.insert(message.id.as_str().to_string(), message);
        Ok(())
    }

    fn get_message(&self, user_id: &str, id: &MessageId) -> Result<Option<Message>> {
        Ok(read(&self.messages)?
            .get(id.as_str())
            .filter(|m| m.user_id == user_id)
            .cloned())
    }

    fn delete_message(&self, user_id: &str, id: &MessageId) -> Result<bool> {
        let mut messages = write(&self.messages)?;
        if messages.get(id.as_str()).is_some_and(|m| m.user_id == user_id) {
            messages.remove(id.as_str());
            return Ok(true);
        }
        Ok(false)
    }

    fn list_messages(
        &self,
        user_id: &str,
        query: &MailQuery,
        limit: usize,
        offset: u64,
    ) -> Result<Vec<Message>> {
        let mut matching: Vec<Message> = read(&self.messages)?
            .values()
            .filter(|m| m.user_id == user_id && query.matches(m))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            (Reverse(a.internal_date), a.id.as_str()).cmp(&(Reverse(b.internal_date), b.id.as_str()))
        });
        Ok(window(matching, limit, offset))
    }

    fn list_messages_from_history(
        &self,
        user_id: &str,
        start_history_id: u64,
        limit: usize,
        offset: u64,
    ) -> Result<Vec<Message>> {
        let mut matching: Vec<Message> = read(&self.messages)?
            .values()
            .filter(|m| m.user_id == user_id && m.history_id.unwrap_or(0) >= start_history_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            (a.history_id.unwrap_or(0), a.id.as_str()).cmp(&(b.history_id.unwrap_or(0), b.id.as_str()))
        });
        Ok(window(matching, limit, offset))
    }

    fn count_messages(&self, user_id: &str) -> Result<usize> {
        Ok(read(&self.messages)?
            .values()
            .filter(|m| m.user_id == user_id)
            .count())
    }

    fn count_threads(&self, user_id: &str) -> Result<usize> {
        Ok(read(&self.threads)?
            .values()
            .filter(|t| t.user_id == user_id)
            .count())
    }

    fn advance_history(&self, user_id: &str) -> Result<u64> {
        let mut history = write(&self.history)?;
        let counter = history.entry(user_id.to_string()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    fn current_history(&self, user_id: &str) -> Result<Option<u64>> {
        Ok(read(&self.history)?.get(user_id).copied())
    }

    fn upsert_calendar(&self, calendar: Calendar) -> Result<()> {
        write(&self.calendars)?.insert(calendar.id.clone(), calendar);
        Ok(())
    }

    fn upsert_event(&self, event: CalendarEvent) -> Result<()> {
        write(&self.events)?.insert(event.id.clone(), event);
        Ok(())
    }

    fn update_event(&self, event: &CalendarEvent) -> Result<bool> {
        let mut events = write(&self.events)?;
        match events.get_mut(&event.id) {
            Some(existing) if existing.calendar_id == event.calendar_id => {
                *existing = event.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn get_event(&self, calendar_id: &str, event_id: &str) -> Result<Option<CalendarEvent>> {
        Ok(read(&self.events)?
            .get(event_id)
            .filter(|e| e.calendar_id == calendar_id)
            .cloned())
    }

    fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<bool> {
        let mut events = write(&self.events)?;
        if events.get(event_id).is_some_and(|e| e.calendar_id == calendar_id) {
            events.remove(event_id);
            return Ok(true);
        }
        Ok(false)
    }

    fn list_events(
        &self,
        calendar_id: &str,
        range: &TimeRange,
        limit: usize,
        offset: u64,
    ) -> Result<Vec<CalendarEvent>> {
        let mut matching: Vec<CalendarEvent> = read(&self.events)?
            .values()
            .filter(|e| e.calendar_id == calendar_id && range.contains(&e.start))
            .cloned()
            .collect();
        matching.sort_by(|a, b| (&a.start, &a.id).cmp(&(&b.start, &b.id)));
        Ok(window(matching, limit, offset))
    }

    fn list_events_since(
        &self,
        calendar_id: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<CalendarEvent>> {
        let mut changed: Vec<CalendarEvent> = read(&self.events)?
            .values()
            .filter(|e| changed_since(*e, calendar_id, since))
            .cloned()
            .collect();
        changed.sort_by(|a, b| {
            (a.stamp().trunc_subsecs(0), &a.id).cmp(&(b.stamp().trunc_subsecs(0), &b.id))
        });
        changed.truncate(limit);
        Ok(changed)
    }

    fn upsert_contact(&self, contact: Contact) -> Result<()> {
        write(&self.contacts)?.insert(contact.resource_name.clone(), contact);
        Ok(())
    }

    fn update_contact(&self, contact: &Contact) -> Result<bool> {
        let mut contacts = write(&self.contacts)?;
        match contacts.get_mut(&contact.resource_name) {
            Some(existing) if existing.user_id == contact.user_id => {
                existing.data = contact.data.clone();
                existing.updated = contact.updated;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn get_contact(&self, user_id: &str, resource_name: &str) -> Result<Option<Contact>> {
        Ok(read(&self.contacts)?
            .get(resource_name)
            .filter(|c| c.user_id == user_id)
            .cloned())
    }

    fn delete_contact(&self, user_id: &str, resource_name: &str) -> Result<bool> {
        let mut contacts = write(&self.contacts)?;
        if contacts.get(resource_name).is_some_and(|c| c.user_id == user_id) {
            contacts.remove(resource_name);
            return Ok(true);
        }
        Ok(false)
    }

    fn list_contacts(
        &self,
        user_id: &str,
        search: Option<&str>,
        limit: usize,
        offset: u64,
    ) -> Result<Vec<Contact>> {
        let needle = search.filter(|s| !s.is_empty()).map(str::to_lowercase);
        let mut matching: Vec<Contact> = read(&self.contacts)?
            .values()
            .filter(|c| c.user_id == user_id)
            .filter(|c| {
                needle
                    .as_deref()
                    .is_none_or(|n| c.data.to_string().to_lowercase().contains(n))
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.resource_name.cmp(&b.resource_name));
        Ok(window(matching, limit, offset))
    }

    fn list_contacts_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Contact>> {
        let mut changed: Vec<Contact> = read(&self.contacts)?
            .values()
            .filter(|c| changed_since(*c, user_id, since))
            .cloned()
            .collect();
        changed.sort_by(|a, b| {
            (a.stamp().trunc_subsecs(0), &a.resource_name)
                .cmp(&(b.stamp().trunc_subsecs(0), &b.resource_name))
        });
        changed.truncate(limit);
        Ok(changed)
    }

    fn get_watermark(
        &self,
        domain: ResourceDomain,
        owner_key: &str,
    ) -> Result<Option<SyncWatermark>> {
        Ok(read(&self.watermarks)?
            .get(&(domain, owner_key.to_string()))
            .cloned())
    }

    fn insert_watermark_if_absent(&self, watermark: SyncWatermark) -> Result<SyncWatermark> {
        let mut watermarks = write(&self.watermarks)?;
        let key = (watermark.domain, watermark.owner_key.clone());
        Ok(watermarks.entry(key).or_insert(watermark).clone())
    }

    fn save_watermark(&self, watermark: SyncWatermark) -> Result<()> {
        let key = (watermark.domain, watermark.owner_key.clone());
        write(&self.watermarks)?.insert(key, watermark);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        write(&self.threads)?.clear();
        write(&self.messages)?.clear();
        write(&self.history)?.clear();
        write(&self.calendars)?.clear();
        write(&self.events)?.clear();
        write(&self.contacts)?.clear();
        write(&self.watermarks)?.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(sec: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, sec).unwrap()
    }

    fn message(id: &str, date: i64, history_id: Option<u64>) -> Message {
        let mut message = Message::builder(id, "alice")
            .label_ids(["INBOX"])
            .internal_date(date)
            .build();
        message.history_id = history_id;
        message
    }

    #[test]
    fn test_message_order_ties_by_id() {
        let store = InMemorySyncStore::new();
        store.upsert_message(message("b", 100, None)).unwrap();
        store.upsert_message(message("a", 100, None)).unwrap();
        store.upsert_message(message("c", 200, None)).unwrap();

        let listed = store.list_messages("alice", &MailQuery::default(), 10, 0).unwrap();
        let ids: Vec<&str> = listed.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);

        let page = store.list_messages("alice", &MailQuery::default(), 2, 2).unwrap();
        assert_eq!(page.len(), 1);
        assert!(store.list_messages("alice", &MailQuery::default(), 2, u64::MAX).unwrap().is_empty());
    }

    #[test]
    fn test_history_listing() {
        let store = InMemorySyncStore::new();
        store.upsert_message(message("m1", 1, Some(2))).unwrap();
        store.upsert_message(message("m2", 2, Some(1))).unwrap();
        store.upsert_message(message("m3", 3, None)).unwrap();

        let from_one = store.list_messages_from_history("alice", 1, 10, 0).unwrap();
        let ids: Vec<&str> = from_one.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m2", "m1"]);

        assert_eq!(store.advance_history("alice").unwrap(), 1);
        assert_eq!(store.advance_history("alice").unwrap(), 2);
        assert_eq!(store.current_history("alice").unwrap(), Some(2));
        assert_eq!(store.current_history("bob").unwrap(), None);
    }

    #[test]
    fn test_events_since_second_resolution() {
        let store = InMemorySyncStore::new();
        let mut early = CalendarEvent::new("e1", "primary", "Early");
        early.updated = Some(at(1));
        let mut late = CalendarEvent::new("e2", "primary", "Late");
        late.updated = Some(at(3) + Duration::milliseconds(400));
        store.upsert_event(early).unwrap();
        store.upsert_event(late).unwrap();
        store.upsert_event(CalendarEvent::new("e3", "primary", "Never stamped")).unwrap();

        let changed = store.list_events_since("primary", at(1), 10).unwrap();
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].id, "e2");

        // Same second as e2's stamp
        let boundary = at(3) + Duration::milliseconds(900);
        assert!(store.list_events_since("primary", boundary, 10).unwrap().is_empty());

        let all = store.list_events_since("primary", DateTime::UNIX_EPOCH, 10).unwrap();
        let ids: Vec<&str> = all.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["e1", "e2"]);
    }

    #[test]
    fn test_deltas_stay_in_their_container() {
        let store = InMemorySyncStore::new();
        let mut work = CalendarEvent::new("e1", "work", "Review");
        work.updated = Some(at(5));
        let mut home = CalendarEvent::new("e2", "primary", "Dinner");
        home.updated = Some(at(5));
        store.upsert_event(work).unwrap();
        store.upsert_event(home).unwrap();

        let mut ann = Contact::new("people/c1", "alice", Contact::person_data("Ann", "ann@example.com"));
        ann.updated = Some(at(5));
        let mut bo = Contact::new("people/c2", "bob", Contact::person_data("Bo", "bo@example.com"));
        bo.updated = Some(at(5));
        store.upsert_contact(ann).unwrap();
        store.upsert_contact(bo).unwrap();

        let events = store.list_events_since("work", at(0), 10).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "e1");

        let contacts = store.list_contacts_since("bob", at(0), 10).unwrap();
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].resource_name, "people/c2");
        assert!(store.list_contacts_since("carol", at(0), 10).unwrap().is_empty());
    }

    #[test]
    fn test_scoped_lookups() {
        let store = InMemorySyncStore::new();
        store
            .upsert_contact(Contact::new("people/c1", "alice", Contact::person_data("Ann", "ann@example.com")))
            .unwrap();
        assert!(store.get_contact("alice", "people/c1").unwrap().is_some());
        assert!(store.get_contact("bob", "people/c1").unwrap().is_none());
        assert!(!store.delete_contact("bob", "people/c1").unwrap());

        let search = store.list_contacts("alice", Some("ANN@EXAMPLE"), 10, 0).unwrap();
        assert_eq!(search.len(), 1);
        assert!(store.list_contacts("alice", Some("zed"), 10, 0).unwrap().is_empty());
    }

    #[test]
    fn test_watermark_insert_if_absent() {
        let store = InMemorySyncStore::new();
        let first = SyncWatermark::new(ResourceDomain::Mail, "alice", "one", at(0));
        let second = SyncWatermark::new(ResourceDomain::Mail, "alice", "two", at(5));
        assert_eq!(store.insert_watermark_if_absent(first).unwrap().token, "one");
        assert_eq!(store.insert_watermark_if_absent(second.clone()).unwrap().token, "one");
        store.save_watermark(second).unwrap();
        assert_eq!(
            store.get_watermark(ResourceDomain::Mail, "alice").unwrap().unwrap().token,
            "two"
        );
    }
}
