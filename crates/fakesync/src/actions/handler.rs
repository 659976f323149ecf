//! Action handler for record mutations
//!
//! Every mutation takes its stamp from the engine clock, so incremental
//! listings see it after the next token boundary.

use log::info;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::clock::Clock;
use crate::error::{SyncError, SyncResult};
use crate::models::{Calendar, CalendarEvent, Contact, Message, MessageId, Thread};
use crate::storage::SyncStore;
use crate::sync::HistoryLedger;

/// Label IDs used for common mailbox states
pub mod labels {
    pub const INBOX: &str = "INBOX";
    pub const UNREAD: &str = "UNREAD";
    pub const SENT: &str = "SENT";
}

/// Disambiguates ids minted within the same nanosecond
static ID_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// A message composed by the owner
#[derive(Debug, Clone, Default)]
pub struct OutgoingMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Handler for create, update and delete operations on the three collections
pub struct ActionHandler {
    store: Arc<dyn SyncStore>,
    clock: Arc<dyn Clock>,
}

impl ActionHandler {
    pub fn new(store: Arc<dyn SyncStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    fn next_id(&self, prefix: &str) -> String {
        let nanos = self.clock.now().timestamp_nanos_opt().unwrap_or(0);
        let seq = ID_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        format!("{}{}_{}", prefix, nanos, seq)
    }

    // === Mail ===

    /// Send a message from `owner`, filing it under SENT in a new thread
    pub fn send_message(&self, owner: &str, outgoing: OutgoingMessage) -> SyncResult<Message> {
        let message = Message::builder(self.next_id("msg_"), owner)
            .thread_id(self.next_id("thr_"))
            .header("From", format!("{}@example.com", owner))
            .header("To", outgoing.to.as_str())
            .header("Subject", outgoing.subject.as_str())
            .body(outgoing.body.as_str())
            .label_ids([labels::SENT])
            .received_at(self.clock.now())
            .build();

        let message = self.insert_message(message)?;
        info!(
            "[ACTION] {} sent {} to {}",
            owner,
            message.id.as_str(),
            outgoing.to
        );
        Ok(message)
    }

    /// Add a message to its owner's mailbox
    ///
    /// Advances the owner's history ledger and records the new value on the
    /// message. The message's thread is created if it does not exist.
    pub fn insert_message(&self, mut message: Message) -> SyncResult<Message> {
        let history_id = HistoryLedger::new(self.store.as_ref()).advance(&message.user_id)?;
        message.history_id = Some(history_id);

        self.store.upsert_thread(Thread::new(
            message.thread_id.as_str(),
            message.user_id.as_str(),
            message.snippet.as_str(),
        ))?;
        self.store.upsert_message(message.clone())?;

        info!(
            "[ACTION] Stored message {} for {} at history {}",
            message.id.as_str(),
            message.user_id,
            history_id
        );
        Ok(message)
    }

    pub fn delete_message(&self, owner: &str, id: &str) -> SyncResult<()> {
        if !self.store.delete_message(owner, &MessageId::new(id))? {
            return Err(SyncError::not_found("message", id));
        }
        info!("[ACTION] Deleted message {} for {}", id, owner);
        Ok(())
    }

    // === Calendar ===

    pub fn create_calendar(&self, owner: &str, id: &str, summary: &str) -> SyncResult<Calendar> {
        let calendar = Calendar::new(id, owner, summary);
        self.store.upsert_calendar(calendar.clone())?;
        info!("[ACTION] Created calendar {} for {}", id, owner);
        Ok(calendar)
    }

    /// Store a new event, assigning an id when none is given
    pub fn create_event(&self, mut event: CalendarEvent) -> SyncResult<CalendarEvent> {
        if event.id.is_empty() {
            event.id = self.next_id("evt_");
        }
        event.updated = Some(self.clock.now());
        self.store.upsert_event(event.clone())?;
        info!("[ACTION] Created event {} in {}", event.id, event.calendar_id);
        Ok(event)
    }

    /// Replace an existing event and restamp it
    pub fn update_event(&self, mut event: CalendarEvent) -> SyncResult<CalendarEvent> {
        event.updated = Some(self.clock.now());
        if !self.store.update_event(&event)? {
            return Err(SyncError::not_found("event", event.id));
        }
        info!("[ACTION] Updated event {} in {}", event.id, event.calendar_id);
        Ok(event)
    }

    pub fn delete_event(&self, calendar_id: &str, event_id: &str) -> SyncResult<()> {
        if !self.store.delete_event(calendar_id, event_id)? {
            return Err(SyncError::not_found("event", event_id));
        }
        info!("[ACTION] Deleted event {} from {}", event_id, calendar_id);
        Ok(())
    }

    // === Contacts ===

    pub fn create_contact(&self, owner: &str, data: serde_json::Value) -> SyncResult<Contact> {
        let mut contact = Contact::new(self.next_id("people/c"), owner, data);
        contact.updated = Some(self.clock.now());
        self.store.upsert_contact(contact.clone())?;
        info!("[ACTION] Created contact {} for {}", contact.resource_name, owner);
        Ok(contact)
    }

    /// Replace a contact's data and restamp it
    pub fn update_contact(
        &self,
        owner: &str,
        resource_name: &str,
        data: serde_json::Value,
    ) -> SyncResult<Contact> {
        let mut contact = Contact::new(resource_name, owner, data);
        contact.updated = Some(self.clock.now());
        if !self.store.update_contact(&contact)? {
            return Err(SyncError::not_found("contact", resource_name));
        }
        info!("[ACTION] Updated contact {} for {}", resource_name, owner);
        Ok(contact)
    }

    pub fn delete_contact(&self, owner: &str, resource_name: &str) -> SyncResult<()> {
        if !self.store.delete_contact(owner, resource_name)? {
            return Err(SyncError::not_found("contact", resource_name));
        }
        info!("[ACTION] Deleted contact {} for {}", resource_name, owner);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::InMemorySyncStore;
    use chrono::{Duration, TimeZone, Utc};

    fn handler() -> (ActionHandler, Arc<InMemorySyncStore>, Arc<ManualClock>) {
        let store = Arc::new(InMemorySyncStore::new());
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
        ));
        (ActionHandler::new(store.clone(), clock.clone()), store, clock)
    }

    #[test]
    fn test_send_message_advances_history() {
        let (actions, store, _) = handler();
        let outgoing = OutgoingMessage {
            to: "bob@example.com".to_string(),
            subject: "Hi".to_string(),
            body: "Hello Bob".to_string(),
        };
        let first = actions.send_message("alice", outgoing.clone()).unwrap();
        let second = actions.send_message("alice", outgoing).unwrap();

        assert_eq!(first.history_id, Some(1));
        assert_eq!(second.history_id, Some(2));
        assert_ne!(first.id, second.id);
        assert_ne!(first.thread_id, second.thread_id);
        assert!(first.has_label(labels::SENT));
        assert_eq!(first.header("From").as_deref(), Some("alice@example.com"));
        assert_eq!(first.header("To").as_deref(), Some("bob@example.com"));
        assert_eq!(first.snippet, "Hello Bob");
        assert_eq!(store.count_messages("alice").unwrap(), 2);
        assert_eq!(store.count_threads("alice").unwrap(), 2);
    }

    #[test]
    fn test_event_lifecycle_restamps() {
        let (actions, store, clock) = handler();
        let created = actions
            .create_event(CalendarEvent::new("", "primary", "Standup"))
            .unwrap();
        assert!(created.id.starts_with("evt_"));
        assert_eq!(created.updated, Some(clock.now()));

        let later = clock.advance(Duration::minutes(5));
        let mut changed = created.clone();
        changed.summary = "Standup (moved)".to_string();
        let updated = actions.update_event(changed).unwrap();
        assert_eq!(updated.updated, Some(later));
        assert_eq!(
            store.get_event("primary", &created.id).unwrap().unwrap().summary,
            "Standup (moved)"
        );

        actions.delete_event("primary", &created.id).unwrap();
        let err = actions.delete_event("primary", &created.id).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_update_missing_event_is_not_found() {
        let (actions, _, _) = handler();
        let err = actions
            .update_event(CalendarEvent::new("evt_missing", "primary", "Ghost"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_contact_lifecycle() {
        let (actions, store, clock) = handler();
        let contact = actions
            .create_contact("alice", Contact::person_data("Ann", "ann@example.com"))
            .unwrap();
        assert!(contact.resource_name.starts_with("people/c"));

        clock.advance(Duration::seconds(3));
        let updated = actions
            .update_contact(
                "alice",
                &contact.resource_name,
                Contact::person_data("Ann B", "ann@example.com"),
            )
            .unwrap();
        assert_eq!(updated.display_name(), Some("Ann B"));
        assert_eq!(
            store
                .get_contact("alice", &contact.resource_name)
                .unwrap()
                .unwrap()
                .updated,
            Some(clock.now())
        );

        assert!(actions
            .update_contact("bob", &contact.resource_name, serde_json::json!({}))
            .unwrap_err()
            .is_not_found());
        actions.delete_contact("alice", &contact.resource_name).unwrap();
        assert!(actions
            .delete_contact("alice", &contact.resource_name)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_ids_are_unique_at_one_instant() {
        let (actions, _, _) = handler();
        let a = actions.create_contact("alice", serde_json::json!({})).unwrap();
        let b = actions.create_contact("alice", serde_json::json!({})).unwrap();
        assert_ne!(a.resource_name, b.resource_name);
    }
}
