//! Domain models for the three record collections and sync bookkeeping

mod contact;
mod event;
mod history;
mod message;
mod watermark;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use contact::Contact;
pub use event::{Attendee, Calendar, CalendarEvent, Organizer};
pub use history::{HistoryEntry, HistoryPage, MailProfile};
pub use message::{Message, MessageBuilder, MessageId, Thread, ThreadId, snippet_of};
pub use watermark::{ResourceDomain, SyncWatermark};

/// A record that can take part in incremental sync
pub trait Record {
    /// Identity of the record within its collection
    fn id(&self) -> &str;

    /// Scoping key (thread, calendar, or owning user)
    ///
    /// Delta queries only return records whose container matches the one
    /// asked for.
    fn container(&self) -> &str;

    /// Last-modified stamp, if the record has ever been stamped
    fn updated_at(&self) -> Option<DateTime<Utc>>;

    /// Last-modified stamp with absent stamps treated as the epoch
    fn stamp(&self) -> DateTime<Utc> {
        self.updated_at().unwrap_or(DateTime::UNIX_EPOCH)
    }
}

/// Any record from one of the three collections
///
/// The cross-domain view for transport code: map a `SyncPage` through
/// `ResourceItem::from` to emit one `kind`-tagged item stream regardless of
/// collection. `syncctl` prints every listing this way.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ResourceItem {
    Message(Message),
    Event(CalendarEvent),
    Contact(Contact),
}

impl ResourceItem {
    pub fn domain(&self) -> ResourceDomain {
        match self {
            Self::Message(_) => ResourceDomain::Mail,
            Self::Event(_) => ResourceDomain::Calendar,
            Self::Contact(_) => ResourceDomain::Contacts,
        }
    }

    fn record(&self) -> &dyn Record {
        match self {
            Self::Message(m) => m,
            Self::Event(e) => e,
            Self::Contact(c) => c,
        }
    }
}

impl Record for ResourceItem {
    fn id(&self) -> &str {
        self.record().id()
    }

    fn container(&self) -> &str {
        self.record().container()
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.record().updated_at()
    }
}

impl From<Message> for ResourceItem {
    fn from(message: Message) -> Self {
        Self::Message(message)
    }
}

impl From<CalendarEvent> for ResourceItem {
    fn from(event: CalendarEvent) -> Self {
        Self::Event(event)
    }
}

impl From<Contact> for ResourceItem {
    fn from(contact: Contact) -> Self {
        Self::Contact(contact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_resource_item_delegates() {
        let at = Utc.with_ymd_and_hms(2025, 2, 1, 9, 0, 0).unwrap();
        let mut event = CalendarEvent::new("evt_1", "primary", "Standup");
        event.updated = Some(at);

        let item = ResourceItem::from(event);
        assert_eq!(item.domain(), ResourceDomain::Calendar);
        assert_eq!(item.id(), "evt_1");
        assert_eq!(item.container(), "primary");
        assert_eq!(item.stamp(), at);
    }

    #[test]
    fn test_missing_stamp_is_epoch() {
        let contact = Contact::new("people/c1", "alice", serde_json::json!({}));
        let item = ResourceItem::from(contact);
        assert_eq!(item.updated_at(), None);
        assert_eq!(item.stamp(), DateTime::UNIX_EPOCH);
    }
}
