//! Calendar records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Record;

/// A calendar owned by one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calendar {
    pub id: String,
    pub user_id: String,
    pub summary: String,
}

impl Calendar {
    pub fn new(id: impl Into<String>, user_id: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            summary: summary.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organizer {
    pub email: String,
    #[serde(default)]
    pub display_name: String,
}

/// An event within a calendar
///
/// `start` and `end` are RFC 3339 strings exactly as supplied by the client;
/// full-sync ordering and time-range filters compare them as text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub calendar_id: String,
    pub summary: String,
    pub description: String,
    pub start: String,
    pub end: String,
    pub attendees: Vec<Attendee>,
    pub location: Option<String>,
    pub organizer: Option<Organizer>,
    pub recurrence: Vec<String>,
    /// Last-modified stamp; `None` for events that were never stamped
    pub updated: Option<DateTime<Utc>>,
}

impl CalendarEvent {
    pub fn new(id: impl Into<String>, calendar_id: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            calendar_id: calendar_id.into(),
            summary: summary.into(),
            ..Default::default()
        }
    }

    pub fn with_times(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start = start.into();
        self.end = end.into();
        self
    }
}

impl Record for CalendarEvent {
    fn id(&self) -> &str {
        &self.id
    }

    fn container(&self) -> &str {
        &self.calendar_id
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated
    }
}
