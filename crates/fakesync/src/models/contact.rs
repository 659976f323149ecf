//! Contact records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Record;

/// A person in a user's contacts
///
/// `data` is the person resource as clients see it (`names`,
/// `emailAddresses`, and whatever else they stored), kept as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// Resource name, `people/<id>`
    pub resource_name: String,
    pub user_id: String,
    pub data: serde_json::Value,
    pub updated: Option<DateTime<Utc>>,
}

impl Contact {
    pub fn new(resource_name: impl Into<String>, user_id: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            resource_name: resource_name.into(),
            user_id: user_id.into(),
            data,
            updated: None,
        }
    }

    /// Person data with a single name and email address
    pub fn person_data(display_name: &str, email: &str) -> serde_json::Value {
        serde_json::json!({
            "names": [{ "displayName": display_name }],
            "emailAddresses": [{ "value": email }],
        })
    }

    /// Short id without the `people/` prefix
    pub fn short_id(&self) -> &str {
        self.resource_name
            .strip_prefix("people/")
            .unwrap_or(&self.resource_name)
    }

    pub fn display_name(&self) -> Option<&str> {
        self.data
            .pointer("/names/0/displayName")
            .and_then(|v| v.as_str())
    }

    pub fn email(&self) -> Option<&str> {
        self.data
            .pointer("/emailAddresses/0/value")
            .and_then(|v| v.as_str())
    }
}

impl Record for Contact {
    fn id(&self) -> &str {
        &self.resource_name
    }

    fn container(&self) -> &str {
        &self.user_id
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_accessors() {
        let contact = Contact::new(
            "people/c42",
            "alice",
            Contact::person_data("Bob Stone", "bob@example.com"),
        );
        assert_eq!(contact.short_id(), "c42");
        assert_eq!(contact.display_name(), Some("Bob Stone"));
        assert_eq!(contact.email(), Some("bob@example.com"));
    }

    #[test]
    fn test_accessors_tolerate_missing_fields() {
        let contact = Contact::new("c7", "alice", serde_json::json!({ "names": [] }));
        assert_eq!(contact.short_id(), "c7");
        assert_eq!(contact.display_name(), None);
        assert_eq!(contact.email(), None);
    }
}
