//! Mail records: messages and the threads that group them

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Record;

/// Unique identifier for a message
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for a thread
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadId(pub String);

impl ThreadId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ThreadId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A conversation owned by one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: ThreadId,
    pub user_id: String,
    pub snippet: String,
}

impl Thread {
    pub fn new(id: impl Into<String>, user_id: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            id: ThreadId::new(id),
            user_id: user_id.into(),
            snippet: snippet.into(),
        }
    }
}

/// A stored mail message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    /// Owning user
    pub user_id: String,
    pub thread_id: ThreadId,
    /// Label IDs (e.g., "INBOX", "SENT", "UNREAD")
    pub label_ids: Vec<String>,
    pub snippet: String,
    /// Milliseconds since the Unix epoch
    pub internal_date: i64,
    /// Raw JSON payload (headers and body) passed through to clients
    pub payload: String,
    /// Ledger value recorded when the message was added
    pub history_id: Option<u64>,
}

impl Message {
    pub fn builder(id: impl Into<String>, user_id: impl Into<String>) -> MessageBuilder {
        MessageBuilder::new(MessageId::new(id), user_id.into())
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.label_ids.iter().any(|l| l == label)
    }

    /// Value of a payload header, if the payload is well-formed JSON carrying it
    pub fn header(&self, name: &str) -> Option<String> {
        let payload: serde_json::Value = serde_json::from_str(&self.payload).ok()?;
        payload
            .get("headers")?
            .as_array()?
            .iter()
            .find(|h| h.get("name").and_then(|n| n.as_str()) == Some(name))
            .and_then(|h| h.get("value"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }
}

impl Record for Message {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn container(&self) -> &str {
        self.thread_id.as_str()
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.internal_date)
    }
}

/// Builder for creating Message instances
pub struct MessageBuilder {
    id: MessageId,
    user_id: String,
    thread_id: Option<ThreadId>,
    label_ids: Vec<String>,
    headers: Vec<(String, String)>,
    body: String,
    snippet: Option<String>,
    internal_date: i64,
    history_id: Option<u64>,
}

impl MessageBuilder {
    fn new(id: MessageId, user_id: String) -> Self {
        Self {
            id,
            user_id,
            thread_id: None,
            label_ids: Vec::new(),
            headers: Vec::new(),
            body: String::new(),
            snippet: None,
            internal_date: 0,
            history_id: None,
        }
    }

    pub fn thread_id(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(ThreadId::new(thread_id));
        self
    }

    pub fn label_ids<S: Into<String>>(mut self, labels: impl IntoIterator<Item = S>) -> Self {
        self.label_ids = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }

    pub fn internal_date(mut self, internal_date: i64) -> Self {
        self.internal_date = internal_date;
        self
    }

    pub fn received_at(self, at: DateTime<Utc>) -> Self {
        self.internal_date(at.timestamp_millis())
    }

    pub fn history_id(mut self, history_id: u64) -> Self {
        self.history_id = Some(history_id);
        self
    }

    pub fn build(self) -> Message {
        let headers: Vec<serde_json::Value> = self
            .headers
            .iter()
            .map(|(name, value)| serde_json::json!({ "name": name, "value": value }))
            .collect();
        let payload = serde_json::json!({
            "headers": headers,
            "body": { "data": URL_SAFE.encode(self.body.as_bytes()) },
        });

        Message {
            thread_id: self
                .thread_id
                .unwrap_or_else(|| ThreadId::new(format!("thr_{}", self.id.as_str()))),
            id: self.id,
            user_id: self.user_id,
            label_ids: self.label_ids,
            snippet: self.snippet.unwrap_or_else(|| snippet_of(&self.body)),
            internal_date: self.internal_date,
            payload: payload.to_string(),
            history_id: self.history_id,
        }
    }
}

/// Preview text for a body: the first 100 characters, ellipsized when cut
pub fn snippet_of(body: &str) -> String {
    const MAX: usize = 100;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_payload_headers() {
        let message = Message::builder("m1", "alice")
            .thread_id("t1")
            .header("From", "bob@example.com")
            .header("Subject", "Lunch?")
            .body("Noon works")
            .label_ids(["INBOX", "UNREAD"])
            .build();

        assert_eq!(message.thread_id.as_str(), "t1");
        assert_eq!(message.header("Subject").as_deref(), Some("Lunch?"));
        assert_eq!(message.header("To"), None);
        assert_eq!(message.snippet, "Noon works");
        assert!(message.has_label("UNREAD"));
        assert!(!message.has_label("SENT"));
    }

    #[test]
    fn test_builder_default_thread() {
        let message = Message::builder("m9", "alice").build();
        assert_eq!(message.thread_id.as_str(), "thr_m9");
    }

    #[test]
    fn test_snippet_truncates() {
        let long = "x".repeat(150);
        let snippet = snippet_of(&long);
        assert_eq!(snippet.len(), 103);
        assert!(snippet.ends_with("..."));

        let exact = "é".repeat(100);
        assert_eq!(snippet_of(&exact), exact);
    }

    #[test]
    fn test_record_stamp_from_internal_date() {
        let message = Message::builder("m1", "alice").internal_date(1_500).build();
        assert_eq!(message.updated_at().unwrap().timestamp_millis(), 1_500);
    }
}
