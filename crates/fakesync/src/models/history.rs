//! Mail history ledger views

use serde::{Deserialize, Serialize};

use super::Message;

/// One replayed point in a user's mail history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Ledger value recorded when the messages were added
    pub id: u64,
    pub messages_added: Vec<Message>,
}

/// A window of history entries plus the top of the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPage {
    pub entries: Vec<HistoryEntry>,
    /// Current ledger value for the owner
    pub history_id: u64,
    pub next_page_token: Option<String>,
}

/// Mailbox summary returned by the profile endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailProfile {
    pub email_address: String,
    pub messages_total: usize,
    pub threads_total: usize,
    pub history_id: u64,
}
