//! Gmail-style `q` parameter parsing
//!
//! Only the operators the fake can filter on are recognized:
//! - `is:unread`, `is:starred`, `is:important` - label filters
//! - `in:inbox`, `in:sent`, `in:trash`, `in:spam` - label filters
//! - `label:NAME` - arbitrary label, upper-cased
//! - `after:YYYY/M/D` - received on or after midnight UTC of that day
//!
//! `is:read` and `before:` are accepted and have no effect. Anything else,
//! including free text, is ignored.

use chrono::NaiveDate;
use log::debug;

use crate::models::Message;

/// Filters extracted from a mail search query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailQuery {
    /// Every listed label must be present on a message
    pub labels: Vec<String>,
    /// Minimum internal date in milliseconds since the epoch
    pub received_after: Option<i64>,
}

impl MailQuery {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() && self.received_after.is_none()
    }

    pub fn matches(&self, message: &Message) -> bool {
        self.labels.iter().all(|label| message.has_label(label))
            && self
                .received_after
                .is_none_or(|after| message.internal_date >= after)
    }
}

/// Parse a search query into label and date filters
pub fn parse_mail_query(input: &str) -> MailQuery {
    let mut query = MailQuery::default();

    for part in input.split_whitespace() {
        let part = part.to_lowercase();
        let label = match part.as_str() {
            "is:unread" => Some("UNREAD".to_string()),
            // No exclusion filter for UNREAD exists, so is:read filters nothing
            "is:read" => None,
            "is:starred" => Some("STARRED".to_string()),
            "is:important" => Some("IMPORTANT".to_string()),
            "in:inbox" => Some("INBOX".to_string()),
            "in:sent" => Some("SENT".to_string()),
            "in:trash" => Some("TRASH".to_string()),
            "in:spam" => Some("SPAM".to_string()),
            _ => {
                if let Some(name) = part.strip_prefix("label:") {
                    Some(name.to_uppercase())
                } else if let Some(date) = part.strip_prefix("after:") {
                    if let Some(millis) = parse_date_millis(date) {
                        query.received_after = Some(millis);
                    }
                    None
                } else {
                    None
                }
            }
        };
        if let Some(label) = label {
            query.labels.push(label);
        }
    }

    debug!("[QUERY] {:?} -> {:?}", input, query);
    query
}

/// Parse `YYYY/M/D` (zero padding optional) to midnight UTC in milliseconds
fn parse_date_millis(s: &str) -> Option<i64> {
    let date = NaiveDate::parse_from_str(s, "%Y/%m/%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis())
}
