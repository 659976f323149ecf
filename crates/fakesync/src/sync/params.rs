//! Transport listing parameters

use log::warn;

use crate::config::PageLimits;
use crate::storage::TimeRange;

/// Listing parameters as received from a request's query string
///
/// Empty values are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub page_token: Option<String>,
    pub sync_token: Option<String>,
    /// Requested page size (`pageSize` or `maxResults`)
    pub page_size: Option<i64>,
    pub time_min: Option<String>,
    pub time_max: Option<String>,
    /// Search text (`q` or `query`)
    pub query: Option<String>,
    pub start_history_id: Option<u64>,
}

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw key/value pairs; unknown keys are ignored
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let value = value.as_ref().trim();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "pageToken" => params.page_token = Some(value.to_string()),
                "syncToken" => params.sync_token = Some(value.to_string()),
                "pageSize" | "maxResults" => match value.parse::<i64>() {
                    Ok(size) => params.page_size = Some(size),
                    Err(_) => warn!("[PARAMS] Ignoring page size {:?}", value),
                },
                "timeMin" => params.time_min = Some(value.to_string()),
                "timeMax" => params.time_max = Some(value.to_string()),
                "q" | "query" => params.query = Some(value.to_string()),
                "startHistoryId" => match value.parse::<u64>() {
                    Ok(id) => params.start_history_id = Some(id),
                    Err(_) => warn!("[PARAMS] Ignoring startHistoryId {:?}", value),
                },
                _ => {}
            }
        }
        params
    }

    pub fn with_page_token(mut self, token: impl Into<String>) -> Self {
        self.page_token = Some(token.into()).filter(|t: &String| !t.is_empty());
        self
    }

    pub fn with_sync_token(mut self, token: impl Into<String>) -> Self {
        self.sync_token = Some(token.into()).filter(|t: &String| !t.is_empty());
        self
    }

    pub fn with_page_size(mut self, size: i64) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into()).filter(|q: &String| !q.is_empty());
        self
    }

    pub fn with_time_range(mut self, min: Option<&str>, max: Option<&str>) -> Self {
        self.time_min = min.filter(|s| !s.is_empty()).map(str::to_string);
        self.time_max = max.filter(|s| !s.is_empty()).map(str::to_string);
        self
    }

    pub fn with_start_history_id(mut self, id: u64) -> Self {
        self.start_history_id = Some(id);
        self
    }

    /// The sync token, if this request asks for an incremental listing
    pub fn sync_token(&self) -> Option<&str> {
        self.sync_token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn page_token(&self) -> Option<&str> {
        self.page_token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn query(&self) -> &str {
        self.query.as_deref().unwrap_or("")
    }

    /// Effective page size under an endpoint's limits
    pub fn page_size_or(&self, limits: PageLimits) -> usize {
        limits.resolve(self.page_size)
    }

    pub fn time_range(&self) -> TimeRange {
        TimeRange {
            min: self.time_min.clone(),
            max: self.time_max.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pairs() {
        let params = ListParams::from_pairs([
            ("pageToken", "MTA="),
            ("maxResults", "25"),
            ("timeMin", "2025-01-01T00:00:00Z"),
            ("q", "in:inbox"),
            ("startHistoryId", "7"),
            ("alt", "json"),
        ]);
        assert_eq!(params.page_token(), Some("MTA="));
        assert_eq!(params.sync_token(), None);
        assert_eq!(params.page_size, Some(25));
        assert_eq!(params.time_range().min.as_deref(), Some("2025-01-01T00:00:00Z"));
        assert_eq!(params.time_range().max, None);
        assert_eq!(params.query(), "in:inbox");
        assert_eq!(params.start_history_id, Some(7));
    }

    #[test]
    fn test_empty_values_are_absent() {
        let params = ListParams::from_pairs([("syncToken", ""), ("pageToken", "  "), ("query", "")]);
        assert_eq!(params, ListParams::default());
    }

    #[test]
    fn test_bad_numbers_are_ignored() {
        let params = ListParams::from_pairs([("pageSize", "lots"), ("startHistoryId", "-1")]);
        assert_eq!(params.page_size, None);
        assert_eq!(params.start_history_id, None);
    }

    #[test]
    fn test_page_size_resolution() {
        let limits = PageLimits::new(100, 1000);
        assert_eq!(ListParams::new().page_size_or(limits), 100);
        assert_eq!(ListParams::new().with_page_size(0).page_size_or(limits), 100);
        assert_eq!(ListParams::new().with_page_size(2).page_size_or(limits), 2);
        assert_eq!(ListParams::new().with_page_size(5000).page_size_or(limits), 1000);
    }

    #[test]
    fn test_builders_drop_empty_tokens() {
        let params = ListParams::new().with_sync_token("").with_page_token("");
        assert_eq!(params.sync_token(), None);
        assert_eq!(params.page_token(), None);
    }
}
