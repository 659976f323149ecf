//! Per-domain listing entry points

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::Serialize;
use std::sync::Arc;

use super::full::{Page, list_full};
use super::history::HistoryLedger;
use super::incremental::list_incremental;
use super::params::ListParams;
use super::watermark::WatermarkStore;
use crate::actions::ActionHandler;
use crate::clock::{Clock, SystemClock};
use crate::config::{EngineConfig, PageLimits};
use crate::error::{SyncError, SyncResult};
use crate::models::{
    CalendarEvent, Contact, HistoryPage, MailProfile, Message, MessageId, ResourceDomain,
};
use crate::query::parse_mail_query;
use crate::storage::{SqliteSyncStore, SyncStore};

/// Path alias clients use for the authenticated user
pub const SELF_ALIAS: &str = "me";

/// A listing response in either full-sync or incremental mode
///
/// At most one of the two tokens is set. A full-sync page that ends the walk
/// carries `next_sync_token`; an incremental batch always does.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPage<T> {
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
    pub next_sync_token: Option<String>,
}

impl<T> SyncPage<T> {
    pub fn is_incremental_ready(&self) -> bool {
        self.next_sync_token.is_some()
    }

    /// Convert the items, keeping both tokens
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> SyncPage<U> {
        SyncPage {
            items: self.items.into_iter().map(f).collect(),
            next_page_token: self.next_page_token,
            next_sync_token: self.next_sync_token,
        }
    }
}

/// The sync engine shared by every request handler
///
/// Holds no per-client state: every call is a fresh read of the store.
pub struct SyncEngine {
    store: Arc<dyn SyncStore>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl SyncEngine {
    pub fn new(store: Arc<dyn SyncStore>, clock: Arc<dyn Clock>, config: EngineConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Engine over `store` with the wall clock and default limits
    pub fn with_defaults(store: Arc<dyn SyncStore>) -> Self {
        Self::new(store, Arc::new(SystemClock), EngineConfig::default())
    }

    /// Open the SQLite database named by `config`
    pub fn open(config: EngineConfig) -> Result<Self> {
        let path = config
            .database_path()
            .context("Could not determine database location")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        info!("[SYNC] Opening store at {}", path.display());
        let store = SqliteSyncStore::open(&path)?;
        Ok(Self::new(Arc::new(store), Arc::new(SystemClock), config))
    }

    pub fn store(&self) -> &Arc<dyn SyncStore> {
        &self.store
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Mutation entry points sharing this engine's store and clock
    pub fn actions(&self) -> ActionHandler {
        ActionHandler::new(Arc::clone(&self.store), Arc::clone(&self.clock))
    }

    pub fn watermarks(&self) -> WatermarkStore<'_> {
        WatermarkStore::new(self.store.as_ref(), self.clock.as_ref())
    }

    pub fn ledger(&self) -> HistoryLedger<'_> {
        HistoryLedger::new(self.store.as_ref())
    }

    /// Owner key for a request's principal; absent or blank maps to the
    /// configured fallback identity
    pub fn resolve_owner(&self, principal: Option<&str>) -> String {
        match principal.map(str::trim) {
            Some(p) if !p.is_empty() => p.to_string(),
            _ => self.config.default_user.clone(),
        }
    }

    /// Owner key for a `users/{userId}` path segment, expanding `me`
    pub fn resolve_user_id(&self, user_id: &str, principal: Option<&str>) -> String {
        if user_id == SELF_ALIAS || user_id.trim().is_empty() {
            self.resolve_owner(principal)
        } else {
            user_id.to_string()
        }
    }

    // === Mail ===

    /// Newest-first message listing; `q` narrows by label and date
    pub fn list_messages(&self, owner: &str, params: &ListParams) -> SyncResult<Page<Message>> {
        let limit = params.page_size_or(self.config.messages);
        let query = parse_mail_query(params.query());
        debug!("[SYNC] list_messages {} limit={} query={:?}", owner, limit, query);

        let page = list_full(limit, params.page_token(), |offset, limit| {
            self.store.list_messages(owner, &query, limit, offset)
        })?;
        Ok(page)
    }

    /// Replay the owner's mail history from `startHistoryId` (default 1)
    pub fn list_history(&self, owner: &str, params: &ListParams) -> SyncResult<HistoryPage> {
        let start = params.start_history_id.unwrap_or(1);
        let limit = params.page_size_or(self.config.history);
        debug!("[SYNC] list_history {} from {} limit={}", owner, start, limit);
        Ok(self
            .ledger()
            .list_since(owner, start, limit, params.page_token())?)
    }

    pub fn profile(&self, owner: &str) -> SyncResult<MailProfile> {
        Ok(MailProfile {
            email_address: format!("{}@example.com", owner),
            messages_total: self.store.count_messages(owner)?,
            threads_total: self.store.count_threads(owner)?,
            history_id: self.ledger().current(owner)?,
        })
    }

    pub fn get_message(&self, owner: &str, id: &str) -> SyncResult<Message> {
        self.store
            .get_message(owner, &MessageId::new(id))?
            .ok_or_else(|| SyncError::not_found("message", id))
    }

    // === Calendar ===

    /// Events of one calendar, in full-sync or incremental mode
    pub fn list_events(
        &self,
        calendar_id: &str,
        params: &ListParams,
    ) -> SyncResult<SyncPage<CalendarEvent>> {
        let range = params.time_range();
        self.dispatch(
            ResourceDomain::Calendar,
            calendar_id,
            params,
            self.config.events,
            |offset, limit| self.store.list_events(calendar_id, &range, limit, offset),
            |since, limit| self.store.list_events_since(calendar_id, since, limit),
        )
    }

    pub fn get_event(&self, calendar_id: &str, event_id: &str) -> SyncResult<CalendarEvent> {
        self.store
            .get_event(calendar_id, event_id)?
            .ok_or_else(|| SyncError::not_found("event", event_id))
    }

    // === Contacts ===

    /// The owner's connections, in full-sync or incremental mode
    pub fn list_connections(
        &self,
        owner: &str,
        params: &ListParams,
    ) -> SyncResult<SyncPage<Contact>> {
        self.dispatch(
            ResourceDomain::Contacts,
            owner,
            params,
            self.config.connections,
            |offset, limit| self.store.list_contacts(owner, None, limit, offset),
            |since, limit| self.store.list_contacts_since(owner, since, limit),
        )
    }

    /// Contacts whose data contains the query text; no sync token is issued
    pub fn search_contacts(&self, owner: &str, params: &ListParams) -> SyncResult<Page<Contact>> {
        let limit = params.page_size_or(self.config.contact_search);
        let search = params.query();
        let page = list_full(limit, params.page_token(), |offset, limit| {
            self.store.list_contacts(owner, Some(search), limit, offset)
        })?;
        Ok(page)
    }

    pub fn get_contact(&self, owner: &str, resource_name: &str) -> SyncResult<Contact> {
        self.store
            .get_contact(owner, resource_name)?
            .ok_or_else(|| SyncError::not_found("contact", resource_name))
    }

    /// Choose between full and incremental listing for one owner
    ///
    /// A sync token takes precedence over every other parameter. A full walk
    /// that reaches its end reissues the owner's watermark so the client can
    /// switch to incremental mode.
    fn dispatch<T, F, S>(
        &self,
        domain: ResourceDomain,
        owner: &str,
        params: &ListParams,
        limits: PageLimits,
        full: F,
        since: S,
    ) -> SyncResult<SyncPage<T>>
    where
        F: FnOnce(u64, usize) -> Result<Vec<T>>,
        S: FnOnce(DateTime<Utc>, usize) -> Result<Vec<T>>,
    {
        let limit = params.page_size_or(limits);
        let marks = self.watermarks();

        if let Some(sync_token) = params.sync_token() {
            debug!("[SYNC] {} incremental for {}", domain, owner);
            let now = self.clock.now();
            let delta = list_incremental(&marks, now, domain, owner, sync_token, limit, since)?;
            return Ok(SyncPage {
                items: delta.items,
                next_page_token: None,
                next_sync_token: Some(delta.next_sync_token),
            });
        }

        debug!("[SYNC] {} full sync for {} limit={}", domain, owner, limit);
        let page = list_full(limit, params.page_token(), full)?;
        let next_sync_token = if page.is_last() {
            Some(marks.remint(domain, owner)?)
        } else {
            None
        };

        Ok(SyncPage {
            items: page.items,
            next_page_token: page.next_page_token,
            next_sync_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::models::{Record, ResourceItem};
    use crate::storage::InMemorySyncStore;
    use crate::token;
    use chrono::{Duration, TimeZone};

    fn engine() -> (SyncEngine, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap(),
        ));
        let engine = SyncEngine::new(
            Arc::new(InMemorySyncStore::new()),
            clock.clone(),
            EngineConfig::default(),
        );
        (engine, clock)
    }

    #[test]
    fn test_resolve_owner() {
        let (engine, _) = engine();
        assert_eq!(engine.resolve_owner(None), "default");
        assert_eq!(engine.resolve_owner(Some("  ")), "default");
        assert_eq!(engine.resolve_owner(Some("alice")), "alice");
        assert_eq!(engine.resolve_user_id("me", Some("alice")), "alice");
        assert_eq!(engine.resolve_user_id("me", None), "default");
        assert_eq!(engine.resolve_user_id("bob", Some("alice")), "bob");
    }

    #[test]
    fn test_sync_token_wins_over_filters() {
        let (engine, clock) = engine();
        let actions = engine.actions();
        actions
            .create_event(
                CalendarEvent::new("", "primary", "Review")
                    .with_times("2025-06-03T10:00:00Z", "2025-06-03T11:00:00Z"),
            )
            .unwrap();
        clock.advance(Duration::seconds(2));

        // The time range would exclude the event; the sync token ignores it
        let params = ListParams::new()
            .with_sync_token(token::encode(0))
            .with_page_token(token::encode(40))
            .with_time_range(Some("2030-01-01T00:00:00Z"), None);
        let page = engine.list_events("primary", &params).unwrap();
        assert_eq!(page.items.len(), 1);
        assert!(page.next_page_token.is_none());
        assert!(page.next_sync_token.is_some());
    }

    #[test]
    fn test_full_walk_end_issues_sync_token() {
        let (engine, _) = engine();
        let actions = engine.actions();
        for name in ["Ann", "Bo", "Cy"] {
            actions
                .create_contact("alice", Contact::person_data(name, "x@example.com"))
                .unwrap();
        }

        let first = engine
            .list_connections("alice", &ListParams::new().with_page_size(2))
            .unwrap();
        assert_eq!(first.items.len(), 2);
        assert!(first.next_page_token.is_some());
        assert!(first.next_sync_token.is_none());

        let params = ListParams::new()
            .with_page_size(2)
            .with_page_token(first.next_page_token.unwrap());
        let last = engine.list_connections("alice", &params).unwrap();
        assert_eq!(last.items.len(), 1);
        assert!(last.next_page_token.is_none());
        assert!(last.is_incremental_ready());
    }

    #[test]
    fn test_point_lookups_report_not_found() {
        let (engine, _) = engine();
        assert!(engine.get_message("alice", "nope").unwrap_err().is_not_found());
        assert!(engine.get_event("primary", "nope").unwrap_err().is_not_found());
        assert!(engine.get_contact("alice", "people/nope").unwrap_err().is_not_found());
    }

    #[test]
    fn test_profile_of_empty_mailbox() {
        let (engine, _) = engine();
        let profile = engine.profile("alice").unwrap();
        assert_eq!(profile.email_address, "alice@example.com");
        assert_eq!(profile.messages_total, 0);
        assert_eq!(profile.history_id, 1);
    }

    #[test]
    fn test_page_maps_into_tagged_items() {
        let (engine, _) = engine();
        engine
            .actions()
            .create_event(CalendarEvent::new("evt_1", "primary", "Standup"))
            .unwrap();

        let page = engine
            .list_events("primary", &ListParams::new())
            .unwrap()
            .map(ResourceItem::from);
        assert!(page.is_incremental_ready());
        assert_eq!(page.items[0].domain(), ResourceDomain::Calendar);
        assert_eq!(page.items[0].container(), "primary");

        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["items"][0]["kind"], "event");
        assert_eq!(json["items"][0]["id"], "evt_1");
        assert!(json["nextSyncToken"].is_string());
    }
}
