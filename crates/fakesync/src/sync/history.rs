//! Mail history ledger
//!
//! Each owner has one counter. Every message added to a mailbox advances it
//! and records the new value on the message, so replaying from a value
//! yields exactly the messages added at or after it.

use anyhow::Result;
use log::debug;

use super::full::list_full;
use crate::models::{HistoryEntry, HistoryPage};
use crate::storage::SyncStore;

/// Counter value reported for an owner whose ledger never moved
pub const INITIAL_HISTORY_ID: u64 = 1;

pub struct HistoryLedger<'a> {
    store: &'a dyn SyncStore,
}

impl<'a> HistoryLedger<'a> {
    pub fn new(store: &'a dyn SyncStore) -> Self {
        Self { store }
    }

    /// Increment the owner's counter and return the new value
    pub fn advance(&self, owner_key: &str) -> Result<u64> {
        let value = self.store.advance_history(owner_key)?;
        debug!("[HISTORY] {} advanced to {}", owner_key, value);
        Ok(value)
    }

    /// Top of the owner's ledger
    pub fn current(&self, owner_key: &str) -> Result<u64> {
        Ok(self
            .store
            .current_history(owner_key)?
            .unwrap_or(INITIAL_HISTORY_ID))
    }

    /// Replay messages recorded at or after `start_history_id`
    ///
    /// Entries are ordered by recorded value, windowed like a full-sync page.
    pub fn list_since(
        &self,
        owner_key: &str,
        start_history_id: u64,
        limit: usize,
        page_token: Option<&str>,
    ) -> Result<HistoryPage> {
        let page = list_full(limit, page_token, |offset, limit| {
            self.store
                .list_messages_from_history(owner_key, start_history_id, limit, offset)
        })?;

        let entries = page
            .items
            .into_iter()
            .map(|message| HistoryEntry {
                id: message.history_id.unwrap_or(0),
                messages_added: vec![message],
            })
            .collect();

        Ok(HistoryPage {
            entries,
            history_id: self.current(owner_key)?,
            next_page_token: page.next_page_token,
        })
    }
}
