//! Per (domain, owner) sync token bookkeeping

use anyhow::Result;
use chrono::{DateTime, Utc};
use log::info;

use crate::clock::Clock;
use crate::models::{ResourceDomain, SyncWatermark};
use crate::storage::SyncStore;
use crate::token;

/// Issues sync tokens and remembers the last one handed out per owner
///
/// Tokens are minted from the clock, so a token always names the instant it
/// was issued at. Concurrent issuers for the same owner are last-writer-wins.
pub struct WatermarkStore<'a> {
    store: &'a dyn SyncStore,
    clock: &'a dyn Clock,
}

impl<'a> WatermarkStore<'a> {
    pub fn new(store: &'a dyn SyncStore, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    /// The stored token for this owner, minting and persisting one if absent
    pub fn get_or_create(&self, domain: ResourceDomain, owner_key: &str) -> Result<String> {
        if let Some(existing) = self.store.get_watermark(domain, owner_key)? {
            return Ok(existing.token);
        }
        let stored = self
            .store
            .insert_watermark_if_absent(mint(domain, owner_key, self.clock.now()))?;
        Ok(stored.token)
    }

    /// Mint a token at the current instant and overwrite the stored one
    pub fn remint(&self, domain: ResourceDomain, owner_key: &str) -> Result<String> {
        self.remint_at(domain, owner_key, self.clock.now())
    }

    /// Mint a token naming `at` and overwrite the stored one
    pub fn remint_at(
        &self,
        domain: ResourceDomain,
        owner_key: &str,
        at: DateTime<Utc>,
    ) -> Result<String> {
        let watermark = mint(domain, owner_key, at);
        let token = watermark.token.clone();
        self.store.save_watermark(watermark)?;
        info!("[SYNC] Issued {} sync token for {}", domain, owner_key);
        Ok(token)
    }

    /// The last token issued for this owner, if any
    pub fn current(&self, domain: ResourceDomain, owner_key: &str) -> Result<Option<String>> {
        Ok(self
            .store
            .get_watermark(domain, owner_key)?
            .map(|w| w.token))
    }
}

fn mint(domain: ResourceDomain, owner_key: &str, at: DateTime<Utc>) -> SyncWatermark {
    SyncWatermark::new(domain, owner_key, token::encode_timestamp(at), at)
}
