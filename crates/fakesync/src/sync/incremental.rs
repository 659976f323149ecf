//! Incremental (delta) listing driven by sync tokens

use anyhow::Result;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::Serialize;

use super::watermark::WatermarkStore;
use crate::models::ResourceDomain;
use crate::token;

/// Records changed since a sync token, plus the token to use next time
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Delta<T> {
    pub items: Vec<T>,
    /// Always present, even when `items` is empty
    pub next_sync_token: String,
}

/// List records modified strictly after the instant named by `sync_token`
///
/// `fetch(since, limit)` returns at most `limit` records whose stamp is newer
/// than `since`, oldest first. The batch is not paginated: anything past
/// `limit` is picked up by the next call with the returned token.
///
/// The next token names the instant just before the fetch. Stamps and the
/// boundary are compared at whole seconds, so a write stamped later in the
/// same second as that instant is never reported by a delta. Callers that
/// need it must run a full sync.
pub fn list_incremental<T, F>(
    marks: &WatermarkStore<'_>,
    now: DateTime<Utc>,
    domain: ResourceDomain,
    owner_key: &str,
    sync_token: &str,
    limit: usize,
    fetch: F,
) -> Result<Delta<T>>
where
    F: FnOnce(DateTime<Utc>, usize) -> Result<Vec<T>>,
{
    let since = token::decode_timestamp(sync_token);
    if since == DateTime::UNIX_EPOCH && sync_token != token::encode(0) {
        warn!(
            "[SYNC] Unreadable {} sync token for {}, replaying from the epoch",
            domain, owner_key
        );
    }

    let items = fetch(since, limit.max(1))?;
    let next_sync_token = marks.remint_at(domain, owner_key, now)?;

    debug!(
        "[SYNC] {} delta for {} since {}: {} items",
        domain,
        owner_key,
        since.to_rfc3339(),
        items.len()
    );

    Ok(Delta {
        items,
        next_sync_token,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::storage::InMemorySyncStore;
    use chrono::{Duration, TimeZone};

    fn stamps() -> Vec<DateTime<Utc>> {
        (0..4)
            .map(|i| Utc.with_ymd_and_hms(2025, 4, 1, 9, 0, i * 10).unwrap())
            .collect()
    }

    fn fetch_after(rows: &[DateTime<Utc>]) -> impl FnOnce(DateTime<Utc>, usize) -> Result<Vec<DateTime<Utc>>> + '_ {
        move |since, limit| Ok(rows.iter().filter(|s| **s > since).take(limit).copied().collect())
    }

    #[test]
    fn test_delta_after_boundary() {
        let store = InMemorySyncStore::new();
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 4, 1, 10, 0, 0).unwrap());
        let marks = WatermarkStore::new(&store, &clock);
        let rows = stamps();

        let token = token::encode_timestamp(rows[1]);
        let delta = list_incremental(
            &marks,
            clock.now(),
            ResourceDomain::Calendar,
            "primary",
            &token,
            10,
            fetch_after(&rows),
        )
        .unwrap();

        assert_eq!(delta.items, vec![rows[2], rows[3]]);
        assert_eq!(token::decode_timestamp(&delta.next_sync_token), clock.now());
    }

    #[test]
    fn test_empty_delta_still_mints_token() {
        let store = InMemorySyncStore::new();
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 4, 1, 10, 0, 0).unwrap());
        let marks = WatermarkStore::new(&store, &clock);

        let first = list_incremental(
            &marks,
            clock.now(),
            ResourceDomain::Contacts,
            "alice",
            &token::encode_timestamp(clock.now()),
            10,
            |_, _| Ok(Vec::<u8>::new()),
        )
        .unwrap();
        assert!(first.items.is_empty());
        assert!(!first.next_sync_token.is_empty());

        let later = clock.advance(Duration::seconds(1));
        let second = list_incremental(
            &marks,
            later,
            ResourceDomain::Contacts,
            "alice",
            &first.next_sync_token,
            10,
            |_, _| Ok(Vec::<u8>::new()),
        )
        .unwrap();
        assert_ne!(second.next_sync_token, first.next_sync_token);
        assert_eq!(
            marks.current(ResourceDomain::Contacts, "alice").unwrap(),
            Some(second.next_sync_token)
        );
    }

    #[test]
    fn test_malformed_token_replays_everything() {
        let store = InMemorySyncStore::new();
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 4, 1, 10, 0, 0).unwrap());
        let marks = WatermarkStore::new(&store, &clock);
        let rows = stamps();

        let delta = list_incremental(
            &marks,
            clock.now(),
            ResourceDomain::Calendar,
            "primary",
            "not-a-token",
            10,
            fetch_after(&rows),
        )
        .unwrap();
        assert_eq!(delta.items.len(), rows.len());
    }

    #[test]
    fn test_batch_is_capped() {
        let store = InMemorySyncStore::new();
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 4, 1, 10, 0, 0).unwrap());
        let marks = WatermarkStore::new(&store, &clock);
        let rows = stamps();

        let delta = list_incremental(
            &marks,
            clock.now(),
            ResourceDomain::Calendar,
            "primary",
            &token::encode(0),
            2,
            fetch_after(&rows),
        )
        .unwrap();
        assert_eq!(delta.items, vec![rows[0], rows[1]]);
    }
}
