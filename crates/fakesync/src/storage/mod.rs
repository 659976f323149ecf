//! Storage traits and implementations
//!
//! The sync engine reads and writes through [`SyncStore`]. Two backends are
//! provided: SQLite for running the fake as a service, and an in-memory
//! store for tests.

mod memory;
mod sqlite;
mod traits;

use chrono::{DateTime, SecondsFormat, Utc};

pub use memory::InMemorySyncStore;
pub use sqlite::SqliteSyncStore;
pub use traits::{SyncStore, TimeRange};

/// Text form of a last-modified stamp
///
/// Stamps keep whole seconds only; incremental sync compares them against a
/// boundary rendered the same way.
pub(crate) fn stamp_text(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) fn parse_stamp(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}
