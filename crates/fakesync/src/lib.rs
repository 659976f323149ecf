//! Fakesync - pagination and incremental sync for fake cloud APIs
//!
//! This crate provides the listing core behind fake mail, calendar and
//! contacts endpoints:
//! - Opaque cursor encoding (page tokens, sync tokens)
//! - Storage trait abstractions with SQLite and in-memory backends
//! - Full-sync windows, incremental deltas and the mail history ledger
//! - A per-domain dispatcher that picks between them
//! - Action handlers for the mutations that feed incremental sync
//!
//! HTTP routing and JSON envelopes are left to the caller.

pub mod actions;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod query;
pub mod storage;
pub mod sync;
pub mod token;

pub use actions::{ActionHandler, OutgoingMessage};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{EngineConfig, PageLimits};
pub use error::{SyncError, SyncResult};
pub use models::{
    Calendar, CalendarEvent, Contact, HistoryEntry, HistoryPage, MailProfile, Message, MessageId,
    Record, ResourceDomain, ResourceItem, SyncWatermark, Thread, ThreadId,
};
pub use query::{MailQuery, parse_mail_query};
pub use storage::{InMemorySyncStore, SqliteSyncStore, SyncStore, TimeRange};
pub use sync::{
    // Dispatcher
    ListParams, SyncEngine, SyncPage,
    // Listers
    Delta, HistoryLedger, Page, WatermarkStore, list_full, list_incremental,
};
pub use token::PageCursor;
