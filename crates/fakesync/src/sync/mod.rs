//! Pagination and incremental sync
//!
//! A listing request goes through [`SyncEngine`], which picks one of:
//! - a full-sync window ([`list_full`]) when no sync token is supplied,
//!   reissuing the owner's watermark once the walk is exhausted;
//! - an incremental delta ([`list_incremental`]) when one is;
//! - a history replay ([`HistoryLedger::list_since`]) for mail.

mod dispatch;
mod full;
mod history;
mod incremental;
mod params;
mod watermark;

pub use dispatch::{SELF_ALIAS, SyncEngine, SyncPage};
pub use full::{Page, list_full};
pub use history::{HistoryLedger, INITIAL_HISTORY_ID};
pub use incremental::{Delta, list_incremental};
pub use params::ListParams;
pub use watermark::WatermarkStore;
