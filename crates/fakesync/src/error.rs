//! Errors surfaced by the sync engine

use thiserror::Error;

/// Failure of an engine operation
///
/// Malformed cursors are not represented here; they decode to a default.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The backing store failed; carries the store's context chain
    #[error(transparent)]
    Storage(#[from] anyhow::Error),

    /// A point lookup or mutation named a record that does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
}

impl SyncError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_not_found_message() {
        let err = SyncError::not_found("event", "evt_1");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "event not found: evt_1");
    }

    #[test]
    fn test_storage_is_transparent() {
        let inner: anyhow::Result<()> = Err(anyhow::anyhow!("disk full")).context("writing row");
        let err = SyncError::from(inner.unwrap_err());
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "writing row");
    }
}
