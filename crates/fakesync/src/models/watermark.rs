//! Persisted sync watermarks

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The API family a watermark belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceDomain {
    Mail,
    Calendar,
    Contacts,
}

impl ResourceDomain {
    pub const ALL: [ResourceDomain; 3] = [Self::Mail, Self::Calendar, Self::Contacts];

    /// Stable key used in storage
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mail => "gmail",
            Self::Calendar => "calendar",
            Self::Contacts => "people",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s) || format!("{d:?}").eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for ResourceDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The most recently issued sync token for one (domain, owner)
///
/// One row per pair; overwritten rather than versioned on every remint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncWatermark {
    pub domain: ResourceDomain,
    /// Owning user, or calendar id for the calendar domain
    pub owner_key: String,
    pub token: String,
    pub issued_at: DateTime<Utc>,
}

impl SyncWatermark {
    pub fn new(
        domain: ResourceDomain,
        owner_key: impl Into<String>,
        token: impl Into<String>,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            domain,
            owner_key: owner_key.into(),
            token: token.into(),
            issued_at,
        }
    }
}
