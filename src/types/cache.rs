//! Persisted contribution cache document
//!
//! The on-disk shape is:
//!
//! ```json
//! {
//!   "repositories": {
//!     "owner/name": {
//!       "additions": 10,
//!       "deletions": 2,
//!       "last_updated": "2024-05-01T12:00:00.000000Z",
//!       "languages": { "Rust": { "additions": 10, "deletions": 2 } }
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::language::LanguageShares;
use super::lenient::{null_as_default, skip_invalid_entries};
use super::repository::NameWithOwner;

/// Language used when a repository has no share record
pub const UNKNOWN_LANGUAGE: &str = "Unknown";

/// Additions and deletions pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineChanges {
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
}

impl LineChanges {
    pub fn new(additions: u64, deletions: u64) -> Self {
        Self {
            additions,
            deletions,
        }
    }

    /// Additions plus deletions
    pub fn changed(&self) -> u64 {
        self.additions + self.deletions
    }

    /// Splits these totals across languages by share, truncating each part.
    /// With no shares everything lands on [`UNKNOWN_LANGUAGE`].
    pub fn attribute(&self, shares: Option<&LanguageShares>) -> BTreeMap<String, LineChanges> {
        match shares {
            Some(shares) => shares
                .iter()
                .map(|(language, share)| {
                    (
                        language.to_string(),
                        LineChanges {
                            additions: (self.additions as f64 * share) as u64,
                            deletions: (self.deletions as f64 * share) as u64,
                        },
                    )
                })
                .collect(),
            None => BTreeMap::from([(UNKNOWN_LANGUAGE.to_string(), *self)]),
        }
    }
}

impl std::ops::AddAssign for LineChanges {
    fn add_assign(&mut self, other: Self) {
        self.additions += other.additions;
        self.deletions += other.deletions;
    }
}

/// Cached line counts for one repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub additions: u64,
    pub deletions: u64,
    /// Kept verbatim so entries copied forward stay identical
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_updated: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub languages: BTreeMap<String, LineChanges>,
}

impl CacheEntry {
    /// Fresh entry stamped with `updated_at`
    pub fn new(
        changes: LineChanges,
        languages: BTreeMap<String, LineChanges>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            additions: changes.additions,
            deletions: changes.deletions,
            last_updated: updated_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            languages,
        }
    }

    pub fn changes(&self) -> LineChanges {
        LineChanges::new(self.additions, self.deletions)
    }

    /// Parsed `last_updated`, if it is a valid RFC 3339 timestamp
    pub fn last_updated_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.last_updated)
            .ok()
            .map(|timestamp| timestamp.with_timezone(&Utc))
    }
}

/// The whole cache document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContributionCache {
    /// Entries that fail to decode are dropped on load
    #[serde(default, deserialize_with = "skip_invalid_entries")]
    pub repositories: BTreeMap<NameWithOwner, CacheEntry>,
}

impl ContributionCache {
    pub fn get(&self, repository: &NameWithOwner) -> Option<&CacheEntry> {
        self.repositories.get(repository)
    }

    pub fn insert(&mut self, repository: NameWithOwner, entry: CacheEntry) {
        self.repositories.insert(repository, entry);
    }

    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }
}
