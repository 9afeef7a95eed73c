//! Repository domain types
//!
//! Repositories are identified by their `owner/name` string, the same form the
//! GraphQL API reports as `nameWithOwner`. That identity is the key for the
//! per-run repository sets and for the persisted contribution cache.

use serde::{Deserialize, Serialize};

use super::language::{LanguageFilter, LanguageShares, LanguageSize};
use crate::github::graphql::graphql_types::overview::RepositoryNode;

/// Repository identity in `owner/name` form
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NameWithOwner(pub String);

impl NameWithOwner {
    pub fn new<T: Into<String>>(name_with_owner: T) -> Self {
        Self(name_with_owner.into())
    }

    /// Get the string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Owner part, if the identity contains a `/`
    pub fn owner(&self) -> Option<&str> {
        self.0.split_once('/').map(|(owner, _)| owner)
    }

    /// Repository name part, if the identity contains a `/`
    pub fn name(&self) -> Option<&str> {
        self.0.split_once('/').map(|(_, name)| name)
    }

    /// REST path of the contributor weekly statistics endpoint
    pub fn contributor_stats_path(&self) -> String {
        format!("/repos/{}/stats/contributors", self.0)
    }

    /// REST path of the traffic views endpoint
    pub fn traffic_views_path(&self) -> String {
        format!("/repos/{}/traffic/views", self.0)
    }
}

impl std::fmt::Display for NameWithOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for NameWithOwner {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for NameWithOwner {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A repository as seen on one page of the overview query
#[derive(Debug, Clone, PartialEq)]
pub struct RepositoryRecord {
    pub name_with_owner: NameWithOwner,
    pub stargazers: u64,
    pub forks: u64,
    pub languages: Vec<LanguageSize>,
}

impl RepositoryRecord {
    /// Languages that survive the configured exclusion filter
    pub fn counted_languages<'a>(
        &'a self,
        filter: &'a LanguageFilter,
    ) -> impl Iterator<Item = &'a LanguageSize> + 'a {
        self.languages
            .iter()
            .filter(move |language| !filter.is_excluded(&language.name))
    }

    /// Proportional share of each counted language in this repository.
    ///
    /// Returns `None` when the counted languages total zero bytes.
    pub fn language_shares(&self, filter: &LanguageFilter) -> Option<LanguageShares> {
        LanguageShares::from_sizes(
            self.counted_languages(filter)
                .map(|language| (language.name.as_str(), language.size)),
        )
    }
}

impl From<RepositoryNode> for RepositoryRecord {
    fn from(node: RepositoryNode) -> Self {
        let languages = node
            .languages
            .map(|connection| {
                connection
                    .edges
                    .into_iter()
                    .map(|edge| LanguageSize {
                        name: edge.node.name,
                        size: edge.size,
                        color: edge.node.color,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            name_with_owner: NameWithOwner(node.name_with_owner),
            stargazers: node.stargazers.total_count,
            forks: node.fork_count,
            languages,
        }
    }
}
