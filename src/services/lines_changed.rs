//! Lines-changed engine
//!
//! For every known repository the engine fetches contributor statistics,
//! keeps the target account's weekly additions and deletions, and merges the
//! result into the durable cache. A repository whose fetch fails falls back
//! to its previous cache entry, if there is one.
//!
//! Per-language attribution uses the repository's current language mix, even
//! for lines written when the mix was different.

use std::collections::{BTreeSet, HashMap};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::cache::CacheStore;
use crate::github::rest_types::ContributorStats;
use crate::github::{RequestGateway, RestResponse, Transport};
use crate::types::{CacheEntry, ContributionCache, LanguageShares, LineChanges, NameWithOwner, User};

/// Result of one repository's contributor statistics fetch
#[derive(Debug, Clone, PartialEq)]
pub enum ContributorFetch {
    /// The list came back; carries the account's totals (zero if absent)
    Success(LineChanges),
    Failed(String),
}

impl ContributorFetch {
    pub fn from_response(response: RestResponse, username: &User) -> Self {
        match response {
            RestResponse::Success(Value::Array(authors)) => {
                let mut changes = LineChanges::default();
                for author in authors {
                    let Ok(stats) = serde_json::from_value::<ContributorStats>(author) else {
                        continue;
                    };
                    // Exact login match; a differently cased login is another author
                    let is_target = stats
                        .author
                        .as_ref()
                        .is_some_and(|author| author.login == username.as_str());
                    if !is_target {
                        continue;
                    }
                    for week in &stats.weeks {
                        changes += LineChanges::new(week.a, week.d);
                    }
                }
                Self::Success(changes)
            }
            RestResponse::Success(_) => Self::Failed("response is not a list".to_string()),
            RestResponse::Pending => Self::Failed("statistics are still being computed".to_string()),
            RestResponse::Malformed(reason) => Self::Failed(reason),
        }
    }
}

pub struct LinesChangedEngine<'a, T> {
    gateway: &'a RequestGateway<T>,
    username: &'a User,
    language_shares: &'a HashMap<NameWithOwner, LanguageShares>,
}

impl<'a, T: Transport> LinesChangedEngine<'a, T> {
    pub fn new(
        gateway: &'a RequestGateway<T>,
        username: &'a User,
        language_shares: &'a HashMap<NameWithOwner, LanguageShares>,
    ) -> Self {
        Self {
            gateway,
            username,
            language_shares,
        }
    }

    /// Loads the cache, fetches every repository, merges and rewrites the cache.
    pub async fn compute(
        &self,
        repos: &BTreeSet<NameWithOwner>,
        store: &CacheStore,
    ) -> Result<LineChanges> {
        let previous = store.load();
        debug!(
            "Loaded {} cache entries from {}",
            previous.len(),
            store.path().display()
        );

        let fetches = self.fetch_all(repos).await?;
        let (updated, totals) = self.merge(&previous, fetches, Utc::now());

        store
            .save(&updated)
            .with_context(|| format!("Failed to save cache to {}", store.path().display()))?;

        info!(
            "Lines changed across {} repositories: +{} -{}",
            repos.len(),
            totals.additions,
            totals.deletions
        );
        Ok(totals)
    }

    async fn fetch_all(
        &self,
        repos: &BTreeSet<NameWithOwner>,
    ) -> Result<Vec<(NameWithOwner, ContributorFetch)>> {
        let concurrency = self.gateway.options().max_connections.max(1);

        let results: Vec<Result<(NameWithOwner, ContributorFetch)>> =
            stream::iter(repos.iter().cloned())
                .map(|repo| async move {
                    let response = self
                        .gateway
                        .query_paged(&repo.contributor_stats_path(), &[])
                        .await?;
                    let fetch = ContributorFetch::from_response(response, self.username);
                    Ok::<_, anyhow::Error>((repo, fetch))
                })
                .buffered(concurrency)
                .collect()
                .await;

        results.into_iter().collect()
    }

    /// Merges fetch outcomes into a copy of `previous`.
    ///
    /// Entries of repositories not fetched this run are carried over as-is.
    pub fn merge(
        &self,
        previous: &ContributionCache,
        fetches: Vec<(NameWithOwner, ContributorFetch)>,
        now: DateTime<Utc>,
    ) -> (ContributionCache, LineChanges) {
        let mut updated = previous.clone();
        let mut totals = LineChanges::default();

        for (repo, fetch) in fetches {
            match fetch {
                ContributorFetch::Success(changes) => {
                    let languages = changes.attribute(self.language_shares.get(&repo));
                    updated.insert(repo, CacheEntry::new(changes, languages, now));
                    totals += changes;
                }
                ContributorFetch::Failed(reason) => {
                    warn!(
                        "Failed to fetch contributions for {}: {}. Using cache if available.",
                        repo, reason
                    );
                    match previous.get(&repo) {
                        Some(entry) => {
                            warn!("Using cached data for {}", repo);
                            totals += entry.changes();
                        }
                        None => warn!("No cache available for {}. Skipping.", repo),
                    }
                }
            }
        }

        (updated, totals)
    }
}
