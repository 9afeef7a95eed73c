//! Repository collector
//!
//! Walks the owned and contributed-to repository lists of the viewer in one
//! combined paginated query and folds every page into a deduplicated
//! [`RepositoryOverview`].

use std::collections::{BTreeSet, HashMap};

use anyhow::Result;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::StatsConfig;
use crate::github::graphql::graphql_types::{
    GraphQLPayload, GraphQLQuery, GraphQLResponse, ViewerNode, ViewerOverviewResponse,
};
use crate::github::graphql::overview::{OverviewVariable, repositories_overview_query};
use crate::github::{RequestGateway, Transport};
use crate::types::{LanguageAggregate, LanguageShares, NameWithOwner, RepositoryRecord};

/// Display name used when the viewer has neither a name nor a login
pub const FALLBACK_DISPLAY_NAME: &str = "No Name";

/// Everything the collector learned about the viewer's repositories
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepositoryOverview {
    pub name: String,
    pub stargazers: u64,
    pub forks: u64,
    /// Repositories counted toward stars, forks and languages
    pub repos: BTreeSet<NameWithOwner>,
    /// Contributed-to repositories held out of the owned totals
    pub ignored_repos: BTreeSet<NameWithOwner>,
    pub languages: LanguageAggregate,
    /// Language shares of admitted repositories with a nonzero byte total
    pub language_shares: HashMap<NameWithOwner, LanguageShares>,
}

impl RepositoryOverview {
    /// Owned plus held-out repositories
    pub fn all_repos(&self) -> BTreeSet<NameWithOwner> {
        self.repos.union(&self.ignored_repos).cloned().collect()
    }
}

/// Pure page-merging state of the collector
pub struct OverviewAccumulator<'a> {
    config: &'a StatsConfig,
    display_name: Option<String>,
    overview: RepositoryOverview,
}

impl<'a> OverviewAccumulator<'a> {
    pub fn new(config: &'a StatsConfig) -> Self {
        Self {
            config,
            display_name: None,
            overview: RepositoryOverview::default(),
        }
    }

    /// Merges one page of both lists.
    pub fn absorb_viewer(&mut self, viewer: ViewerNode) {
        let display_name = viewer
            .name
            .filter(|name| !name.is_empty())
            .or(viewer.login.filter(|login| !login.is_empty()));
        if display_name.is_some() {
            self.display_name = display_name;
        }

        let owned = viewer
            .repositories
            .nodes
            .into_iter()
            .map(RepositoryRecord::from);
        let contributed = viewer
            .repositories_contributed_to
            .nodes
            .into_iter()
            .map(RepositoryRecord::from);

        let mut candidates: Vec<RepositoryRecord> = owned.collect();
        if self.config.consider_forked_repos {
            candidates.extend(contributed);
        } else {
            for record in contributed {
                self.hold_out(record.name_with_owner);
            }
        }

        for record in candidates {
            self.admit(record);
        }
    }

    /// Records a contributed-to repository for counting purposes only.
    pub fn hold_out(&mut self, repository: NameWithOwner) -> bool {
        if self.config.is_repo_excluded(&repository)
            || self.overview.ignored_repos.contains(&repository)
        {
            return false;
        }
        self.overview.ignored_repos.insert(repository)
    }

    /// Counts a repository toward the owned totals; repeated or excluded
    /// repositories are skipped entirely.
    pub fn admit(&mut self, record: RepositoryRecord) -> bool {
        let repository = &record.name_with_owner;
        if self.overview.repos.contains(repository) || self.config.is_repo_excluded(repository) {
            debug!("Skipping repository {}", repository);
            return false;
        }

        self.overview.stargazers += record.stargazers;
        self.overview.forks += record.forks;

        if let Some(shares) = record.language_shares(&self.config.exclude_langs) {
            self.overview
                .language_shares
                .insert(repository.clone(), shares);
        }
        for language in record.counted_languages(&self.config.exclude_langs) {
            self.overview.languages.record(language);
        }

        self.overview.repos.insert(record.name_with_owner)
    }

    /// Computes language percentages and returns the overview.
    pub fn finish(mut self) -> RepositoryOverview {
        self.overview.languages.finalize();
        self.overview.name = self
            .display_name
            .unwrap_or_else(|| FALLBACK_DISPLAY_NAME.to_string());
        self.overview
    }
}

pub struct RepositoryCollector<'a, T> {
    gateway: &'a RequestGateway<T>,
    config: &'a StatsConfig,
}

impl<'a, T: Transport> RepositoryCollector<'a, T> {
    pub fn new(gateway: &'a RequestGateway<T>, config: &'a StatsConfig) -> Self {
        Self { gateway, config }
    }

    /// Pages through both lists until neither reports a next page.
    pub async fn collect(&self) -> Result<RepositoryOverview> {
        let mut accumulator = OverviewAccumulator::new(self.config);
        let query = repositories_overview_query();
        let mut variables = OverviewVariable::default();
        let mut page = 0usize;

        loop {
            page += 1;
            let payload = GraphQLPayload {
                query: GraphQLQuery(query.clone()),
                variables: Some(variables.clone()),
            };
            let raw = self
                .gateway
                .query("repositories_overview", &payload)
                .await?;

            let viewer = decode_viewer(raw);
            let owned_page = viewer.repositories.page_info.clone();
            let contributed_page = viewer.repositories_contributed_to.page_info.clone();
            accumulator.absorb_viewer(viewer);

            if !owned_page.has_next_page && !contributed_page.has_next_page {
                break;
            }

            let next = OverviewVariable {
                owned_cursor: owned_page
                    .end_cursor
                    .or_else(|| variables.owned_cursor.clone()),
                contrib_cursor: contributed_page
                    .end_cursor
                    .or_else(|| variables.contrib_cursor.clone()),
            };
            if next == variables {
                warn!(
                    "Repository cursors did not advance after page {}; stopping pagination",
                    page
                );
                break;
            }
            variables = next;
        }

        let overview = accumulator.finish();
        info!(
            "Collected {} repositories ({} held out) over {} page(s)",
            overview.repos.len(),
            overview.ignored_repos.len(),
            page
        );
        Ok(overview)
    }
}

/// Extracts the viewer from a raw response; absent or malformed data is an empty page.
fn decode_viewer(raw: Value) -> ViewerNode {
    match serde_json::from_value::<GraphQLResponse<ViewerOverviewResponse>>(raw) {
        Ok(response) => response
            .data
            .and_then(|data| data.viewer)
            .unwrap_or_default(),
        Err(e) => {
            warn!("Unexpected repositories overview response: {}", e);
            ViewerNode::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LanguageSize;

    fn record(name: &str, stars: u64, languages: &[(&str, u64)]) -> RepositoryRecord {
        RepositoryRecord {
            name_with_owner: NameWithOwner::from(name),
            stargazers: stars,
            forks: 1,
            languages: languages
                .iter()
                .map(|(language, size)| LanguageSize {
                    name: language.to_string(),
                    size: *size,
                    color: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_admit_is_idempotent() {
        let config = StatsConfig::default();
        let mut accumulator = OverviewAccumulator::new(&config);

        assert!(accumulator.admit(record("octo/a", 5, &[("Rust", 10)])));
        assert!(!accumulator.admit(record("octo/a", 5, &[("Rust", 10)])));

        let overview = accumulator.finish();
        assert_eq!(overview.repos.len(), 1);
        assert_eq!(overview.stargazers, 5);
        assert_eq!(overview.forks, 1);
        assert_eq!(overview.languages.get("Rust").unwrap().occurrences, 1);
        assert_eq!(overview.name, FALLBACK_DISPLAY_NAME);
    }

    #[test]
    fn test_excluded_repository_is_never_counted() {
        let mut config = StatsConfig::default();
        config.exclude_repos.insert(NameWithOwner::from("octo/secret"));
        let mut accumulator = OverviewAccumulator::new(&config);

        assert!(!accumulator.admit(record("octo/secret", 100, &[("Rust", 10)])));
        assert!(!accumulator.hold_out(NameWithOwner::from("octo/secret")));

        let overview = accumulator.finish();
        assert!(overview.repos.is_empty());
        assert!(overview.ignored_repos.is_empty());
        assert_eq!(overview.stargazers, 0);
        assert!(overview.languages.is_empty());
    }

    #[test]
    fn test_zero_byte_repository_has_no_shares() {
        let config = StatsConfig::default();
        let mut accumulator = OverviewAccumulator::new(&config);
        accumulator.admit(record("octo/empty", 2, &[]));

        let overview = accumulator.finish();
        assert_eq!(overview.stargazers, 2);
        assert!(!overview.language_shares.contains_key(&NameWithOwner::from("octo/empty")));
    }

    #[test]
    fn test_decode_viewer_tolerates_missing_data() {
        let viewer = decode_viewer(serde_json::json!({"errors": [{"message": "boom"}]}));
        assert!(viewer.repositories.nodes.is_empty());
        assert!(!viewer.repositories.page_info.has_next_page);

        let viewer = decode_viewer(serde_json::json!({"data": {"viewer": null}}));
        assert!(viewer.login.is_none());

        let viewer = decode_viewer(serde_json::json!("not an object"));
        assert!(viewer.name.is_none());
    }

    #[test]
    fn test_decode_viewer_drops_only_unusable_nodes() {
        let viewer = decode_viewer(serde_json::json!({"data": {"viewer": {
            "login": "octo",
            "repositories": {
                "pageInfo": {"hasNextPage": true, "endCursor": "abc"},
                "nodes": [
                    {"nameWithOwner": "octo/bare", "stargazers": null, "forkCount": null, "languages": null},
                    null,
                    {"stargazers": {"totalCount": 9}},
                    {"nameWithOwner": "octo/langs", "stargazers": {"totalCount": 2}, "forkCount": 1,
                     "languages": {"edges": [null, {"size": 5, "node": null}, {"size": 7, "node": {"name": "Rust", "color": null}}]}}
                ]
            },
            "repositoriesContributedTo": null
        }}}));

        assert!(viewer.repositories.page_info.has_next_page);
        assert_eq!(viewer.repositories.nodes.len(), 2);
        let bare = &viewer.repositories.nodes[0];
        assert_eq!(bare.name_with_owner, "octo/bare");
        assert_eq!(bare.stargazers.total_count, 0);
        assert!(bare.languages.is_none());
        let edges = &viewer.repositories.nodes[1].languages.as_ref().unwrap().edges;
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].node.name, "Rust");
        assert!(viewer.repositories_contributed_to.nodes.is_empty());
    }
}
