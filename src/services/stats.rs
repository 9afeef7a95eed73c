//! Memoized statistics for one account

use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;
use tokio::sync::OnceCell;
use tracing::info;

use super::cache::CacheStore;
use super::collector::RepositoryCollector;
use super::contributions::ContributionTotalsResolver;
use super::lines_changed::LinesChangedEngine;
use super::views::ViewsAggregator;
use crate::config::StatsConfig;
use crate::github::{GitHubTransport, RequestGateway, Transport};
use crate::types::{LanguageAggregate, LineChanges, NameWithOwner, StatsSnapshot};

/// Entry point of a stats run.
///
/// The first accessor call computes the whole [`StatsSnapshot`]; later calls
/// read the stored snapshot.
pub struct Stats<T> {
    config: StatsConfig,
    gateway: RequestGateway<T>,
    cache: CacheStore,
    snapshot: OnceCell<StatsSnapshot>,
}

impl Stats<GitHubTransport> {
    /// Builds the production transport chain from `config`.
    pub fn from_config(config: StatsConfig) -> Result<Self> {
        let transports = GitHubTransport::default_chain(
            &config.access_token,
            &config.api_base_url,
            config.request_timeout,
        )?;
        let gateway = RequestGateway::new(transports, config.gateway_options());
        let cache = CacheStore::new(config.cache_path.clone());
        Ok(Self::new(config, gateway, cache))
    }
}

impl<T: Transport> Stats<T> {
    pub fn new(config: StatsConfig, gateway: RequestGateway<T>, cache: CacheStore) -> Self {
        Self {
            config,
            gateway,
            cache,
            snapshot: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    /// Computes the snapshot on first call and returns it.
    pub async fn ensure_computed(&self) -> Result<&StatsSnapshot> {
        self.snapshot.get_or_try_init(|| self.compute()).await
    }

    async fn compute(&self) -> Result<StatsSnapshot> {
        info!("Computing statistics for {}", self.config.username);

        let overview = RepositoryCollector::new(&self.gateway, &self.config)
            .collect()
            .await?;
        let all_repos = overview.all_repos();

        let contributions = ContributionTotalsResolver::new(&self.gateway);
        let lines_changed = LinesChangedEngine::new(
            &self.gateway,
            &self.config.username,
            &overview.language_shares,
        );
        let views = ViewsAggregator::new(&self.gateway);

        let (total_contributions, lines_changed, views) = tokio::try_join!(
            contributions.resolve(),
            lines_changed.compute(&all_repos, &self.cache),
            views.total_views(&overview.repos),
        )?;

        Ok(StatsSnapshot {
            name: overview.name,
            stargazers: overview.stargazers,
            forks: overview.forks,
            total_contributions,
            repos: overview.repos,
            all_repos,
            lines_changed,
            views,
            languages: overview.languages,
        })
    }

    pub async fn name(&self) -> Result<&str> {
        Ok(&self.ensure_computed().await?.name)
    }

    pub async fn stargazers(&self) -> Result<u64> {
        Ok(self.ensure_computed().await?.stargazers)
    }

    pub async fn forks(&self) -> Result<u64> {
        Ok(self.ensure_computed().await?.forks)
    }

    pub async fn total_contributions(&self) -> Result<u64> {
        Ok(self.ensure_computed().await?.total_contributions)
    }

    pub async fn languages(&self) -> Result<&LanguageAggregate> {
        Ok(&self.ensure_computed().await?.languages)
    }

    /// Language name to percentage of all counted bytes
    pub async fn languages_proportional(&self) -> Result<BTreeMap<String, f64>> {
        Ok(self.ensure_computed().await?.languages_proportional())
    }

    pub async fn repos(&self) -> Result<&BTreeSet<NameWithOwner>> {
        Ok(&self.ensure_computed().await?.repos)
    }

    pub async fn all_repos(&self) -> Result<&BTreeSet<NameWithOwner>> {
        Ok(&self.ensure_computed().await?.all_repos)
    }

    pub async fn lines_changed(&self) -> Result<LineChanges> {
        Ok(self.ensure_computed().await?.lines_changed)
    }

    pub async fn views(&self) -> Result<u64> {
        Ok(self.ensure_computed().await?.views)
    }
}
