use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::cache::LineChanges;
use super::language::LanguageAggregate;
use super::repository::NameWithOwner;

/// Aggregate statistics for one account, computed once per process
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub name: String,
    pub stargazers: u64,
    pub forks: u64,
    pub total_contributions: u64,
    /// Repositories counted toward stars, forks and languages
    pub repos: BTreeSet<NameWithOwner>,
    /// `repos` plus contributed-to repositories held out of the owned totals
    pub all_repos: BTreeSet<NameWithOwner>,
    pub lines_changed: LineChanges,
    pub views: u64,
    pub languages: LanguageAggregate,
}

impl StatsSnapshot {
    pub fn languages_proportional(&self) -> BTreeMap<String, f64> {
        self.languages.proportional()
    }

    /// Languages ordered by descending share, ties broken by name
    pub fn languages_by_share(&self) -> Vec<(&str, f64)> {
        let mut languages: Vec<(&str, f64)> = self
            .languages
            .iter()
            .map(|(name, stat)| (name, stat.proportion))
            .collect();
        languages.sort_by(|(a_name, a_share), (b_name, b_share)| {
            b_share.total_cmp(a_share).then_with(|| a_name.cmp(b_name))
        });
        languages
    }
}
