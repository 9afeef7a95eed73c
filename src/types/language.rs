//! Language size, share and aggregate types

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

/// Byte size of one language inside one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSize {
    pub name: String,
    pub size: u64,
    pub color: Option<String>,
}

/// Languages excluded from every size and share computation.
///
/// Names are compared case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageFilter(HashSet<String>);

impl LanguageFilter {
    pub fn new<I, S>(languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            languages
                .into_iter()
                .map(|language| language.as_ref().trim().to_lowercase())
                .filter(|language| !language.is_empty())
                .collect(),
        )
    }

    pub fn is_excluded(&self, language: &str) -> bool {
        self.0.contains(&language.to_lowercase())
    }

    pub fn extend<I, S>(&mut self, languages: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.0.extend(Self::new(languages).0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Per-language fraction of a single repository's counted bytes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageShares(BTreeMap<String, f64>);

impl LanguageShares {
    /// Builds shares from `(language, bytes)` pairs, summing duplicate names.
    /// Returns `None` when the total is zero.
    pub fn from_sizes<'a, I>(sizes: I) -> Option<Self>
    where
        I: IntoIterator<Item = (&'a str, u64)>,
    {
        let mut by_language: BTreeMap<String, u64> = BTreeMap::new();
        for (name, size) in sizes {
            *by_language.entry(name.to_string()).or_default() += size;
        }

        let total: u64 = by_language.values().sum();
        if total == 0 {
            return None;
        }

        Some(Self(
            by_language
                .into_iter()
                .map(|(name, size)| (name, size as f64 / total as f64))
                .collect(),
        ))
    }

    pub fn get(&self, language: &str) -> Option<f64> {
        self.0.get(language).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, share)| (name.as_str(), *share))
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }
}

/// Cumulative statistics for one language across all counted repositories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageStat {
    pub size: u64,
    pub occurrences: u64,
    pub color: Option<String>,
    /// Percentage of the grand total byte size, filled in by [`LanguageAggregate::finalize`]
    pub proportion: f64,
}

/// Language aggregate keyed by language name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageAggregate(BTreeMap<String, LanguageStat>);

impl LanguageAggregate {
    /// Adds one repository's language size; occurrences grow by one per call.
    pub fn record(&mut self, language: &LanguageSize) {
        match self.0.get_mut(&language.name) {
            Some(stat) => {
                stat.size += language.size;
                stat.occurrences += 1;
            }
            None => {
                self.0.insert(
                    language.name.clone(),
                    LanguageStat {
                        size: language.size,
                        occurrences: 1,
                        color: language.color.clone(),
                        proportion: 0.0,
                    },
                );
            }
        }
    }

    /// Computes each language's percentage of the grand total.
    /// Every language reports 0% when the grand total is zero.
    pub fn finalize(&mut self) {
        let total = self.total_size();
        for stat in self.0.values_mut() {
            stat.proportion = if total == 0 {
                0.0
            } else {
                100.0 * stat.size as f64 / total as f64
            };
        }
    }

    pub fn total_size(&self) -> u64 {
        self.0.values().map(|stat| stat.size).sum()
    }

    pub fn get(&self, language: &str) -> Option<&LanguageStat> {
        self.0.get(language)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LanguageStat)> {
        self.0.iter().map(|(name, stat)| (name.as_str(), stat))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Language name to percentage of the grand total
    pub fn proportional(&self) -> BTreeMap<String, f64> {
        self.0
            .iter()
            .map(|(name, stat)| (name.clone(), stat.proportion))
            .collect()
    }
}
