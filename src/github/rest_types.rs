//! Shapes of the REST statistics endpoints

use serde::{Deserialize, Serialize};

/// One element of `/repos/{repo}/stats/contributors`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContributorStats {
    #[serde(default)]
    pub author: Option<ContributorAuthor>,
    #[serde(default)]
    pub weeks: Vec<ContributorWeek>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContributorAuthor {
    #[serde(default)]
    pub login: String,
}

/// Weekly totals; `a` is additions, `d` deletions, `c` commits
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ContributorWeek {
    #[serde(default)]
    pub w: i64,
    #[serde(default)]
    pub a: u64,
    #[serde(default)]
    pub d: u64,
    #[serde(default)]
    pub c: u64,
}

/// Body of `/repos/{repo}/traffic/views`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrafficViews {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub uniques: u64,
    #[serde(default)]
    pub views: Vec<TrafficViewBucket>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrafficViewBucket {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub uniques: u64,
}
