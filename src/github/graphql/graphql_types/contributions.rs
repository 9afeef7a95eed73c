use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// `data` of the contribution years query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContributionYearsResponse {
    #[serde(default)]
    pub viewer: Option<ContributionYearsViewer>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContributionYearsViewer {
    #[serde(rename = "contributionsCollection", default)]
    pub contributions_collection: Option<ContributionYearsCollection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContributionYearsCollection {
    #[serde(rename = "contributionYears", default)]
    pub contribution_years: Vec<i32>,
}

/// `data` of the per-year fan-out query; `viewer` maps `yearNNNN` aliases to collections
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct YearlyContributionsResponse {
    #[serde(default)]
    pub viewer: Option<HashMap<String, Option<YearContributionNode>>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct YearContributionNode {
    #[serde(rename = "contributionCalendar", default)]
    pub contribution_calendar: ContributionCalendar,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContributionCalendar {
    #[serde(rename = "totalContributions", default)]
    pub total_contributions: u64,
}
