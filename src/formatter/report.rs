use anyhow::{Context, Result};

use super::{ReportContent, format_count};
use crate::types::StatsSnapshot;

/// Multi-line plain text summary of a snapshot
pub fn stats_report_text(snapshot: &StatsSnapshot) -> ReportContent {
    let mut content = String::new();

    content.push_str(&format!("Name: {}\n", snapshot.name));
    content.push_str(&format!(
        "Stargazers: {}\n",
        format_count(snapshot.stargazers)
    ));
    content.push_str(&format!("Forks: {}\n", format_count(snapshot.forks)));
    content.push_str(&format!(
        "All-time contributions: {}\n",
        format_count(snapshot.total_contributions)
    ));
    content.push_str(&format!(
        "Repositories with contributions: {}\n",
        snapshot.all_repos.len()
    ));
    content.push_str(&format!(
        "Lines of code added: {}\n",
        format_count(snapshot.lines_changed.additions)
    ));
    content.push_str(&format!(
        "Lines of code deleted: {}\n",
        format_count(snapshot.lines_changed.deletions)
    ));
    content.push_str(&format!(
        "Lines of code changed: {}\n",
        format_count(snapshot.lines_changed.changed())
    ));
    content.push_str(&format!(
        "Project page views: {}\n",
        format_count(snapshot.views)
    ));
    content.push_str("Languages:");
    for (language, share) in snapshot.languages_by_share() {
        content.push_str(&format!("\n  - {}: {:0.4}%", language, share));
    }

    ReportContent(content)
}

/// Pretty JSON rendering of a snapshot
pub fn stats_report_json(snapshot: &StatsSnapshot) -> Result<ReportContent> {
    let json =
        serde_json::to_string_pretty(snapshot).context("Failed to serialize stats snapshot")?;
    Ok(ReportContent(json))
}
