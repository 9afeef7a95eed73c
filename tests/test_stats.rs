//! End-to-end tests for the memoized stats facade
//!
//! A scripted account with two owned repositories and one contributed-to
//! repository is computed through every component.


use serde_json::json;

use github_stats::formatter::stats_report_text;
use github_stats::github::RequestGateway;
use github_stats::services::{CacheStore, Stats};
use github_stats::types::{LineChanges, NameWithOwner};
use test_util::{
    ScriptedTransport, cache_path, contribution_years_response, contributor_stats,
    create_test_temp_dir, fast_options, is_contribution_years_query, is_overview_query, last_page,
    overview_page, repo_node, test_config, traffic_views, yearly_contributions_response,
};

fn scripted_account() -> ScriptedTransport {
    let transport = ScriptedTransport::new("primary");
    transport.on_graphql(|body| {
        if is_overview_query(body) {
            Ok(overview_page(
                Some("The Octocat"),
                last_page(vec![
                    repo_node("octocat/one", 10, 2, &[("Rust", 300), ("Go", 100)]),
                    repo_node("octocat/two", 5, 1, &[("Rust", 100)]),
                ]),
                last_page(vec![repo_node("other/three", 500, 50, &[("Python", 900)])]),
            ))
        } else if is_contribution_years_query(body) {
            Ok(contribution_years_response(&[2024, 2023]))
        } else {
            Ok(yearly_contributions_response(&[(2024, 100), (2023, 23)]))
        }
    });

    transport.push_rest_json(
        "/repos/octocat/one/stats/contributors",
        200,
        json!([contributor_stats("octocat", &[(5, 1), (3, 0)])]),
    );
    transport.push_rest_json(
        "/repos/other/three/stats/contributors",
        200,
        json!([contributor_stats("octocat", &[(10, 10)])]),
    );
    transport.push_rest_json("/repos/octocat/one/traffic/views", 200, traffic_views(&[3, 4]));
    transport.push_rest_json("/repos/octocat/two/traffic/views", 200, traffic_views(&[5]));
    transport.push_rest_json("/repos/other/three/traffic/views", 200, traffic_views(&[1000]));
    transport
}

fn stats_for(transport: &ScriptedTransport, cache: CacheStore) -> Stats<ScriptedTransport> {
    let gateway = RequestGateway::new(vec![transport.clone()], fast_options());
    Stats::new(test_config("octocat"), gateway, cache)
}

#[tokio::test]
async fn test_stats_aggregate_every_component() {
    let temp_dir = create_test_temp_dir();
    let transport = scripted_account();
    let stats = stats_for(&transport, CacheStore::new(cache_path(&temp_dir)));

    assert_eq!(stats.name().await.unwrap(), "The Octocat");
    assert_eq!(stats.stargazers().await.unwrap(), 15);
    assert_eq!(stats.forks().await.unwrap(), 3);
    assert_eq!(stats.total_contributions().await.unwrap(), 123);
    assert_eq!(stats.repos().await.unwrap().len(), 2);
    assert_eq!(stats.all_repos().await.unwrap().len(), 3);
    // octocat/two has no statistics and no cache entry
    assert_eq!(stats.lines_changed().await.unwrap(), LineChanges::new(18, 11));
    assert_eq!(stats.views().await.unwrap(), 12);

    let languages = stats.languages_proportional().await.unwrap();
    assert!((languages["Rust"] - 80.0).abs() < 1e-9);
    assert!((languages["Go"] - 20.0).abs() < 1e-9);
    assert!(!languages.contains_key("Python"));
}

#[tokio::test]
async fn test_contributed_repositories_count_only_toward_lines() {
    let temp_dir = create_test_temp_dir();
    let transport = scripted_account();
    let stats = stats_for(&transport, CacheStore::new(cache_path(&temp_dir)));

    let all_repos = stats.all_repos().await.unwrap();
    assert!(all_repos.contains(&NameWithOwner::from("other/three")));
    assert!(
        !stats
            .repos()
            .await
            .unwrap()
            .contains(&NameWithOwner::from("other/three"))
    );

    assert_eq!(transport.rest_call_count("/repos/other/three/stats/contributors"), 1);
    assert_eq!(transport.rest_call_count("/repos/other/three/traffic/views"), 0);

    let cache = CacheStore::new(cache_path(&temp_dir)).load();
    assert_eq!(
        cache
            .get(&NameWithOwner::from("other/three"))
            .unwrap()
            .changes(),
        LineChanges::new(10, 10)
    );
}

#[tokio::test]
async fn test_snapshot_is_computed_once() {
    let temp_dir = create_test_temp_dir();
    let transport = scripted_account();
    let stats = stats_for(&transport, CacheStore::new(cache_path(&temp_dir)));

    stats.views().await.unwrap();
    let graphql_calls = transport.graphql_calls().len();
    let rest_calls = transport.rest_calls().len();
    assert_eq!(graphql_calls, 3);

    stats.stargazers().await.unwrap();
    stats.lines_changed().await.unwrap();
    stats.languages().await.unwrap();

    assert_eq!(transport.graphql_calls().len(), graphql_calls);
    assert_eq!(transport.rest_calls().len(), rest_calls);
}

#[tokio::test]
async fn test_second_run_falls_back_to_first_run_cache() {
    let temp_dir = create_test_temp_dir();
    let first = scripted_account();
    stats_for(&first, CacheStore::new(cache_path(&temp_dir)))
        .ensure_computed()
        .await
        .unwrap();

    // Same account, but contributor statistics are now unavailable
    let second = ScriptedTransport::new("primary");
    let overview = overview_page(
        Some("The Octocat"),
        last_page(vec![repo_node("octocat/one", 10, 2, &[("Rust", 300)])]),
        last_page(vec![]),
    );
    second.on_graphql(move |body| {
        if is_overview_query(body) {
            Ok(overview.clone())
        } else {
            Ok(contribution_years_response(&[]))
        }
    });
    second.push_rest_json(
        "/repos/octocat/one/stats/contributors",
        502,
        json!({"message": "Bad Gateway"}),
    );

    let stats = stats_for(&second, CacheStore::new(cache_path(&temp_dir)));
    assert_eq!(stats.lines_changed().await.unwrap(), LineChanges::new(8, 1));
    assert_eq!(stats.total_contributions().await.unwrap(), 0);
    // No years, so the yearly query is never sent
    assert_eq!(second.graphql_calls().len(), 2);
}

#[tokio::test]
async fn test_report_text_lists_every_statistic() {
    let temp_dir = create_test_temp_dir();
    let transport = scripted_account();
    let stats = stats_for(&transport, CacheStore::new(cache_path(&temp_dir)));

    let snapshot = stats.ensure_computed().await.unwrap();
    let report = stats_report_text(snapshot).to_string();

    assert!(report.starts_with("Name: The Octocat\n"));
    assert!(report.contains("Stargazers: 15\n"));
    assert!(report.contains("All-time contributions: 123\n"));
    assert!(report.contains("Repositories with contributions: 3\n"));
    assert!(report.contains("Lines of code changed: 29\n"));
    assert!(report.contains("Project page views: 12\n"));
    assert!(report.ends_with("Languages:\n  - Rust: 80.0000%\n  - Go: 20.0000%"));
}

#[tokio::test]
async fn test_failing_transport_surfaces_error() {
    let temp_dir = create_test_temp_dir();
    let transport = ScriptedTransport::failing("primary");
    let stats = stats_for(&transport, CacheStore::new(cache_path(&temp_dir)));

    assert!(stats.ensure_computed().await.is_err());
}

#[tokio::test]
async fn test_graphql_error_body_counts_zero_and_still_saves_cache() {
    let temp_dir = create_test_temp_dir();
    let transport = ScriptedTransport::new("primary");
    let overview = overview_page(
        Some("The Octocat"),
        last_page(vec![repo_node("octocat/one", 10, 2, &[("Rust", 300)])]),
        last_page(vec![]),
    );
    transport.on_graphql(move |body| {
        if is_overview_query(body) {
            Ok(overview.clone())
        } else {
            // What a transport yields for a 5xx GraphQL reply
            Ok(json!({"message": "Server Error"}))
        }
    });
    transport.push_rest_json(
        "/repos/octocat/one/stats/contributors",
        200,
        json!([contributor_stats("octocat", &[(5, 1), (3, 0)])]),
    );
    transport.push_rest_json("/repos/octocat/one/traffic/views", 200, traffic_views(&[3]));

    let stats = stats_for(&transport, CacheStore::new(cache_path(&temp_dir)));
    let snapshot = stats.ensure_computed().await.unwrap();

    assert_eq!(snapshot.total_contributions, 0);
    assert_eq!(snapshot.lines_changed, LineChanges::new(8, 1));
    assert_eq!(snapshot.views, 3);
    let cache = CacheStore::new(cache_path(&temp_dir)).load();
    assert_eq!(
        cache.get(&NameWithOwner::from("octocat/one")).unwrap().changes(),
        LineChanges::new(8, 1)
    );
}
