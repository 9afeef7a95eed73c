//! Transport tests against a local mock GitHub API
//!
//! Both transports must pass REST statuses through untouched so that 202
//! handling stays in the gateway.


use mockito::Matcher;
use serde_json::{Value, json};
use tokio::time::Duration;

use github_stats::github::{
    GitHubTransport, HttpTransport, OctocrabTransport, RequestGateway, RestResponse, Transport,
};
use github_stats::services::{CacheStore, Stats};
use github_stats::types::{LineChanges, NameWithOwner};
use test_util::{
    cache_path, contributor_stats, create_test_temp_dir, last_page, overview_page, repo_node,
    test_config, traffic_views,
};

const TOKEN: &str = "test-token";
const TIMEOUT: Duration = Duration::from_secs(5);

fn install_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

#[tokio::test]
async fn test_http_transport_posts_graphql_with_bearer_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/graphql")
        .match_header("authorization", "Bearer test-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"data": {"viewer": {"login": "octocat"}}}"#)
        .create_async()
        .await;

    let transport = HttpTransport::new(TOKEN, &server.url(), TIMEOUT).unwrap();
    let response = transport
        .post_graphql(&json!({"query": "query { viewer { login } }"}))
        .await
        .unwrap();

    assert_eq!(response["data"]["viewer"]["login"], "octocat");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_http_transport_returns_error_status_body_without_data() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/graphql")
        .with_status(401)
        .with_body(r#"{"message": "Bad credentials"}"#)
        .create_async()
        .await;

    let transport = HttpTransport::new(TOKEN, &server.url(), TIMEOUT).unwrap();
    let response = transport
        .post_graphql(&json!({"query": "query { viewer { login } }"}))
        .await
        .unwrap();

    assert_eq!(response["message"], "Bad credentials");
    assert!(response.get("data").is_none());
}

#[tokio::test]
async fn test_octocrab_transport_returns_error_status_body_without_data() {
    install_crypto_provider();
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/graphql")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": "Bad credentials"}"#)
        .create_async()
        .await;

    let transport = OctocrabTransport::new(TOKEN, &server.url(), TIMEOUT).unwrap();
    let response = transport
        .post_graphql(&json!({"query": "query { viewer { login } }"}))
        .await
        .unwrap();

    assert!(response.get("data").is_none());
}

#[tokio::test]
async fn test_http_transport_passes_rest_status_through() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/repos/octocat/hello/stats/contributors")
        .with_status(202)
        .with_body("{}")
        .create_async()
        .await;

    let transport = HttpTransport::new(TOKEN, &format!("{}/", server.url()), TIMEOUT).unwrap();
    let reply = transport
        .get_rest("/repos/octocat/hello/stats/contributors")
        .await
        .unwrap();

    assert_eq!(reply.status, 202);
    assert_eq!(reply.body, "{}");
}

#[tokio::test]
async fn test_http_transport_reports_unreachable_host() {
    // Nothing listens on port 9 of localhost in the test environment
    let transport = HttpTransport::new(TOKEN, "http://127.0.0.1:9", TIMEOUT).unwrap();
    let result = transport.get_rest("/repos/octocat/hello/traffic/views").await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_octocrab_transport_reads_rest_reply() {
    install_crypto_provider();
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/repos/octocat/hello/traffic/views")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"count": 3, "uniques": 1, "views": [{"count": 3, "uniques": 1}]}"#)
        .create_async()
        .await;

    let transport = OctocrabTransport::new(TOKEN, &server.url(), TIMEOUT).unwrap();
    let reply = transport
        .get_rest("/repos/octocat/hello/traffic/views")
        .await
        .unwrap();

    assert_eq!(reply.status, 200);
    let body: Value = serde_json::from_str(&reply.body).unwrap();
    assert_eq!(body["count"], 3);
}

#[tokio::test]
async fn test_default_chain_serves_paged_query() {
    install_crypto_provider();
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/repos/octocat/hello/stats/contributors")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"author": {"login": "octocat"}, "weeks": [{"w": 0, "a": 1, "d": 2, "c": 1}]}]"#)
        .create_async()
        .await;

    let transports = GitHubTransport::default_chain(TOKEN, &server.url(), TIMEOUT).unwrap();
    assert_eq!(
        transports.iter().map(|t| t.name()).collect::<Vec<_>>(),
        vec!["octocrab", "reqwest"]
    );

    let gateway = RequestGateway::new(transports, Default::default());
    let response = gateway
        .query_paged("/repos/octocat/hello/stats/contributors", &[])
        .await
        .unwrap();

    assert!(matches!(response, RestResponse::Success(Value::Array(ref authors)) if authors.len() == 1));
}

#[tokio::test]
async fn test_graphql_server_error_degrades_to_zero_contributions() {
    install_crypto_provider();
    let mut server = mockito::Server::new_async().await;
    let overview = overview_page(
        Some("The Octocat"),
        last_page(vec![repo_node("octocat/one", 3, 1, &[("Rust", 100)])]),
        last_page(vec![]),
    );
    let _overview = server
        .mock("POST", "/graphql")
        .match_body(Matcher::Regex("repositoriesContributedTo".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(overview.to_string())
        .create_async()
        .await;
    let _years = server
        .mock("POST", "/graphql")
        .match_body(Matcher::Regex("contributionYears".to_string()))
        .with_status(502)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": "Server Error"}"#)
        .create_async()
        .await;
    let _stats = server
        .mock("GET", "/repos/octocat/one/stats/contributors")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([contributor_stats("octocat", &[(5, 1), (3, 0)])]).to_string())
        .create_async()
        .await;
    let _views = server
        .mock("GET", "/repos/octocat/one/traffic/views")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(traffic_views(&[4]).to_string())
        .create_async()
        .await;

    let temp_dir = create_test_temp_dir();
    let mut config = test_config("octocat");
    config.api_base_url = server.url();
    config.cache_path = cache_path(&temp_dir);
    config.request_timeout = TIMEOUT;

    let stats = Stats::from_config(config).unwrap();
    let snapshot = stats.ensure_computed().await.unwrap();

    assert_eq!(snapshot.total_contributions, 0);
    assert_eq!(snapshot.stargazers, 3);
    assert_eq!(snapshot.lines_changed, LineChanges::new(8, 1));
    assert_eq!(snapshot.views, 4);

    let cache = CacheStore::new(cache_path(&temp_dir)).load();
    assert_eq!(
        cache.get(&NameWithOwner::from("octocat/one")).unwrap().changes(),
        LineChanges::new(8, 1)
    );
}
