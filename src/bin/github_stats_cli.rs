use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use github_stats::config::{StatsConfig, StatsConfigFile};
use github_stats::formatter::{stats_report_json, stats_report_text};
use github_stats::services::Stats;
use github_stats::types::{NameWithOwner, User};

#[derive(Parser)]
#[command(name = "github-stats")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "GitHub Stats - stargazers, forks, contributions, languages, lines changed and views for one account"
)]
#[command(
    long_about = "GitHub Stats aggregates the statistics of a single GitHub account across its owned and contributed-to repositories. Credentials come from ACCESS_TOKEN (or GITHUB_TOKEN) and the account login from GITHUB_ACTOR. Per-repository lines changed are cached in a JSON file so that repositories whose statistics cannot be fetched on a given run still report their last known values."
)]
struct Cli {
    /// Output format - text for a human readable summary, json for programmatic use
    #[arg(long, default_value = "text")]
    format: OutputFormat,
    /// TOML configuration file; environment variables and flags take precedence over it
    #[arg(long)]
    config: Option<PathBuf>,
    /// Account login (overrides GITHUB_ACTOR)
    #[arg(long)]
    username: Option<String>,
    /// Path of the contribution cache file (default: contribution_cache.json)
    #[arg(long)]
    cache: Option<PathBuf>,
    /// Repository to leave out, in owner/name form (repeatable)
    #[arg(long = "exclude-repo")]
    exclude_repos: Vec<String>,
    /// Language to leave out of language totals (repeatable, case-insensitive)
    #[arg(long = "exclude-lang")]
    exclude_langs: Vec<String>,
    /// Count contributed-to repositories toward stars, forks, languages and views
    #[arg(long)]
    include_forked: bool,
    /// Maximum simultaneous in-flight requests (default: 10)
    #[arg(long)]
    max_connections: Option<usize>,
    /// Request timeout in seconds for GitHub API calls (default: 30 seconds)
    #[arg(long)]
    request_timeout: Option<u64>,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Layers defaults, the optional config file, the environment and the flags
fn build_config(cli: &Cli) -> Result<StatsConfig> {
    let mut config = StatsConfig::default();

    if let Some(path) = &cli.config {
        let file = StatsConfigFile::load(path)?;
        config.apply_file(file);
    }

    config.apply_env(|key| std::env::var(key).ok());

    if let Some(username) = &cli.username {
        config.username = User::from(username.as_str());
    }
    if let Some(cache) = &cli.cache {
        config.cache_path = cache.clone();
    }
    config
        .exclude_repos
        .extend(cli.exclude_repos.iter().map(|repo| NameWithOwner::from(repo.as_str())));
    config.exclude_langs.extend(&cli.exclude_langs);
    if cli.include_forked {
        config.consider_forked_repos = true;
    }
    if let Some(max_connections) = cli.max_connections {
        config.max_connections = max_connections;
    }
    if let Some(secs) = cli.request_timeout {
        config.request_timeout = Duration::from_secs(secs);
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install the rustls crypto provider before any TLS client is built
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("github_stats=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;

    let stats = Stats::from_config(config)?;
    let snapshot = stats.ensure_computed().await?;

    let report = match cli.format {
        OutputFormat::Text => stats_report_text(snapshot),
        OutputFormat::Json => stats_report_json(snapshot)?,
    };
    println!("{}", report);

    Ok(())
}
