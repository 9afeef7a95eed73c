//! Run configuration
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! the process environment, then command-line flags (applied by the binary).

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::time::Duration;

use crate::github::GatewayOptions;
use crate::github::gateway::{
    DEFAULT_MAX_CONNECTIONS, DEFAULT_PENDING_RETRY_DELAY, DEFAULT_PENDING_RETRY_LIMIT,
};
use crate::github::transport::DEFAULT_API_BASE_URL;
use crate::types::{LanguageFilter, NameWithOwner, User};

/// Cache file used when none is configured, relative to the working directory
pub const DEFAULT_CACHE_FILE: &str = "contribution_cache.json";

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const ENV_ACCESS_TOKEN: &str = "ACCESS_TOKEN";
pub const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";
pub const ENV_ACTOR: &str = "GITHUB_ACTOR";
pub const ENV_EXCLUDED_REPOS: &str = "EXCLUDED";
pub const ENV_EXCLUDED_LANGS: &str = "EXCLUDED_LANGS";
pub const ENV_EXCLUDE_FORKED_REPOS: &str = "EXCLUDE_FORKED_REPOS";

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The config file could not be read
    IoError(String),
    /// The config file is not valid TOML for [`StatsConfigFile`]
    ParseError(String),
    /// No account login was supplied
    MissingUsername,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(msg) => write!(f, "IO error: {}", msg),
            Self::ParseError(msg) => write!(f, "Config parse error: {}", msg),
            Self::MissingUsername => write!(
                f,
                "No account login configured (set {} or pass --username)",
                ENV_ACTOR
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq)]
pub struct StatsConfig {
    pub username: User,
    pub access_token: String,
    pub exclude_repos: BTreeSet<NameWithOwner>,
    pub exclude_langs: LanguageFilter,
    /// Fold contributed-to repositories into the owned totals
    pub consider_forked_repos: bool,
    pub max_connections: usize,
    pub pending_retry_limit: u32,
    pub pending_retry_delay: Duration,
    pub request_timeout: Duration,
    pub cache_path: PathBuf,
    pub api_base_url: String,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            username: User::default(),
            access_token: String::new(),
            exclude_repos: BTreeSet::new(),
            exclude_langs: LanguageFilter::default(),
            consider_forked_repos: false,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            pending_retry_limit: DEFAULT_PENDING_RETRY_LIMIT,
            pending_retry_delay: DEFAULT_PENDING_RETRY_DELAY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            cache_path: PathBuf::from(DEFAULT_CACHE_FILE),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

impl StatsConfig {
    /// Defaults overlaid with the process environment
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    pub fn gateway_options(&self) -> GatewayOptions {
        GatewayOptions {
            max_connections: self.max_connections,
            pending_retry_limit: self.pending_retry_limit,
            pending_retry_delay: self.pending_retry_delay,
        }
    }

    pub fn is_repo_excluded(&self, repository: &NameWithOwner) -> bool {
        self.exclude_repos.contains(repository)
    }

    /// Overlays every field present in `file`.
    pub fn apply_file(&mut self, file: StatsConfigFile) {
        if let Some(username) = file.username {
            self.username = User::from(username);
        }
        if let Some(repos) = file.exclude_repos {
            self.exclude_repos.extend(repos.into_iter().map(NameWithOwner::from));
        }
        if let Some(langs) = file.exclude_langs {
            self.exclude_langs.extend(langs);
        }
        if let Some(consider) = file.consider_forked_repos {
            self.consider_forked_repos = consider;
        }
        if let Some(max_connections) = file.max_connections {
            self.max_connections = max_connections;
        }
        if let Some(limit) = file.pending_retry_limit {
            self.pending_retry_limit = limit;
        }
        if let Some(secs) = file.pending_retry_delay_secs {
            self.pending_retry_delay = Duration::from_secs(secs);
        }
        if let Some(secs) = file.request_timeout_secs {
            self.request_timeout = Duration::from_secs(secs);
        }
        if let Some(cache_path) = file.cache_path {
            self.cache_path = cache_path;
        }
        if let Some(api_base_url) = file.api_base_url {
            self.api_base_url = api_base_url;
        }
    }

    /// Overlays the environment variables understood by the stats run.
    ///
    /// `lookup` abstracts `std::env::var` so the mapping can be exercised
    /// without touching the real process environment.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(token) = non_empty(ENV_ACCESS_TOKEN).or_else(|| non_empty(ENV_GITHUB_TOKEN)) {
            self.access_token = token;
        }
        if let Some(actor) = non_empty(ENV_ACTOR) {
            self.username = User::from(actor.trim());
        }
        if let Some(repos) = non_empty(ENV_EXCLUDED_REPOS) {
            self.exclude_repos
                .extend(comma_list(&repos).into_iter().map(NameWithOwner::from));
        }
        if let Some(langs) = non_empty(ENV_EXCLUDED_LANGS) {
            self.exclude_langs.extend(comma_list(&langs));
        }
        if let Some(exclude_forked) = non_empty(ENV_EXCLUDE_FORKED_REPOS) {
            self.consider_forked_repos = !is_truthy(&exclude_forked);
        }
    }

    /// Refuses to run without an account login.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.username.is_empty() {
            return Err(ConfigError::MissingUsername);
        }
        Ok(())
    }
}

/// TOML configuration file; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatsConfigFile {
    pub username: Option<String>,
    pub exclude_repos: Option<Vec<String>>,
    pub exclude_langs: Option<Vec<String>>,
    pub consider_forked_repos: Option<bool>,
    pub max_connections: Option<usize>,
    pub pending_retry_limit: Option<u32>,
    pub pending_retry_delay_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub cache_path: Option<PathBuf>,
    pub api_base_url: Option<String>,
}

impl StatsConfigFile {
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;
        Self::parse(&content)
    }
}

/// Splits a comma separated list, dropping blank items
pub fn comma_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
