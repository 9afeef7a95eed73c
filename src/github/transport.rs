//! Transport strategies used by the request gateway
//!
//! A transport performs exactly one HTTP exchange. Retrying, falling back and
//! concurrency limiting all live in [`crate::github::gateway`].

use anyhow::{Context, Result};
use octocrab::Octocrab;
use serde_json::{Value, json};
use tokio::time::Duration;
use tracing::warn;

use super::error::TransportError;

/// Default GitHub API root
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// Status and raw body of one REST exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestReply {
    pub status: u16,
    pub body: String,
}

impl RestReply {
    pub fn new<S: Into<String>>(status: u16, body: S) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

pub trait Transport {
    /// Short label used in diagnostics
    fn name(&self) -> &str;

    /// POSTs one GraphQL document and returns the decoded JSON response.
    #[allow(async_fn_in_trait)]
    async fn post_graphql(&self, body: &Value) -> Result<Value, TransportError>;

    /// GETs `path_and_query` (starting with `/`) relative to the API root.
    #[allow(async_fn_in_trait)]
    async fn get_rest(&self, path_and_query: &str) -> Result<RestReply, TransportError>;
}

/// Decodes the reply to a GraphQL POST.
///
/// A non-success status is an API answer, not a transport failure: its JSON
/// body is returned as-is, or wrapped in a GraphQL `errors` list when it is
/// not JSON, so that callers see a response without `data`. Only an
/// undecodable success body is an error.
pub fn graphql_response(reply: RestReply) -> Result<Value, TransportError> {
    let parsed = serde_json::from_str::<Value>(&reply.body);
    if (200..300).contains(&reply.status) {
        return parsed.map_err(|e| TransportError::Malformed(e.to_string()));
    }

    warn!(
        "GraphQL endpoint answered with status {}; treating the reply as having no data",
        reply.status
    );
    match parsed {
        Ok(value) if value.is_object() => Ok(value),
        _ => Ok(json!({
            "errors": [{"message": format!("HTTP status {}", reply.status)}]
        })),
    }
}

/// Connect timeout derived from the request timeout
fn connection_timeout(timeout: Duration) -> Duration {
    if timeout < Duration::from_secs(10) {
        std::cmp::max(timeout, Duration::from_secs(1))
    } else {
        Duration::from_secs(30)
    }
}

/// Primary transport backed by octocrab
#[derive(Clone)]
pub struct OctocrabTransport {
    client: Octocrab,
}

impl OctocrabTransport {
    pub fn new(token: &str, base_url: &str, timeout: Duration) -> Result<Self> {
        let read_write_timeout = std::cmp::max(timeout, Duration::from_secs(1));

        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .base_uri(base_url)
            .context("Invalid GitHub API base URL")?
            .set_connect_timeout(Some(connection_timeout(timeout)))
            .set_read_timeout(Some(read_write_timeout))
            .set_write_timeout(Some(read_write_timeout))
            .build()
            .context("Failed to build GitHub client")?;

        Ok(Self { client })
    }
}

impl Transport for OctocrabTransport {
    fn name(&self) -> &str {
        "octocrab"
    }

    async fn post_graphql(&self, body: &Value) -> Result<Value, TransportError> {
        let response = self
            .client
            ._post("/graphql".to_string(), Some(body))
            .await
            .map_err(TransportError::from_octocrab_error)?;
        let status = response.status().as_u16();
        let text = self
            .client
            .body_to_string(response)
            .await
            .map_err(TransportError::from_octocrab_error)?;

        graphql_response(RestReply::new(status, text))
    }

    async fn get_rest(&self, path_and_query: &str) -> Result<RestReply, TransportError> {
        let response = self
            .client
            ._get(path_and_query.to_string())
            .await
            .map_err(TransportError::from_octocrab_error)?;
        let status = response.status().as_u16();
        let body = self
            .client
            .body_to_string(response)
            .await
            .map_err(TransportError::from_octocrab_error)?;

        Ok(RestReply { status, body })
    }
}

/// Fallback transport: a plain reqwest client carrying the same credential
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    token: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(token: &str, base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("github-stats/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(connection_timeout(timeout))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            timeout,
        })
    }

    fn url(&self, path_and_query: &str) -> String {
        format!("{}{}", self.base_url, path_and_query)
    }
}

impl Transport for HttpTransport {
    fn name(&self) -> &str {
        "reqwest"
    }

    async fn post_graphql(&self, body: &Value) -> Result<Value, TransportError> {
        let response = self
            .client
            .post(self.url("/graphql"))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest_error(e, self.timeout))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::from_reqwest_error(e, self.timeout))?;

        graphql_response(RestReply::new(status, text))
    }

    async fn get_rest(&self, path_and_query: &str) -> Result<RestReply, TransportError> {
        let response = self
            .client
            .get(self.url(path_and_query))
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest_error(e, self.timeout))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::from_reqwest_error(e, self.timeout))?;

        Ok(RestReply { status, body })
    }
}

/// The production transport set: octocrab first, reqwest as fallback
#[derive(Clone)]
pub enum GitHubTransport {
    Octocrab(OctocrabTransport),
    Http(HttpTransport),
}

impl GitHubTransport {
    /// Ordered transports for the gateway
    pub fn default_chain(token: &str, base_url: &str, timeout: Duration) -> Result<Vec<Self>> {
        Ok(vec![
            Self::Octocrab(OctocrabTransport::new(token, base_url, timeout)?),
            Self::Http(HttpTransport::new(token, base_url, timeout)?),
        ])
    }
}

impl Transport for GitHubTransport {
    fn name(&self) -> &str {
        match self {
            Self::Octocrab(transport) => transport.name(),
            Self::Http(transport) => transport.name(),
        }
    }

    async fn post_graphql(&self, body: &Value) -> Result<Value, TransportError> {
        match self {
            Self::Octocrab(transport) => transport.post_graphql(body).await,
            Self::Http(transport) => transport.post_graphql(body).await,
        }
    }

    async fn get_rest(&self, path_and_query: &str) -> Result<RestReply, TransportError> {
        match self {
            Self::Octocrab(transport) => transport.get_rest(path_and_query).await,
            Self::Http(transport) => transport.get_rest(path_and_query).await,
        }
    }
}
