//! Request gateway shared by every stats component
//!
//! The gateway issues one logical API call at a time per caller, walks its
//! ordered transport list on transport failure, retries REST calls that
//! answer `202 Accepted`, and caps in-flight requests process-wide.

use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{Semaphore, SemaphorePermit};
use tokio::time::{Duration, sleep};
use tracing::{debug, info, warn};

use super::error::TransportError;
use super::graphql::error::log_graphql_errors;
use super::graphql::graphql_types::{GraphQLError, GraphQLPayload};
use super::transport::{RestReply, Transport};

/// Default cap on simultaneous in-flight requests
pub const DEFAULT_MAX_CONNECTIONS: usize = 10;

/// Default number of attempts against a REST endpoint that keeps answering 202
pub const DEFAULT_PENDING_RETRY_LIMIT: u32 = 60;

/// Default pause between 202 attempts
pub const DEFAULT_PENDING_RETRY_DELAY: Duration = Duration::from_secs(2);

/// HTTP status GitHub uses for "statistics are being computed"
pub const STATUS_ACCEPTED: u16 = 202;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayOptions {
    pub max_connections: usize,
    pub pending_retry_limit: u32,
    pub pending_retry_delay: Duration,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            pending_retry_limit: DEFAULT_PENDING_RETRY_LIMIT,
            pending_retry_delay: DEFAULT_PENDING_RETRY_DELAY,
        }
    }
}

/// Outcome of a REST call, decoded once at the gateway boundary
#[derive(Debug, Clone, PartialEq)]
pub enum RestResponse {
    /// 2xx with a non-null JSON body
    Success(Value),
    /// Every attempt answered 202; the data is not available this run
    Pending,
    /// Non-success status, empty or undecodable body
    Malformed(String),
}

impl RestResponse {
    pub fn decode(reply: RestReply) -> Self {
        if !(200..300).contains(&reply.status) {
            return Self::Malformed(format!("unexpected status {}", reply.status));
        }
        match serde_json::from_str::<Value>(&reply.body) {
            Ok(Value::Null) => Self::Malformed("null body".to_string()),
            Ok(value) => Self::Success(value),
            Err(e) => Self::Malformed(format!("invalid JSON body: {}", e)),
        }
    }

    pub fn into_success(self) -> Option<Value> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }
}

pub struct RequestGateway<T> {
    transports: Vec<T>,
    semaphore: Semaphore,
    options: GatewayOptions,
}

impl<T: Transport> RequestGateway<T> {
    /// `transports` are tried in order on transport failure.
    pub fn new(transports: Vec<T>, options: GatewayOptions) -> Self {
        Self {
            transports,
            semaphore: Semaphore::new(options.max_connections.max(1)),
            options,
        }
    }

    pub fn options(&self) -> &GatewayOptions {
        &self.options
    }

    async fn permit(&self) -> Result<SemaphorePermit<'_>> {
        self.semaphore
            .acquire()
            .await
            .context("Request concurrency gate closed")
    }

    /// Sends one GraphQL query and returns the raw JSON response.
    ///
    /// GraphQL-level `errors` are logged but not treated as failures; callers
    /// decide what a response without `data` means.
    pub async fn query<V: Serialize>(
        &self,
        query_name: &str,
        payload: &GraphQLPayload<V>,
    ) -> Result<Value> {
        let body = serde_json::to_value(payload)
            .with_context(|| format!("Failed to serialize GraphQL payload for {}", query_name))?;

        let start_time = std::time::Instant::now();
        let response = self.send_graphql(query_name, &body).await?;
        debug!(
            "GraphQL request {} completed in {:?}",
            query_name,
            start_time.elapsed()
        );

        if let Some(errors) = response.get("errors") {
            if let Ok(errors) = serde_json::from_value::<Vec<GraphQLError>>(errors.clone()) {
                log_graphql_errors(query_name, &errors);
            }
        }

        Ok(response)
    }

    /// Sends one REST GET, retrying while the endpoint answers 202.
    ///
    /// After `pending_retry_limit` attempts the call gives up and yields
    /// [`RestResponse::Pending`] rather than an error.
    pub async fn query_paged(&self, path: &str, params: &[(&str, &str)]) -> Result<RestResponse> {
        let path_and_query = rest_path_and_query(path, params);
        let limit = self.options.pending_retry_limit;

        for attempt in 1..=limit {
            let reply = self.send_rest(&path_and_query).await?;
            if reply.status != STATUS_ACCEPTED {
                return Ok(RestResponse::decode(reply));
            }

            info!(
                "{} returned 202 (attempt {}/{}). Retrying...",
                path_and_query, attempt, limit
            );
            if attempt < limit {
                sleep(self.options.pending_retry_delay).await;
            }
        }

        warn!(
            "There were too many 202s for {}. Data for this repository will be incomplete.",
            path_and_query
        );
        Ok(RestResponse::Pending)
    }

    async fn send_graphql(&self, query_name: &str, body: &Value) -> Result<Value> {
        let mut last_error: Option<TransportError> = None;

        for transport in &self.transports {
            let result = {
                let _permit = self.permit().await?;
                transport.post_graphql(body).await
            };
            match result {
                Ok(response) => return Ok(response),
                Err(e) => {
                    warn!(
                        "{} transport failed for GraphQL query {}: {}",
                        transport.name(),
                        query_name,
                        e
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(exhausted(last_error).context(format!("GraphQL query {} failed", query_name)))
    }

    async fn send_rest(&self, path_and_query: &str) -> Result<RestReply> {
        let mut last_error: Option<TransportError> = None;

        for transport in &self.transports {
            let result = {
                let _permit = self.permit().await?;
                transport.get_rest(path_and_query).await
            };
            match result {
                Ok(reply) => return Ok(reply),
                Err(e) => {
                    warn!(
                        "{} transport failed for REST query {}: {}",
                        transport.name(),
                        path_and_query,
                        e
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(exhausted(last_error).context(format!("REST query {} failed", path_and_query)))
    }
}

fn exhausted(last_error: Option<TransportError>) -> anyhow::Error {
    match last_error {
        Some(e) => anyhow::Error::new(e),
        None => anyhow!("No transport configured"),
    }
}

/// Normalizes `path` to start with `/` and appends percent-encoded params.
pub fn rest_path_and_query(path: &str, params: &[(&str, &str)]) -> String {
    let path = format!("/{}", path.trim_start_matches('/'));
    if params.is_empty() {
        return path;
    }

    let query = params
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", path, query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_path_and_query() {
        assert_eq!(
            rest_path_and_query("repos/a/b/traffic/views", &[]),
            "/repos/a/b/traffic/views"
        );
        assert_eq!(
            rest_path_and_query("/repos/a/b/commits", &[("author", "octo cat"), ("per_page", "100")]),
            "/repos/a/b/commits?author=octo%20cat&per_page=100"
        );
    }

    #[test]
    fn test_decode_rest_reply() {
        assert_eq!(
            RestResponse::decode(RestReply::new(200, "[1, 2]")),
            RestResponse::Success(serde_json::json!([1, 2]))
        );
        assert!(matches!(
            RestResponse::decode(RestReply::new(200, "null")),
            RestResponse::Malformed(_)
        ));
        assert!(matches!(
            RestResponse::decode(RestReply::new(200, "<html>")),
            RestResponse::Malformed(_)
        ));
        assert!(matches!(
            RestResponse::decode(RestReply::new(404, r#"{"message": "Not Found"}"#)),
            RestResponse::Malformed(_)
        ));
    }
}
