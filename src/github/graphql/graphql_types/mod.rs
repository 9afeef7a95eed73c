pub mod contributions;
pub mod overview;
pub mod pager;

use serde::{Deserialize, Serialize};

pub use contributions::*;
pub use overview::*;
pub use pager::*;

#[derive(Debug, Clone, Serialize)]
pub struct GraphQLQuery(pub String);

#[derive(Debug, Clone, Serialize)]
pub struct GraphQLPayload<T: serde::Serialize> {
    pub query: GraphQLQuery,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<T>,
}

impl GraphQLPayload<()> {
    /// Payload for a query that takes no variables
    pub fn without_variables(query: String) -> Self {
        Self {
            query: GraphQLQuery(query),
            variables: None,
        }
    }
}

/// Envelope of every GraphQL response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQLError>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQLError {
    pub message: String,
    #[serde(default)]
    pub locations: Vec<serde_json::Value>,
    #[serde(default)]
    pub path: Vec<serde_json::Value>,
}

/// Wrapper for `{ totalCount }` connections
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TotalCount {
    #[serde(
        rename = "totalCount",
        default,
        deserialize_with = "crate::types::lenient::null_as_default"
    )]
    pub total_count: u64,
}
