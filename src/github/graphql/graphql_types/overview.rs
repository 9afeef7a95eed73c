use serde::{Deserialize, Serialize};

use super::{PageInfo, TotalCount};
use crate::types::lenient::{null_as_default, skip_invalid};

/// `data` of the dual-list repository overview query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewerOverviewResponse {
    #[serde(default)]
    pub viewer: Option<ViewerNode>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewerNode {
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub repositories: RepositoryConnection,
    #[serde(
        rename = "repositoriesContributedTo",
        default,
        deserialize_with = "null_as_default"
    )]
    pub repositories_contributed_to: RepositoryConnection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositoryConnection {
    #[serde(rename = "pageInfo", default, deserialize_with = "null_as_default")]
    pub page_info: PageInfo,
    /// `null` nodes (lost access mid-query) and malformed nodes are dropped
    #[serde(default, deserialize_with = "skip_invalid")]
    pub nodes: Vec<RepositoryNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryNode {
    #[serde(rename = "nameWithOwner")]
    pub name_with_owner: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stargazers: TotalCount,
    #[serde(rename = "forkCount", default, deserialize_with = "null_as_default")]
    pub fork_count: u64,
    #[serde(default)]
    pub languages: Option<LanguageConnection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LanguageConnection {
    #[serde(default, deserialize_with = "skip_invalid")]
    pub edges: Vec<LanguageEdge>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageEdge {
    #[serde(default, deserialize_with = "null_as_default")]
    pub size: u64,
    pub node: LanguageNode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageNode {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}
