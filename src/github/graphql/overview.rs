use serde::{Deserialize, Serialize};

/// Nodes requested per list per page
pub const REPOSITORY_PAGE_SIZE: u8 = 100;

/// Languages requested per repository, largest first
pub const LANGUAGE_LIMIT: u8 = 10;

/// Cursors of the two independently paginated lists
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverviewVariable {
    #[serde(rename = "ownedCursor")]
    pub owned_cursor: Option<String>,
    #[serde(rename = "contribCursor")]
    pub contrib_cursor: Option<String>,
}

fn repository_node_body() -> String {
    format!(
        r#"nodes {{
                    nameWithOwner
                    stargazers {{
                        totalCount
                    }}
                    forkCount
                    languages(first: {LANGUAGE_LIMIT}, orderBy: {{field: SIZE, direction: DESC}}) {{
                        edges {{
                            size
                            node {{
                                name
                                color
                            }}
                        }}
                    }}
                }}"#
    )
}

/// Owned and contributed-to repositories of the viewer, one page of each
pub fn repositories_overview_query() -> String {
    let node_body = repository_node_body();
    format!(
        r#"
        query($ownedCursor: String, $contribCursor: String) {{
            viewer {{
                login
                name
                repositories(
                    first: {REPOSITORY_PAGE_SIZE},
                    orderBy: {{field: UPDATED_AT, direction: DESC}},
                    isFork: false,
                    after: $ownedCursor
                ) {{
                    pageInfo {{
                        hasNextPage
                        endCursor
                    }}
                    {node_body}
                }}
                repositoriesContributedTo(
                    first: {REPOSITORY_PAGE_SIZE},
                    includeUserRepositories: false,
                    orderBy: {{field: UPDATED_AT, direction: DESC}},
                    contributionTypes: [COMMIT, PULL_REQUEST, REPOSITORY, PULL_REQUEST_REVIEW],
                    after: $contribCursor
                ) {{
                    pageInfo {{
                        hasNextPage
                        endCursor
                    }}
                    {node_body}
                }}
            }}
        }}
    "#
    )
}
