use super::graphql_types::GraphQLError;

/// Coarse category of a GraphQL-level error message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphQLErrorKind {
    RateLimit,
    Authentication,
    Validation,
    Other,
}

/// Classifies a GraphQL error message for diagnostics.
pub fn classify_graphql_error(error_msg: &str) -> GraphQLErrorKind {
    let lowered = error_msg.to_lowercase();
    if lowered.contains("rate limit") {
        GraphQLErrorKind::RateLimit
    } else if lowered.contains("bad credentials") || lowered.contains("unauthorized") {
        GraphQLErrorKind::Authentication
    } else if lowered.contains("validation")
        || lowered.contains("syntax")
        || lowered.contains("doesn't exist on type")
    {
        GraphQLErrorKind::Validation
    } else {
        GraphQLErrorKind::Other
    }
}

/// Logs every error carried by a GraphQL response.
///
/// Errors are absorbed: callers fall back to whatever partial `data` came back.
pub fn log_graphql_errors(query_name: &str, errors: &[GraphQLError]) {
    for error in errors {
        match classify_graphql_error(&error.message) {
            GraphQLErrorKind::RateLimit => {
                tracing::warn!("GraphQL rate limit hit for {}: {}", query_name, error.message)
            }
            GraphQLErrorKind::Authentication => tracing::error!(
                "GraphQL authentication failed for {}: {}",
                query_name,
                error.message
            ),
            GraphQLErrorKind::Validation => tracing::error!(
                "GraphQL validation error for {}: {}",
                query_name,
                error.message
            ),
            GraphQLErrorKind::Other => {
                tracing::warn!("GraphQL error for {}: {}", query_name, error.message)
            }
        }
    }
}
