pub mod contributions;
pub mod error;
pub mod graphql_types;
pub mod overview;
