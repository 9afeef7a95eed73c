pub mod error;
pub mod gateway;
pub mod graphql;
pub mod rest_types;
pub mod transport;

pub use gateway::{GatewayOptions, RequestGateway, RestResponse};
pub use graphql::graphql_types;
pub use transport::{GitHubTransport, HttpTransport, OctocrabTransport, RestReply, Transport};
