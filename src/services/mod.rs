//! Stats services
//!
//! Each component issues its requests through the shared
//! [`RequestGateway`](crate::github::RequestGateway); [`Stats`] wires them
//! together behind a memoized snapshot.

pub mod cache;
pub mod collector;
pub mod contributions;
pub mod lines_changed;
pub mod stats;
pub mod views;

pub use cache::{CacheStore, CacheStoreError};
pub use collector::{OverviewAccumulator, RepositoryCollector, RepositoryOverview};
pub use contributions::ContributionTotalsResolver;
pub use lines_changed::{ContributorFetch, LinesChangedEngine};
pub use stats::Stats;
pub use views::ViewsAggregator;
