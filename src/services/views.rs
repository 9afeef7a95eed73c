//! Traffic views across owned repositories

use std::collections::BTreeSet;

use anyhow::Result;
use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use crate::github::rest_types::TrafficViews;
use crate::github::{RequestGateway, RestResponse, Transport};
use crate::types::NameWithOwner;

pub struct ViewsAggregator<'a, T> {
    gateway: &'a RequestGateway<T>,
}

impl<'a, T: Transport> ViewsAggregator<'a, T> {
    pub fn new(gateway: &'a RequestGateway<T>) -> Self {
        Self { gateway }
    }

    /// Sum of view counts over every time bucket of every repository in `repos`.
    pub async fn total_views(&self, repos: &BTreeSet<NameWithOwner>) -> Result<u64> {
        let concurrency = self.gateway.options().max_connections.max(1);

        let results: Vec<Result<u64>> = stream::iter(repos.iter())
            .map(|repo| async move {
                let response = self
                    .gateway
                    .query_paged(&repo.traffic_views_path(), &[])
                    .await?;
                Ok::<_, anyhow::Error>(views_from_response(repo, response))
            })
            .buffered(concurrency)
            .collect()
            .await;

        let mut total = 0;
        for views in results {
            total += views?;
        }
        info!("Total views across {} repositories: {}", repos.len(), total);
        Ok(total)
    }
}

/// View count carried by one traffic response; anything unusable counts as zero.
pub fn views_from_response(repo: &NameWithOwner, response: RestResponse) -> u64 {
    let value = match response {
        RestResponse::Success(value) => value,
        RestResponse::Pending => {
            debug!("Traffic views for {} still pending, counting 0", repo);
            return 0;
        }
        RestResponse::Malformed(reason) => {
            debug!("Traffic views for {} unavailable ({}), counting 0", repo, reason);
            return 0;
        }
    };

    match serde_json::from_value::<TrafficViews>(value) {
        Ok(traffic) => traffic.views.iter().map(|bucket| bucket.count).sum(),
        Err(e) => {
            debug!("Unexpected traffic views body for {}: {}", repo, e);
            0
        }
    }
}
