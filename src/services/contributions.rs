//! All-time contribution total
//!
//! Two round trips: discover the contribution years, then fetch every year's
//! calendar total in one fan-out query.

use anyhow::Result;
use serde_json::Value;
use tracing::{info, warn};

use crate::github::graphql::contributions::{all_contributions_query, contribution_years_query};
use crate::github::graphql::graphql_types::{
    ContributionYearsResponse, GraphQLPayload, GraphQLResponse, YearlyContributionsResponse,
};
use crate::github::{RequestGateway, Transport};

pub struct ContributionTotalsResolver<'a, T> {
    gateway: &'a RequestGateway<T>,
}

impl<'a, T: Transport> ContributionTotalsResolver<'a, T> {
    pub fn new(gateway: &'a RequestGateway<T>) -> Self {
        Self { gateway }
    }

    /// Sum of every year's contribution total; 0 when nothing comes back.
    pub async fn resolve(&self) -> Result<u64> {
        let raw = self
            .gateway
            .query(
                "contribution_years",
                &GraphQLPayload::without_variables(contribution_years_query()),
            )
            .await?;
        let years = contribution_years(raw);
        if years.is_empty() {
            info!("No contribution years found");
            return Ok(0);
        }

        let raw = self
            .gateway
            .query(
                "contributions_by_year",
                &GraphQLPayload::without_variables(all_contributions_query(&years)),
            )
            .await?;
        let total = sum_yearly_contributions(raw);
        info!(
            "Resolved {} contributions across {} year(s)",
            total,
            years.len()
        );
        Ok(total)
    }
}

/// Years listed by the contribution years query
pub fn contribution_years(raw: Value) -> Vec<i32> {
    match serde_json::from_value::<GraphQLResponse<ContributionYearsResponse>>(raw) {
        Ok(response) => response
            .data
            .and_then(|data| data.viewer)
            .and_then(|viewer| viewer.contributions_collection)
            .map(|collection| collection.contribution_years)
            .unwrap_or_default(),
        Err(e) => {
            warn!("Unexpected contribution years response: {}", e);
            Vec::new()
        }
    }
}

/// Sum over every aliased year in the fan-out response
pub fn sum_yearly_contributions(raw: Value) -> u64 {
    match serde_json::from_value::<GraphQLResponse<YearlyContributionsResponse>>(raw) {
        Ok(response) => response
            .data
            .and_then(|data| data.viewer)
            .map(|years| {
                years
                    .values()
                    .flatten()
                    .map(|year| year.contribution_calendar.total_contributions)
                    .sum()
            })
            .unwrap_or(0),
        Err(e) => {
            warn!("Unexpected yearly contributions response: {}", e);
            0
        }
    }
}
