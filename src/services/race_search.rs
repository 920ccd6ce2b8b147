use std::collections::HashSet;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// One event as returned by the race listing provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RaceResult {
    pub asset_guid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_name: Option<String>,
    pub home_page_url_adr: String,
    pub activity_start_date: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<RaceResult>,
}

#[derive(Debug, Clone)]
pub struct RaceQuery<'a> {
    pub distance_facet: &'a str,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub zipcode: &'a str,
}

#[derive(Debug, Clone)]
pub struct RaceSearchClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    radius_miles: u32,
}

impl RaceSearchClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.race_search_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.race_search_base_url.clone(),
            api_key: config.race_search_api_key.clone(),
            radius_miles: config.race_search_radius_miles,
        })
    }

    fn query_params(&self, query: &RaceQuery<'_>) -> Vec<(&'static str, String)> {
        vec![
            ("query", "running".to_string()),
            ("category", "event".to_string()),
            (
                "start_date",
                format!("{}..{}", query.from.format("%Y-%m-%d"), query.to.format("%Y-%m-%d")),
            ),
            ("near", query.zipcode.to_string()),
            ("radius", self.radius_miles.to_string()),
            ("attributes", query.distance_facet.to_string()),
            ("exclude_children", "true".to_string()),
            ("per_page", "50".to_string()),
            ("api_key", self.api_key.clone()),
        ]
    }

    /// Request errors are stripped of their URL, which carries the api key.
    async fn send(&self, params: &[(&'static str, String)]) -> reqwest::Result<reqwest::Response> {
        self.http
            .get(&self.base_url)
            .query(params)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
    }

    /// Races matching `query`, at most one per homepage.
    ///
    /// A provider or network failure is an error; an empty listing is not.
    pub async fn search(&self, query: &RaceQuery<'_>) -> AppResult<Vec<RaceResult>> {
        let params = self.query_params(query);

        let response = match self.send(&params).await {
            Err(e) if e.is_timeout() || e.is_connect() => {
                tracing::warn!(error = %e, "Race search request failed, retrying once");
                self.send(&params).await
            }
            other => other,
        }
        .map_err(|e| AppError::RaceSearch(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::RaceSearch(format!("provider error {}: {}", status, body)));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| {
                AppError::RaceSearch(format!("malformed provider response: {}", e.without_url()))
            })?;

        let total = body.results.len();
        let races = dedup_by_home_page(body.results);
        tracing::debug!(total, unique = races.len(), "Race search completed");
        Ok(races)
    }
}

/// Keeps the first result for each homepage URL, preserving order.
pub fn dedup_by_home_page(results: Vec<RaceResult>) -> Vec<RaceResult> {
    let mut seen = HashSet::new();
    results
        .into_iter()
        .filter(|race| seen.insert(race.home_page_url_adr.clone()))
        .collect()
}
