use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::core::model::HistoricalPoint;
use crate::core::pair::CurrencyPair;
use crate::core::source::{HistoryParams, HistorySource, SourceResult};
use crate::providers::fallback::FallbackGenerator;
use crate::providers::{USER_AGENT, recover};

/// Historical rate series from `GET /api/exchange/{pair}/history`.
pub struct HttpHistorySource {
    base_url: String,
    fallback: FallbackGenerator,
}

impl HttpHistorySource {
    pub fn new(base_url: &str, fallback: FallbackGenerator) -> Self {
        HttpHistorySource {
            base_url: base_url.to_string(),
            fallback,
        }
    }

    async fn request(
        &self,
        pair: CurrencyPair,
        params: &HistoryParams,
    ) -> Result<Vec<HistoricalPoint>> {
        let url = format!(
            "{}/api/exchange/{}/history?period={}&limit={}",
            self.base_url, pair, params.period, params.limit
        );
        debug!("Requesting history from {}", url);

        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for pair: {}", e, pair))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} from history endpoint for pair: {}",
                response.status(),
                pair
            ));
        }

        let data = response
            .json::<HistoryResponse>()
            .await
            .map_err(|e| anyhow!("Failed to parse history response for {}: {}", pair, e))?;

        let mut points: Vec<HistoricalPoint> = data
            .data
            .into_iter()
            .map(|wire| HistoricalPoint {
                timestamp: wire.timestamp,
                rate: wire.rate,
                volume: wire.volume,
            })
            .collect();

        // Source order is not trusted.
        points.sort_by_key(|point| point.timestamp);
        points.truncate(params.limit);
        Ok(points)
    }
}

#[derive(Deserialize, Debug)]
struct HistoryResponse {
    data: Vec<WirePoint>,
}

#[derive(Deserialize, Debug)]
struct WirePoint {
    timestamp: DateTime<Utc>,
    rate: f64,
    volume: u64,
}

#[async_trait]
impl HistorySource for HttpHistorySource {
    #[instrument(name = "HistoryFetch", skip(self, params), fields(pair = %pair))]
    async fn fetch_history(
        &self,
        pair: CurrencyPair,
        params: &HistoryParams,
    ) -> SourceResult<Vec<HistoricalPoint>> {
        recover("history", self.request(pair, params).await, || {
            self.fallback.history(pair, params.limit, None)
        })
    }
}
