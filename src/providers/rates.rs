use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::core::model::RateQuote;
use crate::core::pair::CurrencyPair;
use crate::core::source::{RateSource, SourceResult};
use crate::providers::fallback::FallbackGenerator;
use crate::providers::{USER_AGENT, recover};

/// Live quotes for all tracked pairs from `GET /api/rates`. Acts as the
/// connection heartbeat for the whole service.
pub struct HttpRateSource {
    base_url: String,
    fallback: FallbackGenerator,
}

impl HttpRateSource {
    pub fn new(base_url: &str, fallback: FallbackGenerator) -> Self {
        HttpRateSource {
            base_url: base_url.to_string(),
            fallback,
        }
    }

    async fn request(&self) -> Result<HashMap<CurrencyPair, RateQuote>> {
        let url = format!("{}/api/rates", self.base_url);
        debug!("Requesting rates from {}", url);

        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for URL: {}", e, url))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} from rates endpoint",
                response.status()
            ));
        }

        let data = response
            .json::<RatesResponse>()
            .await
            .map_err(|e| anyhow!("Failed to parse rates response: {}", e))?;

        let mut rates = HashMap::new();
        for (pair, wire) in data.rates {
            if wire.rate <= 0.0 {
                debug!("Discarding non-positive rate for {}", pair);
                continue;
            }
            rates.insert(
                pair,
                RateQuote {
                    pair,
                    rate: wire.rate,
                    change: wire.change,
                    timestamp: wire.timestamp,
                },
            );
        }
        Ok(rates)
    }
}

#[derive(Deserialize, Debug)]
struct RatesResponse {
    rates: HashMap<CurrencyPair, WireQuote>,
}

#[derive(Deserialize, Debug)]
struct WireQuote {
    rate: f64,
    change: f64,
    timestamp: DateTime<Utc>,
}

#[async_trait]
impl RateSource for HttpRateSource {
    #[instrument(name = "RatesFetch", skip(self))]
    async fn fetch_rates(&self) -> SourceResult<HashMap<CurrencyPair, RateQuote>> {
        let mut result = recover("rates", self.request().await, || self.fallback.rates());

        // Pairs missing from a live response are backfilled individually
        // rather than discarding the whole response.
        for pair in CurrencyPair::all() {
            if !result.data.contains_key(&pair) {
                debug!("Backfilling missing quote for {}", pair);
                result.data.insert(pair, self.fallback.rate_quote(pair));
            }
        }
        result
    }
}
