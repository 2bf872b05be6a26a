use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::core::model::Forecast;
use crate::core::pair::CurrencyPair;
use crate::core::source::{ForecastParams, ForecastSource, SourceResult};
use crate::providers::fallback::FallbackGenerator;
use crate::providers::{USER_AGENT, recover};

/// Short-horizon predictions from `POST /api/forecast`. The model runs
/// server-side; this client only normalizes and validates its output.
pub struct HttpForecastSource {
    base_url: String,
    fallback: FallbackGenerator,
}

impl HttpForecastSource {
    pub fn new(base_url: &str, fallback: FallbackGenerator) -> Self {
        HttpForecastSource {
            base_url: base_url.to_string(),
            fallback,
        }
    }

    async fn request(&self, pair: CurrencyPair, params: &ForecastParams) -> Result<Forecast> {
        let url = format!("{}/api/forecast", self.base_url);
        debug!("Requesting forecast from {} for {}", url, pair);
        let issued_at = Utc::now();

        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        let response = client
            .post(&url)
            .json(&ForecastRequest {
                pair,
                model: &params.model,
                horizon: params.horizon,
            })
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for pair: {}", e, pair))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} from forecast endpoint for pair: {}",
                response.status(),
                pair
            ));
        }

        let forecast = response
            .json::<Forecast>()
            .await
            .map_err(|e| anyhow!("Failed to parse forecast response for {}: {}", pair, e))?;

        // Predictions that run backwards or into the past are malformed; the
        // whole response is replaced rather than repaired.
        if !forecast.has_monotonic_predictions(issued_at) {
            return Err(anyhow!(
                "Forecast for {} has non-monotonic prediction timestamps",
                pair
            ));
        }
        Ok(forecast)
    }
}

#[derive(Serialize, Debug)]
struct ForecastRequest<'a> {
    pair: CurrencyPair,
    model: &'a str,
    horizon: usize,
}

#[async_trait]
impl ForecastSource for HttpForecastSource {
    #[instrument(name = "ForecastFetch", skip(self, params), fields(pair = %pair))]
    async fn fetch_forecast(
        &self,
        pair: CurrencyPair,
        params: &ForecastParams,
    ) -> SourceResult<Forecast> {
        recover("forecast", self.request(pair, params).await, || {
            self.fallback.forecast(pair, params.horizon, None)
        })
    }
}
