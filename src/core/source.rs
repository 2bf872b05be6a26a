//! Data source abstractions.
//!
//! One trait per source kind. Every fetch resolves to a [`SourceResult`]
//! carrying data of the same shape whether it came from the network or from
//! the fallback generator; callers never see a transport error.

use crate::core::model::{Forecast, HistoricalPoint, NewsArticle, RateQuote};
use crate::core::pair::CurrencyPair;
use async_trait::async_trait;
use std::collections::HashMap;

/// Outcome of a source fetch. `live` records whether the data came from the
/// remote service; the shape of `data` is identical either way, so consumers
/// only inspect the flag for health reporting, never for rendering.
#[derive(Debug, Clone)]
pub struct SourceResult<T> {
    pub data: T,
    pub live: bool,
}

impl<T> SourceResult<T> {
    pub fn live(data: T) -> Self {
        SourceResult { data, live: true }
    }

    pub fn fallback(data: T) -> Self {
        SourceResult { data, live: false }
    }
}

#[derive(Debug, Clone)]
pub struct HistoryParams {
    pub period: String,
    pub limit: usize,
}

impl Default for HistoryParams {
    fn default() -> Self {
        HistoryParams {
            period: "24h".to_string(),
            limit: 20,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ForecastParams {
    pub model: String,
    pub horizon: usize,
}

impl Default for ForecastParams {
    fn default() -> Self {
        ForecastParams {
            model: "ensemble".to_string(),
            horizon: 12,
        }
    }
}

/// Live quotes for every tracked pair. Doubles as the connection heartbeat.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_rates(&self) -> SourceResult<HashMap<CurrencyPair, RateQuote>>;
}

/// Historical rate series for a single pair, ascending by timestamp.
#[async_trait]
pub trait HistorySource: Send + Sync {
    async fn fetch_history(
        &self,
        pair: CurrencyPair,
        params: &HistoryParams,
    ) -> SourceResult<Vec<HistoricalPoint>>;
}

#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn fetch_news(&self, pair: CurrencyPair) -> SourceResult<Vec<NewsArticle>>;
}

#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn fetch_forecast(
        &self,
        pair: CurrencyPair,
        params: &ForecastParams,
    ) -> SourceResult<Forecast>;
}
