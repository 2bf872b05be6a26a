//! Market data entities shared across sources and the session state.

use crate::core::pair::CurrencyPair;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A live quote for one currency pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateQuote {
    pub pair: CurrencyPair,
    pub rate: f64,
    pub change: f64,
    pub timestamp: DateTime<Utc>,
}

/// One bar of the historical rate series for the tracked pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalPoint {
    pub timestamp: DateTime<Utc>,
    pub rate: f64,
    pub volume: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SentimentLabel::Positive => write!(f, "positive"),
            SentimentLabel::Negative => write!(f, "negative"),
            SentimentLabel::Neutral => write!(f, "neutral"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentiment {
    pub label: SentimentLabel,
    pub score: f64,
}

impl Sentiment {
    /// Sentiment assigned to articles the source did not score.
    pub fn neutral() -> Self {
        Sentiment {
            label: SentimentLabel::Neutral,
            score: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsArticle {
    pub id: String,
    pub title: String,
    pub content: String,
    pub source: String,
    pub timestamp: DateTime<Utc>,
    pub sentiment: Sentiment,
}

/// A single forecast step. Timestamps across a forecast are strictly
/// increasing and always lie after the time the forecast was requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionPoint {
    pub timestamp: DateTime<Utc>,
    pub predicted: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub accuracy: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forecast {
    pub pair: CurrencyPair,
    pub predictions: Vec<PredictionPoint>,
    pub model_info: ModelInfo,
}

impl Forecast {
    /// Structural validity: timestamps strictly increasing, and every point
    /// later than `issued_at`.
    pub fn has_monotonic_predictions(&self, issued_at: DateTime<Utc>) -> bool {
        let mut last = issued_at;
        for point in &self.predictions {
            if point.timestamp <= last {
                return false;
            }
            last = point.timestamp;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn forecast_with_offsets(offsets_mins: &[i64]) -> (Forecast, DateTime<Utc>) {
        let issued = Utc::now();
        let predictions = offsets_mins
            .iter()
            .map(|m| PredictionPoint {
                timestamp: issued + Duration::minutes(*m),
                predicted: 1.05,
                confidence: 0.8,
            })
            .collect();
        (
            Forecast {
                pair: CurrencyPair::UsdEur,
                predictions,
                model_info: ModelInfo { accuracy: 0.847 },
            },
            issued,
        )
    }

    #[test]
    fn test_monotonic_predictions_accepted() {
        let (forecast, issued) = forecast_with_offsets(&[60, 120, 180]);
        assert!(forecast.has_monotonic_predictions(issued));
    }

    #[test]
    fn test_out_of_order_predictions_rejected() {
        let (forecast, issued) = forecast_with_offsets(&[60, 180, 120]);
        assert!(!forecast.has_monotonic_predictions(issued));
    }

    #[test]
    fn test_past_predictions_rejected() {
        let (forecast, issued) = forecast_with_offsets(&[-60, 60, 120]);
        assert!(!forecast.has_monotonic_predictions(issued));
    }

    #[test]
    fn test_duplicate_timestamps_rejected() {
        let (forecast, issued) = forecast_with_offsets(&[60, 60, 120]);
        assert!(!forecast.has_monotonic_predictions(issued));
    }
}
