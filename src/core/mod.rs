//! Core business logic abstractions

pub mod analytics;
pub mod connection;
pub mod model;
pub mod pair;
pub mod source;

// Re-export main types for cleaner imports
pub use connection::ConnectionStatus;
pub use model::{Forecast, HistoricalPoint, NewsArticle, RateQuote};
pub use pair::CurrencyPair;
pub use source::{
    ForecastParams, ForecastSource, HistoryParams, HistorySource, NewsSource, RateSource,
    SourceResult,
};
