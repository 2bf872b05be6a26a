//! Derived values computed from session state on every read.
//!
//! All functions here are pure; nothing is cached, so the derivations can
//! never drift from the raw quotes they were computed from.

use crate::core::model::RateQuote;
use crate::core::pair::CurrencyPair;
use chrono::{DateTime, Utc};

/// Change of a quote as a percentage of its rate. A zero rate (degenerate,
/// only possible before any fetch) yields 0 rather than dividing.
pub fn percent_change(quote: &RateQuote) -> f64 {
    if quote.rate == 0.0 {
        return 0.0;
    }
    (quote.change / quote.rate) * 100.0
}

/// Whether the quote moved up (or held) since the previous tick.
pub fn is_positive_change(quote: &RateQuote) -> bool {
    quote.change >= 0.0
}

/// Rounds a value to the pair's conventional precision: two decimals for
/// JPY-quoted pairs, four otherwise.
pub fn display_value(value: f64, pair: CurrencyPair) -> String {
    format!("{value:.prec$}", prec = pair.display_decimals())
}

/// Like [`display_value`] but with an explicit sign, for change columns.
pub fn signed_display_value(value: f64, pair: CurrencyPair) -> String {
    let formatted = display_value(value, pair);
    if value >= 0.0 {
        format!("+{formatted}")
    } else {
        formatted
    }
}

/// Human-readable elapsed time, floor-divided at each tier boundary.
pub fn relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - timestamp).num_minutes();
    if minutes < 1 {
        return "just now".to_string();
    }
    if minutes < 60 {
        return format!("{minutes}m ago");
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h ago");
    }

    let days = hours / 24;
    format!("{days}d ago")
}
