//! Terminal rendering of session snapshots.
//!
//! This is the external renderer from the core's point of view: it consumes
//! read-only snapshots and derived analytics, and owns nothing. It holds no
//! state of its own, so every notification reprints from scratch.

use crate::cli::ui;
use crate::core::analytics;
use crate::core::pair::CurrencyPair;
use crate::orchestrator::SessionState;
use chrono::Utc;
use comfy_table::Cell;

/// Articles shown per snapshot; storage is uncapped.
const NEWS_DISPLAY_LIMIT: usize = 5;

pub fn render_snapshot(state: &SessionState) -> String {
    let now = Utc::now();
    let mut output = String::new();

    let updated = state
        .last_rate_fetch
        .map_or("never".to_string(), |at| analytics::relative_time(at, now));
    output.push_str(&format!(
        "Markets: {} · {}\n\n",
        ui::status_badge(state.connection),
        ui::style_text(&format!("updated {updated}"), ui::StyleType::Subtle)
    ));

    output.push_str(&rate_board(state));

    if let Some(quote) = state.tracked_quote() {
        let pct = analytics::percent_change(quote);
        let sign = if analytics::is_positive_change(quote) {
            "+"
        } else {
            ""
        };
        output.push_str(&format!(
            "\n\n{}  {}  {} ({sign}{pct:.2}%)\n",
            ui::style_text(&state.tracked_pair.to_string(), ui::StyleType::Title),
            analytics::display_value(quote.rate, quote.pair),
            analytics::signed_display_value(quote.change, quote.pair),
        ));
    }

    if !state.history.is_empty() {
        let first = &state.history[0];
        let last = &state.history[state.history.len() - 1];
        output.push_str(&format!(
            "History: {} points, {} → {}\n",
            state.history.len(),
            analytics::display_value(first.rate, state.tracked_pair),
            analytics::display_value(last.rate, state.tracked_pair),
        ));
    }

    if let Some(forecast) = &state.forecast {
        output.push('\n');
        output.push_str(&forecast_table(state.tracked_pair, forecast));
    }

    if !state.news.is_empty() {
        output.push('\n');
        output.push_str(&news_table(state));
    }

    output
}

fn rate_board(state: &SessionState) -> String {
    let now = Utc::now();
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Pair"),
        ui::header_cell("Rate"),
        ui::header_cell("Change"),
        ui::header_cell("Change %"),
        ui::header_cell("Updated"),
    ]);

    for pair in CurrencyPair::all() {
        let marker = if pair == state.tracked_pair { "*" } else { " " };
        match state.rates_by_pair.get(&pair) {
            Some(quote) => {
                let positive = analytics::is_positive_change(quote);
                let pct = analytics::percent_change(quote);
                let sign = if positive { "+" } else { "" };
                table.add_row(vec![
                    Cell::new(format!("{marker}{pair}")),
                    Cell::new(analytics::display_value(quote.rate, pair)),
                    ui::change_cell(&analytics::signed_display_value(quote.change, pair), positive),
                    ui::change_cell(&format!("{sign}{pct:.2}%"), positive),
                    Cell::new(analytics::relative_time(quote.timestamp, now)),
                ]);
            }
            None => {
                table.add_row(vec![
                    Cell::new(format!("{marker}{pair}")),
                    Cell::new("N/A"),
                    Cell::new("N/A"),
                    Cell::new("N/A"),
                    Cell::new("N/A"),
                ]);
            }
        }
    }
    table.to_string()
}

fn forecast_table(pair: CurrencyPair, forecast: &crate::core::model::Forecast) -> String {
    let mut output = format!(
        "Forecast (ensemble, {:.1}% accuracy):\n",
        forecast.model_info.accuracy * 100.0
    );
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Time"),
        ui::header_cell("Predicted"),
        ui::header_cell("Confidence"),
    ]);
    for point in &forecast.predictions {
        table.add_row(vec![
            Cell::new(point.timestamp.format("%H:%M").to_string()),
            Cell::new(analytics::display_value(point.predicted, pair)),
            Cell::new(format!("{:.0}%", point.confidence * 100.0)),
        ]);
    }
    output.push_str(&table.to_string());
    output.push('\n');
    output
}

fn news_table(state: &SessionState) -> String {
    let now = Utc::now();
    let mut output = "Market news:\n".to_string();
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Headline"),
        ui::header_cell("Source"),
        ui::header_cell("When"),
        ui::header_cell("Sentiment"),
    ]);
    for article in state.news.iter().take(NEWS_DISPLAY_LIMIT) {
        table.add_row(vec![
            Cell::new(&article.title),
            Cell::new(&article.source),
            Cell::new(analytics::relative_time(article.timestamp, now)),
            ui::sentiment_cell(article.sentiment.label),
        ]);
    }
    output.push_str(&table.to_string());
    output.push('\n');
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::connection::ConnectionStatus;
    use crate::core::model::RateQuote;
    use std::collections::HashMap;

    fn state_with_one_quote() -> SessionState {
        let mut rates = HashMap::new();
        rates.insert(
            CurrencyPair::UsdEur,
            RateQuote {
                pair: CurrencyPair::UsdEur,
                rate: 1.0545,
                change: 0.0023,
                timestamp: Utc::now(),
            },
        );
        SessionState {
            rates_by_pair: rates,
            tracked_pair: CurrencyPair::UsdEur,
            history: Vec::new(),
            news: Vec::new(),
            forecast: None,
            connection: ConnectionStatus::Connected,
            last_rate_fetch: Some(Utc::now()),
            loading: false,
        }
    }

    #[test]
    fn test_render_includes_rates_and_status() {
        let rendered = render_snapshot(&state_with_one_quote());
        assert!(rendered.contains("connected"));
        assert!(rendered.contains("USD/EUR"));
        assert!(rendered.contains("1.0545"));
        assert!(rendered.contains("+0.0023"));
        // Scenario: 0.0023 / 1.0545 rounds to 0.22%.
        assert!(rendered.contains("+0.22%"));
    }

    #[test]
    fn test_render_handles_missing_quotes() {
        let mut state = state_with_one_quote();
        state.rates_by_pair.clear();
        let rendered = render_snapshot(&state);
        assert!(rendered.contains("N/A"));
    }

    #[test]
    fn test_news_rendering_caps_at_display_limit() {
        let mut state = state_with_one_quote();
        let article = crate::core::model::NewsArticle {
            id: "n".to_string(),
            title: "Headline".to_string(),
            content: "Body".to_string(),
            source: "Wire".to_string(),
            timestamp: Utc::now(),
            sentiment: crate::core::model::Sentiment::neutral(),
        };
        state.news = (0..8)
            .map(|i| {
                let mut a = article.clone();
                a.id = format!("n{i}");
                a.title = format!("Headline {i}");
                a
            })
            .collect();

        let rendered = render_snapshot(&state);
        assert!(rendered.contains("Headline 4"));
        assert!(!rendered.contains("Headline 5"));
    }
}
