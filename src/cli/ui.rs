use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::core::connection::ConnectionStatus;
use crate::core::model::SentimentLabel;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Creates a right-aligned cell for a change value, colored by direction.
pub fn change_cell(text: &str, positive: bool) -> Cell {
    let color = if positive { Color::Green } else { Color::Red };
    Cell::new(text)
        .fg(color)
        .set_alignment(CellAlignment::Right)
}

/// Connection badge colored the conventional way: green when healthy, yellow
/// while connecting, red otherwise.
pub fn status_badge(status: ConnectionStatus) -> String {
    let text = status.to_string();
    let styled = match status {
        ConnectionStatus::Connected => style(text).green(),
        ConnectionStatus::Connecting => style(text).yellow(),
        ConnectionStatus::Disconnected | ConnectionStatus::Error => style(text).red(),
    };
    styled.to_string()
}

/// Sentiment tag for news rows.
pub fn sentiment_cell(label: SentimentLabel) -> Cell {
    let color = match label {
        SentimentLabel::Positive => Color::Green,
        SentimentLabel::Negative => Color::Red,
        SentimentLabel::Neutral => Color::Yellow,
    };
    Cell::new(label.to_string()).fg(color)
}

/// Creates a spinner for the startup fetch.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb
}
