use crate::core::cumulative::{CostTotals, format_efficiency};
use crate::core::currency::format_currency;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    TotalLabel,
    TotalValue,
    Notice,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::TotalLabel => style(text).bold(),
        StyleType::TotalValue => style(text).green().bold(),
        StyleType::Notice => style(text).yellow(),
        StyleType::Error => style(text).red(),
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

/// Formats an `Option<T>` into a `Cell`. `None` is displayed as "—".
pub fn format_optional_cell<T>(value: Option<T>, format_fn: impl Fn(T) -> String) -> Cell {
    value.map_or(Cell::new("—").fg(Color::DarkGrey), |v| Cell::new(format_fn(v)))
}

/// Right-aligned amount in the display currency.
pub fn currency_cell(amount: f64, currency: &str) -> Cell {
    Cell::new(format_currency(amount, currency)).set_alignment(CellAlignment::Right)
}

/// Bold green total for the last column of a row.
pub fn total_cell(amount: f64, currency: &str) -> Cell {
    currency_cell(amount, currency)
        .add_attribute(Attribute::Bold)
        .fg(Color::Green)
}

/// Efficiency coloured by how well requests match usage.
pub fn efficiency_cell(efficiency: f64) -> Cell {
    let color = if efficiency == 0.0 {
        Color::DarkGrey
    } else if efficiency >= 0.65 {
        Color::Green
    } else if efficiency >= 0.35 {
        Color::Yellow
    } else {
        Color::Red
    };
    Cell::new(format_efficiency(efficiency))
        .fg(color)
        .set_alignment(CellAlignment::Right)
}

/// Summary tiles shown above the allocation table.
pub fn totals_table(totals: &CostTotals, currency: &str) -> Table {
    let mut table = new_styled_table();
    table.set_header(vec![
        header_cell("Total Cost"),
        header_cell("CPU"),
        header_cell("RAM"),
        header_cell("GPU"),
        header_cell("PV"),
        header_cell("Avg. Efficiency"),
        header_cell("Items"),
    ]);
    table.add_row(vec![
        total_cell(totals.total_cost, currency),
        currency_cell(totals.cpu_cost, currency),
        currency_cell(totals.ram_cost, currency),
        currency_cell(totals.gpu_cost, currency),
        currency_cell(totals.pv_cost, currency),
        efficiency_cell(totals.average_efficiency),
        Cell::new(totals.count).set_alignment(CellAlignment::Right),
    ]);
    table
}

/// Spinner shown while the first load is in flight.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_table_renders_tiles() {
        let totals = CostTotals {
            total_cost: 1234.5,
            cpu_cost: 1000.0,
            average_efficiency: 0.425,
            count: 3,
            ..Default::default()
        };
        let rendered = totals_table(&totals, "USD").to_string();
        assert!(rendered.contains("$1,234.50"));
        assert!(rendered.contains("$1,000.00"));
        assert!(rendered.contains("42.5%"));
        assert!(rendered.contains("Avg. Efficiency"));
    }

    #[test]
    fn test_unknown_efficiency_is_dash() {
        assert_eq!(efficiency_cell(0.0).content(), "—");
        assert_eq!(format_optional_cell(None::<&str>, str::to_string).content(), "—");
    }
}
