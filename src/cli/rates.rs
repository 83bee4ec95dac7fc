use super::ui;
use crate::core::currency::{
    BASE_CURRENCY, CURRENCY_OPTIONS, CurrencyRateProvider, RatesResult, currency_option,
};
use crate::core::preferences::Preferences;
use crate::providers::CachingRatesProvider;
use anyhow::{Result, bail};
use comfy_table::{Attribute, Cell, CellAlignment};

fn source_label(result: &RatesResult) -> String {
    match (result.is_live, result.is_cached) {
        (true, true) => ui::style_text("Live rates (cached)", ui::StyleType::Subtle),
        (true, false) => ui::style_text("Live rates", ui::StyleType::Subtle),
        (false, _) => ui::style_text(
            "≈ approximate rates: live exchange rates are unavailable",
            ui::StyleType::Notice,
        ),
    }
}

/// Rate table for every supported currency, marking `selected`.
pub fn render(result: &RatesResult, selected: &str) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Code"),
        ui::header_cell("Currency"),
        ui::header_cell("Symbol"),
        ui::header_cell(&format!("Rate (1 {BASE_CURRENCY})")),
    ]);

    for option in CURRENCY_OPTIONS.iter() {
        let rate = result
            .rates
            .contains(option.code)
            .then(|| result.rates.rate_for(option.code));
        let mut code = Cell::new(option.code);
        if option.code == selected {
            code = Cell::new(format!("{} *", option.code)).add_attribute(Attribute::Bold);
        }
        table.add_row(vec![
            code,
            Cell::new(option.name),
            Cell::new(option.symbol),
            ui::format_optional_cell(rate, |r| format!("{r:.4}"))
                .set_alignment(CellAlignment::Right),
        ]);
    }

    format!(
        "{}\n{}\n\n{}",
        ui::style_text("Exchange Rates", ui::StyleType::Title),
        source_label(result),
        table
    )
}

pub async fn run<R: CurrencyRateProvider>(
    rates: &CachingRatesProvider<R>,
    selected: &str,
) -> Result<()> {
    let spinner = ui::new_spinner("Fetching exchange rates...");
    let result = rates.get_rates().await;
    spinner.finish_and_clear();
    println!("{}", render(&result, selected));
    Ok(())
}

/// Shows the saved display currency, or saves `code` as the new one.
pub async fn currency(preferences: &Preferences, code: Option<&str>) -> Result<()> {
    let Some(code) = code else {
        let current = preferences.load_currency().await;
        let name = currency_option(&current).map_or("", |option| option.name);
        println!("Display currency: {current} ({name})");
        return Ok(());
    };

    if currency_option(code).is_none() {
        let supported = CURRENCY_OPTIONS
            .iter()
            .map(|option| option.code)
            .collect::<Vec<_>>()
            .join(", ");
        bail!("Unsupported currency: {}. Supported: {}", code, supported);
    }
    let saved = preferences.save_currency(code).await?;
    println!("Display currency set to {saved}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::{ExchangeRateTable, fallback_rates};
    use crate::store::memory::MemoryCollection;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    #[test]
    fn test_render_marks_selected_and_missing() {
        let result = RatesResult {
            rates: ExchangeRateTable::new(BTreeMap::from([("EUR".to_string(), 0.9123)])),
            is_live: true,
            is_cached: true,
        };
        let output = render(&result, "EUR");
        assert!(output.contains("Live rates (cached)"));
        assert!(output.contains("EUR *"));
        assert!(output.contains("0.9123"));
        assert!(output.contains("1.0000"));
        assert!(output.contains("—"));
    }

    #[test]
    fn test_render_fallback_notice() {
        let result = RatesResult {
            rates: fallback_rates(),
            is_live: false,
            is_cached: false,
        };
        assert!(render(&result, "USD").contains("≈ approximate rates"));
    }

    #[tokio::test]
    async fn test_currency_command_saves_preference() {
        let preferences = Preferences::new(Arc::new(MemoryCollection::new()));
        currency(&preferences, Some("gbp")).await.unwrap();
        assert_eq!(preferences.load_currency().await, "GBP");

        let err = currency(&preferences, Some("XYZ")).await.unwrap_err();
        assert!(err.to_string().starts_with("Unsupported currency: XYZ"));
        assert_eq!(preferences.load_currency().await, "GBP");

        currency(&preferences, None).await.unwrap();
    }
}
