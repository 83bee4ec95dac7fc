pub mod allocations;
pub mod assets;
pub mod rates;
pub mod setup;
pub mod ui;

use crate::core::currency::{BASE_CURRENCY, CurrencyRateProvider, ExchangeRateTable, RatesResult};
use crate::core::refresh::LoadKind;
use crate::providers::CachingRatesProvider;
use std::time::Duration;
use tracing::warn;

/// Rates needed to show amounts in `currency`. USD needs no lookup.
pub(crate) async fn rates_for<R: CurrencyRateProvider>(
    rates: &CachingRatesProvider<R>,
    currency: &str,
) -> RatesResult {
    if currency == BASE_CURRENCY {
        return RatesResult {
            rates: ExchangeRateTable::usd_only(),
            is_live: true,
            is_cached: false,
        };
    }
    rates.get_rates().await
}

/// Notices printed above a report when it is not built from live data.
pub(crate) fn data_notices(is_fallback_data: bool, approximate_rates: bool) -> Vec<String> {
    let mut notices = Vec::new();
    if is_fallback_data {
        notices.push(ui::style_text(
            "Displaying sample data: the OpenCost API could not be reached",
            ui::StyleType::Notice,
        ));
    }
    if approximate_rates {
        notices.push(ui::style_text(
            "≈ approximate rates: live exchange rates are unavailable",
            ui::StyleType::Notice,
        ));
    }
    notices
}

/// Completes on Ctrl-C. Never completes if the handler cannot be installed.
pub(crate) async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

/// Prints one watch-mode frame. Silent refreshes redraw in place.
pub(crate) fn print_frame(output: &str, kind: LoadKind, interval: Duration) {
    if kind == LoadKind::Silent {
        console::Term::stdout().clear_screen().ok();
    }
    println!("{output}");
    println!(
        "\n{}",
        ui::style_text(
            &format!(
                "Refreshing every {}s, press Ctrl-C to stop",
                interval.as_secs()
            ),
            ui::StyleType::Subtle,
        )
    );
}
