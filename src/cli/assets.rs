use super::ui;
use crate::core::asset::{AssetKind, AssetRecord, summarize_by_kind};
use crate::core::currency::{
    BASE_CURRENCY, CurrencyRateProvider, RatesResult, convert_asset, format_currency,
};
use crate::core::export::{asset_csv, resolve_export_path, write_csv};
use crate::core::refresh::{LoadKind, Refresher};
use crate::core::service::{AssetDataService, AssetInventory};
use crate::core::window::ReportWindow;
use crate::providers::CachingRatesProvider;
use anyhow::Result;
use chrono::Utc;
use comfy_table::{Cell, CellAlignment};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetsOptions {
    pub window: ReportWindow,
    /// Only list assets of this kind.
    pub kind: Option<AssetKind>,
    pub currency: Option<String>,
    pub export: Option<PathBuf>,
    pub watch: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssetReport {
    pub assets: Vec<AssetRecord>,
    pub by_kind: BTreeMap<AssetKind, (usize, f64)>,
    pub total_cost: f64,
    pub currency: String,
    pub is_fallback_data: bool,
    pub approximate_rates: bool,
}

pub fn build_report(
    inventory: AssetInventory,
    rates: &RatesResult,
    currency: &str,
    kind: Option<AssetKind>,
) -> AssetReport {
    let rate = rates.rates.rate_for(currency);
    let mut assets: Vec<AssetRecord> = inventory
        .assets
        .iter()
        .filter(|asset| kind.is_none_or(|k| asset.kind() == k))
        .map(|asset| convert_asset(asset, rate))
        .collect();
    assets.sort_by(|a, b| b.total_cost.total_cmp(&a.total_cost));

    AssetReport {
        by_kind: summarize_by_kind(&assets),
        total_cost: assets.iter().map(|a| a.total_cost).sum(),
        assets,
        currency: currency.to_string(),
        is_fallback_data: inventory.is_fallback_data,
        approximate_rates: !rates.is_live && currency != BASE_CURRENCY,
    }
}

fn details_text(asset: &AssetRecord) -> String {
    asset
        .detail_fields()
        .into_iter()
        .map(|(label, value)| format!("{label}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render(report: &AssetReport, window: ReportWindow) -> String {
    let title = format!("Assets ({})", window.label());
    let mut output = ui::style_text(&title, ui::StyleType::Title);
    output.push('\n');
    for notice in super::data_notices(report.is_fallback_data, report.approximate_rates) {
        output.push_str(&notice);
        output.push('\n');
    }

    if report.assets.is_empty() {
        output.push_str("\nNo results");
        return output;
    }

    let currency = report.currency.as_str();
    let mut summary = ui::new_styled_table();
    summary.set_header(vec![
        ui::header_cell("Type"),
        ui::header_cell("Count"),
        ui::header_cell(&format!("Total Cost ({currency})")),
    ]);
    for (kind, (count, cost)) in &report.by_kind {
        summary.add_row(vec![
            Cell::new(kind.label()),
            Cell::new(count).set_alignment(CellAlignment::Right),
            ui::currency_cell(*cost, currency),
        ]);
    }
    output.push('\n');
    output.push_str(&summary.to_string());
    output.push_str("\n\n");

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Name"),
        ui::header_cell("Type"),
        ui::header_cell("Provider"),
        ui::header_cell("Cluster"),
        ui::header_cell("Details"),
        ui::header_cell(&format!("Total Cost ({currency})")),
    ]);
    for asset in &report.assets {
        table.add_row(vec![
            ui::format_optional_cell(asset.name(), str::to_string),
            Cell::new(asset.kind().label()),
            ui::format_optional_cell(asset.properties.provider.as_deref(), str::to_string),
            ui::format_optional_cell(asset.properties.cluster.as_deref(), str::to_string),
            Cell::new(details_text(asset)),
            ui::total_cell(asset.total_cost, currency),
        ]);
    }
    output.push_str(&table.to_string());

    output.push_str(&format!(
        "\n\nTotal ({}): {}",
        ui::style_text(currency, ui::StyleType::TotalLabel),
        ui::style_text(
            &format_currency(report.total_cost, currency),
            ui::StyleType::TotalValue
        )
    ));
    output
}

pub async fn run<R: CurrencyRateProvider>(
    service: &dyn AssetDataService,
    rates: &CachingRatesProvider<R>,
    currency: &str,
    refresh_interval: Duration,
    options: AssetsOptions,
) -> Result<()> {
    let window = options.window;
    let kind = options.kind;
    let load = move |load_kind: LoadKind| async move {
        let spinner =
            (load_kind == LoadKind::Initial).then(|| ui::new_spinner("Fetching assets..."));
        let (rates, inventory) = tokio::join!(
            super::rates_for(rates, currency),
            service.fetch_asset_inventory(window)
        );
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }
        build_report(inventory, &rates, currency, kind)
    };

    if options.watch {
        Refresher::new(refresh_interval)
            .run(
                load,
                |report: AssetReport, load_kind| {
                    super::print_frame(&render(&report, window), load_kind, refresh_interval)
                },
                super::shutdown_signal(),
            )
            .await;
        return Ok(());
    }

    let report = load(LoadKind::Initial).await;
    println!("{}", render(&report, window));

    if let Some(path) = &options.export {
        let path = resolve_export_path(path, "assets", Utc::now().date_naive());
        write_csv(&path, &asset_csv(&report.assets, &report.currency))?;
        println!("\nExported {} rows to {}", report.assets.len(), path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::ExchangeRateTable;
    use crate::providers::fallback;
    use chrono::NaiveDate;

    fn sample_inventory() -> AssetInventory {
        let today = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
        AssetInventory {
            assets: fallback::asset_inventory(ReportWindow::Last7Days, today),
            is_fallback_data: true,
        }
    }

    fn usd() -> RatesResult {
        RatesResult {
            rates: ExchangeRateTable::usd_only(),
            is_live: true,
            is_cached: false,
        }
    }

    #[test]
    fn test_report_sorted_and_summarized() {
        let report = build_report(sample_inventory(), &usd(), "USD", None);
        assert_eq!(report.assets.len(), 9);
        assert!(
            report
                .assets
                .windows(2)
                .all(|pair| pair[0].total_cost >= pair[1].total_cost)
        );
        let counted: usize = report.by_kind.values().map(|(count, _)| count).sum();
        assert_eq!(counted, 9);
        let summed: f64 = report.by_kind.values().map(|(_, cost)| cost).sum();
        assert!((summed - report.total_cost).abs() < 1e-9);
        assert!(report.is_fallback_data);
    }

    #[test]
    fn test_kind_filter() {
        let report = build_report(sample_inventory(), &usd(), "USD", Some(AssetKind::Node));
        assert!(!report.assets.is_empty());
        assert!(report.assets.iter().all(|a| a.kind() == AssetKind::Node));
        assert_eq!(report.by_kind.len(), 1);
    }

    #[test]
    fn test_conversion_applies_rate() {
        let usd_report = build_report(sample_inventory(), &usd(), "USD", None);
        let rates = RatesResult {
            rates: ExchangeRateTable::new(BTreeMap::from([("EUR".to_string(), 0.5)])),
            is_live: false,
            is_cached: false,
        };
        let eur_report = build_report(sample_inventory(), &rates, "EUR", None);
        assert!((eur_report.total_cost - usd_report.total_cost * 0.5).abs() < 1e-9);
        assert!(eur_report.approximate_rates);

        let output = render(&eur_report, ReportWindow::Last7Days);
        assert!(output.contains("Displaying sample data"));
        assert!(output.contains("≈ approximate rates"));
    }

    #[test]
    fn test_render_empty() {
        let inventory = AssetInventory {
            assets: Vec::new(),
            is_fallback_data: false,
        };
        let report = build_report(inventory, &usd(), "USD", None);
        assert!(render(&report, ReportWindow::Today).ends_with("No results"));
    }
}
