use super::ui;
use crate::core::aggregation::AggregationLevel;
use crate::core::cost::{CostRecord, is_sentinel};
use crate::core::cumulative::{CostTotals, cumulative, sort_by_total_cost, summarize};
use crate::core::currency::{BASE_CURRENCY, CurrencyRateProvider, RatesResult, convert};
use crate::core::drilldown::{Breadcrumb, DrillState, breadcrumbs};
use crate::core::export::{allocation_csv, resolve_export_path, write_csv};
use crate::core::filter::{FilterEntry, encode};
use crate::core::refresh::{LoadKind, Refresher};
use crate::core::service::{AllocationDataService, AllocationQuery, AllocationSeries};
use crate::core::window::ReportWindow;
use crate::providers::CachingRatesProvider;
use anyhow::Result;
use chrono::Utc;
use comfy_table::{Cell, CellAlignment, Color, Table};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct AllocationsOptions {
    pub window: ReportWindow,
    pub aggregate: AggregationLevel,
    pub accumulate: bool,
    pub filters: Vec<FilterEntry>,
    pub include_idle: bool,
    /// Overrides the saved display currency for this run.
    pub currency: Option<String>,
    /// Row to drill into before fetching.
    pub drill: Option<String>,
    /// Breadcrumb index to navigate to before fetching; negative for all results.
    pub up: Option<isize>,
    /// Row of the resolved level to show in detail instead of the table.
    pub detail: Option<String>,
    pub export: Option<PathBuf>,
    pub watch: bool,
}

impl Default for AllocationsOptions {
    fn default() -> Self {
        Self {
            window: ReportWindow::default(),
            aggregate: AggregationLevel::Namespace,
            accumulate: false,
            filters: Vec::new(),
            include_idle: true,
            currency: None,
            drill: None,
            up: None,
            detail: None,
            export: None,
            watch: false,
        }
    }
}

/// Cumulative costs for one drill state, converted into the display currency
/// and sorted by total cost.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationReport {
    pub state: DrillState,
    pub records: Vec<CostRecord>,
    pub totals: CostTotals,
    pub currency: String,
    pub is_fallback_data: bool,
    pub approximate_rates: bool,
}

pub fn build_report(
    state: DrillState,
    data: AllocationSeries,
    rates: &RatesResult,
    currency: &str,
    include_idle: bool,
) -> AllocationReport {
    let rate = rates.rates.rate_for(currency);
    let mut records: Vec<CostRecord> = cumulative(&data.series)
        .into_values()
        .filter(|record| include_idle || !record.is_idle())
        .map(|record| convert(&record, rate))
        .collect();
    sort_by_total_cost(&mut records);

    AllocationReport {
        state,
        totals: summarize(&records),
        records,
        currency: currency.to_string(),
        is_fallback_data: data.is_fallback_data,
        approximate_rates: !rates.is_live && currency != BASE_CURRENCY,
    }
}

/// Cost of one entity in one snapshot of the series.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyCost {
    pub label: String,
    pub record: CostRecord,
}

/// One entity of the current level: cumulative record plus its daily trend,
/// converted into the display currency.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationDetail {
    pub level: AggregationLevel,
    pub record: CostRecord,
    /// Empty unless the series has more than one snapshot.
    pub daily: Vec<DailyCost>,
    pub currency: String,
    pub is_fallback_data: bool,
    pub approximate_rates: bool,
}

/// Returns `None` when no snapshot has an entity called `name`.
pub fn build_detail(
    level: AggregationLevel,
    data: &AllocationSeries,
    rates: &RatesResult,
    currency: &str,
    name: &str,
) -> Option<AllocationDetail> {
    let name = name.trim();
    let rate = rates.rates.rate_for(currency);
    let record = cumulative(&data.series).remove(name)?;

    let daily = if data.series.len() > 1 {
        data.series
            .iter()
            .enumerate()
            .map(|(i, snapshot)| {
                let found = snapshot.iter().find(|r| r.name == name);
                let start = found.or(snapshot.first()).and_then(|r| r.window.start);
                DailyCost {
                    label: start.map_or_else(
                        || format!("Day {}", i + 1),
                        |start| start.format("%b %d").to_string(),
                    ),
                    record: found.map_or_else(|| CostRecord::named(name), |r| convert(r, rate)),
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    Some(AllocationDetail {
        level,
        record: convert(&record, rate),
        daily,
        currency: currency.to_string(),
        is_fallback_data: data.is_fallback_data,
        approximate_rates: !rates.is_live && currency != BASE_CURRENCY,
    })
}

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

fn section(output: &mut String, heading: &str, table: &Table) {
    output.push('\n');
    output.push_str(&ui::style_text(heading, ui::StyleType::TotalLabel));
    output.push('\n');
    output.push_str(&table.to_string());
    output.push('\n');
}

pub fn render_detail(detail: &AllocationDetail, window: ReportWindow) -> String {
    let record = &detail.record;
    let currency = detail.currency.as_str();
    let title = format!(
        "{} {} ({})",
        detail.level.label(),
        record.name,
        window.label()
    );
    let mut output = ui::style_text(&title, ui::StyleType::Title);
    output.push('\n');
    for notice in super::data_notices(detail.is_fallback_data, detail.approximate_rates) {
        output.push_str(&notice);
        output.push('\n');
    }

    let mut costs = ui::new_styled_table();
    costs.set_header(vec![
        ui::header_cell("CPU"),
        ui::header_cell("GPU"),
        ui::header_cell("RAM"),
        ui::header_cell("PV"),
        ui::header_cell("Network"),
        ui::header_cell("Shared"),
        ui::header_cell("External"),
        ui::header_cell(&format!("Total Cost ({currency})")),
    ]);
    costs.add_row(vec![
        ui::currency_cell(record.cpu_cost, currency),
        ui::currency_cell(record.gpu_cost, currency),
        ui::currency_cell(record.ram_cost, currency),
        ui::currency_cell(record.pv_cost, currency),
        ui::currency_cell(record.network_cost, currency),
        ui::currency_cell(record.shared_cost, currency),
        ui::currency_cell(record.external_cost, currency),
        ui::total_cell(record.total_cost, currency),
    ]);
    section(&mut output, "Cost Details", &costs);

    if !detail.daily.is_empty() {
        let mut trend = ui::new_styled_table();
        trend.set_header(vec![
            ui::header_cell("Date"),
            ui::header_cell("CPU"),
            ui::header_cell("GPU"),
            ui::header_cell("RAM"),
            ui::header_cell("PV"),
            ui::header_cell("Network"),
            ui::header_cell("Total"),
        ]);
        for day in &detail.daily {
            let r = &day.record;
            trend.add_row(vec![
                Cell::new(&day.label),
                ui::currency_cell(r.cpu_cost, currency),
                ui::currency_cell(r.gpu_cost, currency),
                ui::currency_cell(r.ram_cost, currency),
                ui::currency_cell(r.pv_cost, currency),
                ui::currency_cell(r.network_cost, currency),
                ui::total_cell(r.total_cost, currency),
            ]);
        }
        section(&mut output, "Daily Cost Trend", &trend);
    }

    let efficiencies: Vec<_> = [
        ("Total", record.total_efficiency),
        ("CPU", record.cpu_efficiency),
        ("RAM", record.ram_efficiency),
    ]
    .into_iter()
    .filter(|(_, value)| *value > 0.0)
    .collect();
    if !efficiencies.is_empty() {
        let mut table = ui::new_styled_table();
        for (label, value) in efficiencies {
            table.add_row(vec![Cell::new(label), ui::efficiency_cell(value)]);
        }
        section(&mut output, "Resource Efficiency", &table);
    }

    let metrics: Vec<_> = [
        ("CPU Request", record.cpu_core_request_average, 1.0, "cores"),
        ("CPU Usage", record.cpu_core_usage_average, 1.0, "cores"),
        ("RAM Request", record.ram_byte_request_average, BYTES_PER_GIB, "GiB"),
        ("RAM Usage", record.ram_byte_usage_average, BYTES_PER_GIB, "GiB"),
    ]
    .into_iter()
    .filter(|(_, value, _, _)| *value > 0.0)
    .map(|(label, value, scale, unit)| (label, format!("{:.2} {unit}", value / scale)))
    .chain((record.minutes > 0.0).then(|| {
        ("Runtime", format!("{:.1} hours", record.minutes / 60.0))
    }))
    .collect();
    if !metrics.is_empty() {
        let mut table = ui::new_styled_table();
        for (label, value) in metrics {
            table.add_row(vec![
                Cell::new(label),
                Cell::new(value).set_alignment(CellAlignment::Right),
            ]);
        }
        section(&mut output, "Resource Metrics", &table);
    }

    output.truncate(output.trim_end().len());
    output
}

/// Applies `--up` and then `--drill` to the requested level and filters.
/// Returns a notice when the drill request could not be applied.
pub fn resolve_state(options: &AllocationsOptions) -> (DrillState, Option<String>) {
    let mut state = DrillState::new(options.aggregate, options.filters.clone());
    if let Some(index) = options.up {
        state = state.navigate(Breadcrumb::from_index(index));
    }

    let mut notice = None;
    if let Some(name) = options.drill.as_deref() {
        let next = if is_sentinel(name.trim()) {
            state.clone()
        } else {
            state.drill(name)
        };
        if next == state {
            notice = Some(format!(
                "Cannot drill into '{}' from the {} level",
                name.trim(),
                state.level.label()
            ));
        }
        state = next;
    }
    (state, notice)
}

/// Command line that reproduces `state`, for continuing a drill-down.
pub fn next_command(state: &DrillState, window: ReportWindow) -> String {
    let mut command = format!(
        "costview allocations --window {} --aggregate {}",
        window, state.level
    );
    if !state.filters.is_empty() {
        command.push_str(&format!(" --filter '{}'", encode(&state.filters)));
    }
    command
}

pub fn render(report: &AllocationReport, window: ReportWindow) -> String {
    let title = format!(
        "Cost Allocation by {} ({})",
        report.state.level.label(),
        window.label()
    );
    let mut output = ui::style_text(&title, ui::StyleType::Title);
    output.push('\n');

    if let Some(trail) = breadcrumbs(&report.state) {
        output.push_str(&ui::style_text(&trail, ui::StyleType::Subtle));
        output.push('\n');
    }
    for notice in super::data_notices(report.is_fallback_data, report.approximate_rates) {
        output.push_str(&notice);
        output.push('\n');
    }

    if report.records.is_empty() {
        output.push_str("\nNo results");
        return output;
    }

    let currency = report.currency.as_str();
    output.push('\n');
    output.push_str(&ui::totals_table(&report.totals, currency).to_string());
    output.push_str("\n\n");

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell(report.state.level.label()),
        ui::header_cell("CPU"),
        ui::header_cell("GPU"),
        ui::header_cell("RAM"),
        ui::header_cell("PV"),
        ui::header_cell("Network"),
        ui::header_cell("Shared"),
        ui::header_cell("Efficiency"),
        ui::header_cell(&format!("Total Cost ({currency})")),
    ]);

    for record in &report.records {
        let name = if record.is_idle() {
            Cell::new(&record.name).fg(Color::DarkGrey)
        } else {
            Cell::new(&record.name)
        };
        table.add_row(vec![
            name,
            ui::currency_cell(record.cpu_cost, currency),
            ui::currency_cell(record.gpu_cost, currency),
            ui::currency_cell(record.ram_cost, currency),
            ui::currency_cell(record.pv_cost, currency),
            ui::currency_cell(record.network_cost, currency),
            ui::currency_cell(record.shared_cost, currency),
            ui::efficiency_cell(record.total_efficiency),
            ui::total_cell(record.total_cost, currency),
        ]);
    }
    output.push_str(&table.to_string());
    output
}

pub async fn run<R: CurrencyRateProvider>(
    service: &dyn AllocationDataService,
    rates: &CachingRatesProvider<R>,
    currency: &str,
    refresh_interval: Duration,
    options: AllocationsOptions,
) -> Result<()> {
    let (state, notice) = resolve_state(&options);
    if let Some(notice) = notice {
        println!("{}", ui::style_text(&notice, ui::StyleType::Error));
    }
    if options.drill.is_some() || options.up.is_some() {
        println!(
            "{}",
            ui::style_text(
                &format!("Next: {}", next_command(&state, options.window)),
                ui::StyleType::Subtle
            )
        );
    }

    let query = AllocationQuery {
        accumulate: options.accumulate,
        filters: state.filters.clone(),
        include_idle: options.include_idle,
    };
    debug!(?query, level = %state.level, "Loading allocations");

    if let Some(name) = options.detail.as_deref() {
        // The daily trend needs one snapshot per day.
        let query = AllocationQuery {
            accumulate: false,
            ..query
        };
        let spinner = ui::new_spinner("Fetching allocation data...");
        let (rates, data) = tokio::join!(
            super::rates_for(rates, currency),
            service.fetch_allocation_series(options.window, state.level, &query)
        );
        spinner.finish_and_clear();

        match build_detail(state.level, &data, &rates, currency, name) {
            Some(detail) => println!("{}", render_detail(&detail, options.window)),
            None => println!(
                "{}",
                ui::style_text(
                    &format!("No allocation named {}", name.trim()),
                    ui::StyleType::Error
                )
            ),
        }
        return Ok(());
    }

    let window = options.window;
    let include_idle = options.include_idle;
    let (state, query) = (&state, &query);
    let load = move |kind: LoadKind| async move {
        let spinner =
            (kind == LoadKind::Initial).then(|| ui::new_spinner("Fetching allocation data..."));
        let (rates, data) = tokio::join!(
            super::rates_for(rates, currency),
            service.fetch_allocation_series(window, state.level, query)
        );
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }
        build_report(state.clone(), data, &rates, currency, include_idle)
    };

    if options.watch {
        let refresher = Refresher::new(refresh_interval);
        refresher
            .run(
                load,
                |report: AllocationReport, kind| {
                    super::print_frame(&render(&report, window), kind, refresh_interval)
                },
                super::shutdown_signal(),
            )
            .await;
        return Ok(());
    }

    let report = load(LoadKind::Initial).await;
    println!("{}", render(&report, window));

    if let Some(path) = &options.export {
        let path = resolve_export_path(path, "allocations", Utc::now().date_naive());
        write_csv(&path, &allocation_csv(&report.records, &report.currency))?;
        println!(
            "\nExported {} rows to {}",
            report.records.len(),
            path.display()
        );
    }
    Ok(())
}
