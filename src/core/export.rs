//! CSV export of allocation and asset reports.
//!
//! Fields are joined with commas without quoting. Commas inside names are
//! replaced by spaces; formatted amounts are written verbatim.

use crate::core::asset::AssetRecord;
use crate::core::cost::CostRecord;
use crate::core::cumulative::format_efficiency;
use crate::core::currency::format_currency;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::info;

const ALLOCATION_HEADERS: [&str; 9] = [
    "Name",
    "CPU",
    "GPU",
    "RAM",
    "PV",
    "Network",
    "Shared",
    "Efficiency",
    "Total Cost",
];

const ASSET_HEADERS: [&str; 10] = [
    "Name",
    "Type",
    "Provider",
    "Cluster",
    "Total Cost",
    "CPU Cost",
    "RAM Cost",
    "GPU Cost",
    "Start",
    "End",
];

const MISSING: &str = "—";

fn sanitize(field: &str) -> String {
    field.replace(',', " ")
}

fn join_lines(header: &[&str], rows: impl Iterator<Item = Vec<String>>) -> String {
    let mut lines = vec![header.join(",")];
    lines.extend(rows.map(|row| row.join(",")));
    lines.join("\n")
}

/// Records are expected to be already converted into `currency`.
pub fn allocation_csv(records: &[CostRecord], currency: &str) -> String {
    let money = |amount: f64| format_currency(amount, currency);
    join_lines(
        &ALLOCATION_HEADERS,
        records.iter().map(|r| {
            vec![
                sanitize(&r.name),
                money(r.cpu_cost),
                money(r.gpu_cost),
                money(r.ram_cost),
                money(r.pv_cost),
                money(r.network_cost),
                money(r.shared_cost),
                format_efficiency(r.total_efficiency),
                money(r.total_cost),
            ]
        }),
    )
}

pub fn asset_csv(assets: &[AssetRecord], currency: &str) -> String {
    let money = |amount: f64| format_currency(amount, currency);
    let text = |value: Option<&String>| sanitize(value.map_or(MISSING, String::as_str));
    join_lines(
        &ASSET_HEADERS,
        assets.iter().map(|a| {
            vec![
                text(a.properties.name.as_ref()),
                a.kind().to_string(),
                text(a.properties.provider.as_ref()),
                text(a.properties.cluster.as_ref()),
                money(a.total_cost),
                money(a.cpu_cost()),
                money(a.ram_cost()),
                money(a.gpu_cost()),
                a.start.clone().unwrap_or_default(),
                a.end.clone().unwrap_or_default(),
            ]
        }),
    )
}

/// `<prefix>_YYYY-MM-DD.csv`
pub fn default_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{}_{}.csv", prefix, date.format("%Y-%m-%d"))
}

/// An existing directory receives the default file name for `date`; any
/// other path is used as given.
pub fn resolve_export_path(path: &Path, prefix: &str, date: NaiveDate) -> PathBuf {
    if path.is_dir() {
        path.join(default_file_name(prefix, date))
    } else {
        path.to_path_buf()
    }
}

pub fn write_csv(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
    info!("Exported report to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::asset::{AssetDetails, AssetProperties, NodeDetails};
    use crate::core::cost::TimeWindow;
    use std::collections::BTreeMap;

    fn record(name: &str, total: f64, efficiency: f64) -> CostRecord {
        CostRecord {
            name: name.to_string(),
            cpu_cost: 1.5,
            ram_cost: 1234.0,
            total_cost: total,
            total_efficiency: efficiency,
            ..Default::default()
        }
    }

    #[test]
    fn test_allocation_csv() {
        let csv = allocation_csv(
            &[record("prod", 10.0, 0.456), record("a,b", 0.0, 0.0)],
            "USD",
        );
        let lines: Vec<&str> = csv.split('\n').collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "Name,CPU,GPU,RAM,PV,Network,Shared,Efficiency,Total Cost"
        );
        assert_eq!(
            lines[1],
            "prod,$1.50,$0.00,$1,234.00,$0.00,$0.00,$0.00,45.6%,$10.00"
        );
        assert!(lines[2].starts_with("a b,"));
        assert!(lines[2].ends_with(",—,$0.00"));
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn test_allocation_csv_empty() {
        assert_eq!(
            allocation_csv(&[], "EUR"),
            "Name,CPU,GPU,RAM,PV,Network,Shared,Efficiency,Total Cost"
        );
    }

    #[test]
    fn test_asset_csv() {
        let node = AssetRecord {
            id: "node-1".to_string(),
            details: AssetDetails::Node(NodeDetails {
                cpu_cost: 2.0,
                ram_cost: 1.0,
                ..Default::default()
            }),
            properties: AssetProperties {
                name: Some("node-1".to_string()),
                provider: Some("GCP".to_string()),
                ..Default::default()
            },
            labels: BTreeMap::new(),
            window: TimeWindow::default(),
            start: Some("2024-01-01T00:00:00Z".to_string()),
            end: None,
            minutes: 0.0,
            adjustment: 0.0,
            total_cost: 3.0,
        };
        let mut network = node.clone();
        network.details = AssetDetails::Network;
        network.properties = AssetProperties::default();
        network.start = None;

        let csv = asset_csv(&[node, network], "EUR");
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "Name,Type,Provider,Cluster,Total Cost,CPU Cost,RAM Cost,GPU Cost,Start,End"
        );
        assert_eq!(
            lines[1],
            "node-1,Node,GCP,—,€3.00,€2.00,€1.00,€0.00,2024-01-01T00:00:00Z,"
        );
        assert_eq!(lines[2], "—,Network,—,—,€3.00,€0.00,€0.00,€0.00,,");
    }

    #[test]
    fn test_default_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(
            default_file_name("allocations", date),
            "allocations_2024-03-05.csv"
        );
    }

    #[test]
    fn test_write_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_csv(&path, "a,b").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a,b");

        assert!(write_csv(&dir.path().join("missing/out.csv"), "x").is_err());
    }

    #[test]
    fn test_resolve_export_path() {
        let dir = tempfile::tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(
            resolve_export_path(dir.path(), "assets", date),
            dir.path().join("assets_2024-03-05.csv")
        );

        let file = dir.path().join("report.csv");
        assert_eq!(resolve_export_path(&file, "assets", date), file);
    }
}
