//! Cost records as returned by the allocation API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;

/// Reserved entity names the backend uses for costs that do not belong to a
/// real Kubernetes object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentinel {
    Idle,
    Unallocated,
    Unmounted,
}

impl Sentinel {
    pub const ALL: [Sentinel; 3] = [Sentinel::Idle, Sentinel::Unallocated, Sentinel::Unmounted];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentinel::Idle => "__idle__",
            Sentinel::Unallocated => "__unallocated__",
            Sentinel::Unmounted => "__unmounted__",
        }
    }

    pub fn from_name(name: &str) -> Option<Sentinel> {
        Self::ALL.into_iter().find(|s| s.as_str() == name)
    }
}

impl Display for Sentinel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub fn is_sentinel(name: &str) -> bool {
    Sentinel::from_name(name).is_some()
}

pub fn is_idle(name: &str) -> bool {
    Sentinel::from_name(name) == Some(Sentinel::Idle)
}

/// Reads a JSON `null` as the field's default. The backend encodes NaN and
/// infinite amounts as `null`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Smallest window covering both `self` and `other`.
    pub fn span(&self, other: &TimeWindow) -> TimeWindow {
        let start = match (self.start, other.start) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        let end = match (self.end, other.end) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        TimeWindow { start, end }
    }
}

/// One entity's cost for a single time bucket, or for a whole accumulated
/// window. Amounts are in USD as delivered by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CostRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub cpu_cost: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub gpu_cost: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub ram_cost: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub pv_cost: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub network_cost: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub shared_cost: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub external_cost: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub total_cost: f64,
    /// 0 means "not applicable", not "zero utilization".
    #[serde(deserialize_with = "null_as_default")]
    pub cpu_efficiency: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub ram_efficiency: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub total_efficiency: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub minutes: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub window: TimeWindow,
    #[serde(deserialize_with = "null_as_default")]
    pub cpu_core_request_average: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub cpu_core_usage_average: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub ram_byte_request_average: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub ram_byte_usage_average: f64,
}

/// All snapshots of one fetch share the aggregation dimension.
pub type Snapshot = Vec<CostRecord>;
pub type CostRecordSeries = Vec<Snapshot>;

impl CostRecord {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Monetary fields in a fixed order: cpu, gpu, ram, pv, network, shared,
    /// external, total.
    pub fn monetary(&self) -> [f64; 8] {
        [
            self.cpu_cost,
            self.gpu_cost,
            self.ram_cost,
            self.pv_cost,
            self.network_cost,
            self.shared_cost,
            self.external_cost,
            self.total_cost,
        ]
    }

    pub fn monetary_mut(&mut self) -> [&mut f64; 8] {
        [
            &mut self.cpu_cost,
            &mut self.gpu_cost,
            &mut self.ram_cost,
            &mut self.pv_cost,
            &mut self.network_cost,
            &mut self.shared_cost,
            &mut self.external_cost,
            &mut self.total_cost,
        ]
    }

    pub fn is_idle(&self) -> bool {
        is_idle(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_membership() {
        assert!(is_sentinel("__idle__"));
        assert!(is_sentinel("__unallocated__"));
        assert!(is_sentinel("__unmounted__"));
        assert!(!is_sentinel("idle"));
        assert!(!is_sentinel("kube-system"));
        assert_eq!(Sentinel::from_name("__idle__"), Some(Sentinel::Idle));
        assert!(CostRecord::named("__idle__").is_idle());
        assert!(!CostRecord::named("__unmounted__").is_idle());
    }

    #[test]
    fn test_record_deserialization_defaults_missing_fields() {
        let json = r#"{
            "name": "kube-system",
            "cpuCost": 1.5,
            "ramCost": 0.5,
            "totalCost": 2.0,
            "totalEfficiency": 0.4,
            "minutes": 1440,
            "window": {"start": "2024-01-01T00:00:00Z", "end": "2024-01-02T00:00:00Z"},
            "properties": {"cluster": "ignored"}
        }"#;

        let record: CostRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.name, "kube-system");
        assert_eq!(record.cpu_cost, 1.5);
        assert_eq!(record.gpu_cost, 0.0);
        assert_eq!(record.total_cost, 2.0);
        assert_eq!(record.minutes, 1440.0);
        assert_eq!(
            record.window.start.unwrap().to_rfc3339(),
            "2024-01-01T00:00:00+00:00"
        );
    }

    #[test]
    fn test_record_deserialization_reads_null_as_zero() {
        let json = r#"{
            "name": "a",
            "totalCost": 5.0,
            "cpuEfficiency": null,
            "ramCost": null,
            "window": null
        }"#;

        let record: CostRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.total_cost, 5.0);
        assert_eq!(record.cpu_efficiency, 0.0);
        assert_eq!(record.ram_cost, 0.0);
        assert_eq!(record.window, TimeWindow::default());
    }

    #[test]
    fn test_window_span() {
        let a = TimeWindow {
            start: "2024-01-02T00:00:00Z".parse().ok(),
            end: "2024-01-03T00:00:00Z".parse().ok(),
        };
        let b = TimeWindow {
            start: "2024-01-01T00:00:00Z".parse().ok(),
            end: None,
        };

        let span = a.span(&b);
        assert_eq!(span.start, b.start);
        assert_eq!(span.end, a.end);
    }
}
