//! Deterministic sample data served when the OpenCost API is unreachable.
//!
//! Base amounts are 7-day costs in USD and are scaled to the window length.
//! Daily series apply a fixed sinusoidal variance so charts are not flat.

use crate::core::aggregation::AggregationLevel;
use crate::core::asset::{
    AssetDetails, AssetProperties, AssetRecord, CloudDetails, DiskDetails, LoadBalancerDetails,
    NodeDetails,
};
use crate::core::cost::{CostRecord, CostRecordSeries, Sentinel, TimeWindow};
use crate::core::cumulative::round_currency;
use crate::core::service::AllocationQuery;
use crate::core::window::{ReportWindow, WindowRange};
use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use std::collections::BTreeMap;

const MINUTES_PER_DAY: f64 = 1440.0;

#[derive(Debug, Clone, Copy)]
struct Def {
    name: &'static str,
    cpu: f64,
    gpu: f64,
    ram: f64,
    pv: f64,
    net: f64,
    eff: f64,
}

impl Def {
    const fn new(name: &'static str, cpu: f64, gpu: f64, ram: f64, pv: f64, net: f64, eff: f64) -> Self {
        Self { name, cpu, gpu, ram, pv, net, eff }
    }

    const fn workload(name: &'static str, cpu: f64, ram: f64, pv: f64, eff: f64) -> Self {
        Self::new(name, cpu, 0.0, ram, pv, 0.0, eff)
    }

    fn total(&self) -> f64 {
        self.cpu + self.gpu + self.ram + self.pv + self.net
    }
}

const NAMESPACES: [Def; 12] = [
    Def::new("production", 52.1, 0.0, 40.5, 12.3, 3.2, 0.78),
    Def::new("folding-at-home", 51.55, 322.18, 12.08, 0.0, 0.01, 0.82),
    Def::new("__idle__", 157.83, 0.0, 108.66, 0.0, 0.0, 0.0),
    Def::new("prometheus-system", 14.83, 0.0, 1.03, 0.27, 0.01, 0.062),
    Def::new("kube-system", 12.25, 0.0, 0.76, 0.0, 0.03, 0.087),
    Def::new("load-generator", 10.87, 0.0, 0.44, 0.0, 0.34, 0.568),
    Def::new("opencost", 1.77, 0.0, 0.9, 0.0, 0.01, 0.42),
    Def::new("default", 0.42, 0.0, 0.18, 0.0, 0.0, 0.15),
    Def::new("ingress-nginx", 3.45, 0.0, 1.22, 0.0, 1.8, 0.55),
    Def::new("cert-manager", 0.88, 0.0, 0.32, 0.0, 0.01, 0.35),
    Def::new("logging", 5.2, 0.0, 8.4, 6.5, 0.1, 0.72),
    Def::new("database", 18.3, 0.0, 24.6, 15.8, 0.5, 0.68),
];

const CONTROLLERS: [(&str, &[Def]); 4] = [
    (
        "production",
        &[
            Def::workload("deployment:api-gateway", 18.4, 12.2, 0.0, 0.82),
            Def::workload("deployment:web-frontend", 12.8, 10.3, 0.0, 0.75),
            Def::workload("deployment:auth-service", 8.5, 6.8, 0.0, 0.79),
            Def::workload("statefulset:redis-cluster", 6.2, 5.6, 8.3, 0.7),
            Def::workload("deployment:worker-pool", 6.2, 5.6, 4.0, 0.8),
        ],
    ),
    (
        "kube-system",
        &[
            Def::workload("daemonset:kube-proxy", 4.1, 0.3, 0.0, 0.12),
            Def::workload("deployment:coredns", 3.8, 0.26, 0.0, 0.09),
            Def::workload("deployment:metrics-server", 2.15, 0.1, 0.0, 0.06),
            Def::workload("daemonset:fluentd", 2.2, 0.1, 0.0, 0.05),
        ],
    ),
    (
        "database",
        &[
            Def::workload("statefulset:postgres-primary", 10.5, 16.4, 10.8, 0.72),
            Def::workload("statefulset:postgres-replica", 7.8, 8.2, 5.0, 0.64),
        ],
    ),
    (
        "logging",
        &[
            Def::workload("daemonset:fluentbit", 2.8, 3.2, 0.0, 0.68),
            Def::workload("statefulset:elasticsearch", 2.4, 5.2, 6.5, 0.76),
        ],
    ),
];

const PODS: [(&str, &[Def]); 2] = [
    (
        "deployment:api-gateway",
        &[
            Def::workload("api-gateway-7b8f9c6d5-x2k4m", 6.2, 4.1, 0.0, 0.84),
            Def::workload("api-gateway-7b8f9c6d5-a8b2n", 6.1, 4.05, 0.0, 0.81),
            Def::workload("api-gateway-7b8f9c6d5-c3d7p", 6.1, 4.05, 0.0, 0.8),
        ],
    ),
    (
        "deployment:web-frontend",
        &[
            Def::workload("web-frontend-5f4e3d2c1-q9w8e", 6.4, 5.15, 0.0, 0.76),
            Def::workload("web-frontend-5f4e3d2c1-r7t6y", 6.4, 5.15, 0.0, 0.74),
        ],
    ),
];

const CLUSTERS: [Def; 2] = [
    Def::new("demo-cluster", 180.0, 322.0, 120.0, 35.0, 5.5, 0.65),
    Def::new("prod-cluster", 95.0, 0.0, 80.0, 20.0, 3.0, 0.72),
];

const NODES: [Def; 4] = [
    Def::new("gke-demo-pool-a1b2c3d4-x1y2", 40.0, 0.0, 30.0, 0.0, 1.2, 0.58),
    Def::new("gke-demo-pool-e5f6g7h8-a3b4", 65.0, 0.0, 45.0, 0.0, 1.8, 0.68),
    Def::new("ip-10-0-1-42.ec2.internal", 50.0, 0.0, 38.0, 0.0, 2.0, 0.72),
    Def::new("ip-10-0-2-55.ec2.internal", 25.0, 0.0, 17.0, 0.0, 0.5, 0.62),
];

fn filter_value<'a>(query: &'a AllocationQuery, property: &str) -> Option<&'a str> {
    query
        .filters
        .iter()
        .find(|f| f.property == property)
        .map(|f| f.value.as_str())
}

fn controllers_in(namespace: Option<&str>) -> Vec<Def> {
    match namespace.and_then(|ns| CONTROLLERS.iter().find(|(name, _)| *name == ns)) {
        Some((_, defs)) => defs.to_vec(),
        None => CONTROLLERS.iter().flat_map(|(_, defs)| defs.iter().copied()).collect(),
    }
}

/// Controllers grouped by the kind prefix of their "kind:name" key.
fn controller_kinds(namespace: Option<&str>) -> Vec<Def> {
    let mut kinds: Vec<(Def, u32)> = Vec::new();
    for controller in controllers_in(namespace) {
        let kind = controller
            .name
            .split_once(':')
            .map_or(controller.name, |(kind, _)| kind);
        match kinds.iter_mut().find(|(def, _)| def.name == kind) {
            Some((def, count)) => {
                def.cpu += controller.cpu;
                def.ram += controller.ram;
                def.pv += controller.pv;
                def.eff += controller.eff;
                *count += 1;
            }
            None => kinds.push((Def { name: kind, ..controller }, 1)),
        }
    }
    kinds
        .into_iter()
        .map(|(def, count)| Def {
            eff: def.eff / f64::from(count),
            ..def
        })
        .collect()
}

fn defs_for(level: AggregationLevel, query: &AllocationQuery) -> Vec<(String, Def)> {
    let named = |defs: Vec<Def>| -> Vec<(String, Def)> {
        defs.into_iter().map(|d| (d.name.to_string(), d)).collect()
    };
    let namespace = filter_value(query, "namespace");

    match level {
        AggregationLevel::Namespace => named(
            NAMESPACES
                .iter()
                .filter(|d| namespace.is_none_or(|ns| d.name == ns))
                .copied()
                .collect(),
        ),
        AggregationLevel::ControllerKind => named(controller_kinds(namespace)),
        AggregationLevel::Controller => named(controllers_in(namespace)),
        AggregationLevel::Pod => match filter_value(query, "controllerName") {
            Some(controller) => {
                let pods = PODS.iter().find(|(key, _)| {
                    *key == controller
                        || key
                            .split_once(':')
                            .is_some_and(|(_, name)| name == controller)
                });
                match pods {
                    Some((_, defs)) => named(defs.to_vec()),
                    None => vec![(
                        format!("{controller}-pod-1"),
                        Def::workload("", 2.0, 1.5, 0.0, 0.7),
                    )],
                }
            }
            None => named(PODS.iter().flat_map(|(_, defs)| defs.iter().copied()).collect()),
        },
        AggregationLevel::Container => {
            let pod = filter_value(query, "pod").unwrap_or("unknown-pod");
            let parts: Vec<&str> = pod.split('-').collect();
            let base = parts[..parts.len().saturating_sub(2)].join("-");
            let main = if base.is_empty() { "main".to_string() } else { base };
            vec![
                (main, Def::workload("", 3.0, 2.0, 0.0, 0.8)),
                (
                    "istio-proxy".to_string(),
                    Def::workload("istio-proxy", 0.4, 0.2, 0.0, 0.5),
                ),
            ]
        }
        AggregationLevel::Cluster => named(CLUSTERS.to_vec()),
        AggregationLevel::Node => named(NODES.to_vec()),
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Record for `def` covering `days` days, with every amount scaled by `factor`.
fn build_record(name: &str, def: &Def, days: f64, factor: f64, window: TimeWindow) -> CostRecord {
    let scale = |base: f64| round_currency(base / 7.0 * days * factor);
    CostRecord {
        name: name.to_string(),
        cpu_cost: scale(def.cpu),
        gpu_cost: scale(def.gpu),
        ram_cost: scale(def.ram),
        pv_cost: scale(def.pv),
        network_cost: scale(def.net),
        shared_cost: 0.0,
        external_cost: 0.0,
        total_cost: scale(def.total()),
        cpu_efficiency: def.eff,
        ram_efficiency: def.eff,
        total_efficiency: def.eff,
        minutes: days * MINUTES_PER_DAY,
        window,
        cpu_core_request_average: def.cpu / 24.0 * 0.8,
        cpu_core_usage_average: def.cpu / 24.0 * 0.8 * def.eff,
        ram_byte_request_average: def.ram * 1e8,
        ram_byte_usage_average: def.ram * 1e8 * def.eff,
    }
}

/// Sample allocation series for `window` ending relative to `today`.
pub fn allocation_series(
    window: ReportWindow,
    level: AggregationLevel,
    query: &AllocationQuery,
    today: NaiveDate,
) -> CostRecordSeries {
    let WindowRange { start, end, days } = window.range(today);
    let defs: Vec<(String, Def)> = defs_for(level, query)
        .into_iter()
        .filter(|(name, _)| query.include_idle || name != Sentinel::Idle.as_str())
        .collect();

    if query.accumulate {
        let window = TimeWindow::new(midnight(start), midnight(end));
        return vec![
            defs.iter()
                .map(|(name, def)| build_record(name, def, days as f64, 1.0, window.clone()))
                .collect(),
        ];
    }

    (0..days)
        .map(|day| {
            let day_start = start + Days::new(day);
            let window = TimeWindow::new(midnight(day_start), midnight(day_start + Days::new(1)));
            defs.iter()
                .enumerate()
                .map(|(idx, (name, def))| {
                    let variance = 1.0 + (day as f64 * 1.5 + idx as f64 * 0.7).sin() * 0.15;
                    build_record(name, def, 1.0, variance, window.clone())
                })
                .collect()
        })
        .collect()
}

struct AssetDef {
    id: &'static str,
    category: &'static str,
    provider: &'static str,
    project: &'static str,
    service: &'static str,
    cluster: &'static str,
    name: &'static str,
    provider_id: &'static str,
    total: f64,
    adjustment: f64,
    details: fn(f64) -> AssetDetails,
}

fn gke_small_node(days: f64) -> AssetDetails {
    AssetDetails::Node(NodeDetails {
        node_type: "e2-medium".to_string(),
        pool: "demo-pool".to_string(),
        cpu_cores: 2.0,
        ram_bytes: 4_294_967_296.0,
        cpu_cost: scale_cost(8.42, days),
        ram_cost: scale_cost(4.18, days),
        discount: 0.3,
        ..Default::default()
    })
}

fn gke_large_node(days: f64) -> AssetDetails {
    AssetDetails::Node(NodeDetails {
        node_type: "e2-standard-4".to_string(),
        pool: "demo-pool".to_string(),
        cpu_cores: 4.0,
        ram_bytes: 17_179_869_184.0,
        cpu_cost: scale_cost(16.84, days),
        ram_cost: scale_cost(16.72, days),
        discount: 0.3,
        ..Default::default()
    })
}

fn eks_node(days: f64) -> AssetDetails {
    AssetDetails::Node(NodeDetails {
        node_type: "m5.xlarge".to_string(),
        pool: "prod-workers".to_string(),
        cpu_cores: 4.0,
        ram_bytes: 17_179_869_184.0,
        cpu_cost: scale_cost(22.68, days),
        ram_cost: scale_cost(18.14, days),
        ..Default::default()
    })
}

fn prometheus_disk(_: f64) -> AssetDetails {
    AssetDetails::Disk(DiskDetails {
        bytes: 10_737_418_240.0,
        storage_class: "standard-rwo".to_string(),
        volume_name: "pvc-abc123".to_string(),
        claim_name: "prometheus-server".to_string(),
        claim_namespace: "prometheus-system".to_string(),
    })
}

fn postgres_disk(_: f64) -> AssetDetails {
    AssetDetails::Disk(DiskDetails {
        bytes: 53_687_091_200.0,
        storage_class: "pd-ssd".to_string(),
        volume_name: "pvc-def456".to_string(),
        claim_name: "data-postgres-0".to_string(),
        claim_namespace: "database".to_string(),
    })
}

fn elb(_: f64) -> AssetDetails {
    AssetDetails::LoadBalancer(LoadBalancerDetails {
        ip: "52.14.23.189".to_string(),
        private: false,
    })
}

fn network(_: f64) -> AssetDetails {
    AssetDetails::Network
}

fn management(_: f64) -> AssetDetails {
    AssetDetails::ClusterManagement
}

fn nat_gateway(days: f64) -> AssetDetails {
    AssetDetails::Cloud(CloudDetails {
        credit: scale_cost(-1.25, days),
    })
}

const ASSETS: [AssetDef; 9] = [
    AssetDef {
        id: "GCP/__undefined__/demo-project/Compute/demo-cluster/Node/Kubernetes/gke-demo-pool-a1b2c3d4-x1y2/gke-demo-pool-a1b2c3d4-x1y2",
        category: "Compute",
        provider: "GCP",
        project: "demo-project",
        service: "Kubernetes",
        cluster: "demo-cluster",
        name: "gke-demo-pool-a1b2c3d4-x1y2",
        provider_id: "gke-demo-pool-a1b2c3d4-x1y2",
        total: 12.35,
        adjustment: -0.25,
        details: gke_small_node,
    },
    AssetDef {
        id: "GCP/__undefined__/demo-project/Compute/demo-cluster/Node/Kubernetes/gke-demo-pool-e5f6g7h8-a3b4/gke-demo-pool-e5f6g7h8-a3b4",
        category: "Compute",
        provider: "GCP",
        project: "demo-project",
        service: "Kubernetes",
        cluster: "demo-cluster",
        name: "gke-demo-pool-e5f6g7h8-a3b4",
        provider_id: "gke-demo-pool-e5f6g7h8-a3b4",
        total: 33.06,
        adjustment: -0.5,
        details: gke_large_node,
    },
    AssetDef {
        id: "AWS/__undefined__/prod-account/Compute/prod-cluster/Node/Kubernetes/ip-10-0-1-42.ec2.internal/ip-10-0-1-42.ec2.internal",
        category: "Compute",
        provider: "AWS",
        project: "prod-account",
        service: "Kubernetes",
        cluster: "prod-cluster",
        name: "ip-10-0-1-42.ec2.internal",
        provider_id: "i-0abc123def456789a",
        total: 40.82,
        adjustment: 0.0,
        details: eks_node,
    },
    AssetDef {
        id: "GCP/__undefined__/demo-project/Storage/demo-cluster/Disk/Kubernetes/pvc-abc123/pvc-abc123",
        category: "Storage",
        provider: "GCP",
        project: "demo-project",
        service: "Kubernetes",
        cluster: "demo-cluster",
        name: "pvc-abc123",
        provider_id: "pvc-abc123",
        total: 1.47,
        adjustment: 0.0,
        details: prometheus_disk,
    },
    AssetDef {
        id: "GCP/__undefined__/demo-project/Storage/demo-cluster/Disk/Kubernetes/pvc-def456/pvc-def456",
        category: "Storage",
        provider: "GCP",
        project: "demo-project",
        service: "Kubernetes",
        cluster: "demo-cluster",
        name: "pvc-def456",
        provider_id: "pvc-def456",
        total: 5.88,
        adjustment: 0.0,
        details: postgres_disk,
    },
    AssetDef {
        id: "AWS/__undefined__/prod-account/Network/prod-cluster/LoadBalancer/Kubernetes/ab1234-elb/ab1234-elb",
        category: "Network",
        provider: "AWS",
        project: "prod-account",
        service: "Kubernetes",
        cluster: "prod-cluster",
        name: "ab1234-elb",
        provider_id: "ab1234-elb",
        total: 18.14,
        adjustment: 0.0,
        details: elb,
    },
    AssetDef {
        id: "GCP/__undefined__/demo-project/Network/demo-cluster/Network/Kubernetes/__unmounted__/__unmounted__",
        category: "Network",
        provider: "GCP",
        project: "demo-project",
        service: "Kubernetes",
        cluster: "demo-cluster",
        name: "__unmounted__",
        provider_id: "__unmounted__",
        total: 2.34,
        adjustment: 0.0,
        details: network,
    },
    AssetDef {
        id: "GCP/__undefined__/demo-project/Management/demo-cluster/ClusterManagement/Kubernetes/demo-cluster/demo-cluster",
        category: "Management",
        provider: "GCP",
        project: "demo-project",
        service: "Kubernetes",
        cluster: "demo-cluster",
        name: "demo-cluster",
        provider_id: "demo-cluster",
        total: 24.36,
        adjustment: 0.0,
        details: management,
    },
    AssetDef {
        id: "AWS/__undefined__/prod-account/Other/prod-cluster/Cloud/AWS/nat-gateway-prod/nat-gateway-prod",
        category: "Other",
        provider: "AWS",
        project: "prod-account",
        service: "AWS",
        cluster: "prod-cluster",
        name: "nat-gateway-prod",
        provider_id: "nat-gateway-prod",
        total: 6.72,
        adjustment: 0.0,
        details: nat_gateway,
    },
];

fn scale_cost(base: f64, days: f64) -> f64 {
    round_currency(base / 7.0 * days)
}

/// Sample asset inventory for `window` ending relative to `today`.
pub fn asset_inventory(window: ReportWindow, today: NaiveDate) -> Vec<AssetRecord> {
    let WindowRange { start, end, days } = window.range(today);
    let (start, end) = (midnight(start), midnight(end));
    let days = days as f64;

    ASSETS
        .iter()
        .map(|def| AssetRecord {
            id: def.id.to_string(),
            details: (def.details)(days),
            properties: AssetProperties {
                category: Some(def.category.to_string()),
                provider: Some(def.provider.to_string()),
                account: None,
                project: Some(def.project.to_string()),
                service: Some(def.service.to_string()),
                cluster: Some(def.cluster.to_string()),
                name: Some(def.name.to_string()),
                provider_id: Some(def.provider_id.to_string()),
            },
            labels: BTreeMap::new(),
            window: TimeWindow::new(start, end),
            start: Some(start.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)),
            end: Some(end.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)),
            minutes: days * MINUTES_PER_DAY,
            adjustment: scale_cost(def.adjustment, days),
            total_cost: scale_cost(def.total, days),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::asset::AssetKind;
    use crate::core::cumulative::cumulative;
    use crate::core::filter::FilterEntry;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 13).unwrap()
    }

    fn query(accumulate: bool, filters: Vec<FilterEntry>) -> AllocationQuery {
        AllocationQuery {
            accumulate,
            filters,
            include_idle: true,
        }
    }

    #[test]
    fn test_daily_series_has_one_snapshot_per_day() {
        let series = allocation_series(
            ReportWindow::Last7Days,
            AggregationLevel::Namespace,
            &query(false, vec![]),
            today(),
        );
        assert_eq!(series.len(), 7);
        assert!(series.iter().all(|s| s.len() == NAMESPACES.len()));
        assert_eq!(series[0][0].minutes, 1440.0);
        assert_eq!(
            series[0][0].window.start.unwrap().date_naive(),
            NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
        );
    }

    #[test]
    fn test_series_is_deterministic() {
        let q = query(false, vec![]);
        let a = allocation_series(ReportWindow::Last14Days, AggregationLevel::Node, &q, today());
        let b = allocation_series(ReportWindow::Last14Days, AggregationLevel::Node, &q, today());
        assert_eq!(a, b);
    }

    #[test]
    fn test_accumulated_series_scales_to_window() {
        let series = allocation_series(
            ReportWindow::Last14Days,
            AggregationLevel::Cluster,
            &query(true, vec![]),
            today(),
        );
        assert_eq!(series.len(), 1);
        let demo = &series[0][0];
        assert_eq!(demo.name, "demo-cluster");
        assert_eq!(demo.cpu_cost, 360.0);
        assert_eq!(demo.total_cost, round_currency((180.0 + 322.0 + 120.0 + 35.0 + 5.5) * 2.0));
        assert_eq!(demo.minutes, 14.0 * 1440.0);
    }

    #[test]
    fn test_exclude_idle() {
        let mut q = query(true, vec![]);
        q.include_idle = false;
        let series = allocation_series(ReportWindow::Today, AggregationLevel::Namespace, &q, today());
        assert_eq!(series[0].len(), NAMESPACES.len() - 1);
        assert!(series[0].iter().all(|r| !r.is_idle()));
    }

    #[test]
    fn test_filters_narrow_levels() {
        let controllers = allocation_series(
            ReportWindow::Today,
            AggregationLevel::Controller,
            &query(true, vec![FilterEntry::new("namespace", "database")]),
            today(),
        );
        let names: Vec<_> = controllers[0].iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["statefulset:postgres-primary", "statefulset:postgres-replica"]
        );

        let pods = allocation_series(
            ReportWindow::Today,
            AggregationLevel::Pod,
            &query(true, vec![FilterEntry::new("controllerName", "api-gateway")]),
            today(),
        );
        assert_eq!(pods[0].len(), 3);

        let unknown = allocation_series(
            ReportWindow::Today,
            AggregationLevel::Pod,
            &query(true, vec![FilterEntry::new("controllerName", "cron")]),
            today(),
        );
        assert_eq!(unknown[0][0].name, "cron-pod-1");

        let containers = allocation_series(
            ReportWindow::Today,
            AggregationLevel::Container,
            &query(true, vec![FilterEntry::new("pod", "api-gateway-7b8f9c6d5-x2k4m")]),
            today(),
        );
        let names: Vec<_> = containers[0].iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["api-gateway", "istio-proxy"]);
    }

    #[test]
    fn test_controller_kinds_are_grouped() {
        let series = allocation_series(
            ReportWindow::Today,
            AggregationLevel::ControllerKind,
            &query(true, vec![]),
            today(),
        );
        let names: Vec<_> = series[0].iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["deployment", "statefulset", "daemonset"]);
    }

    #[test]
    fn test_daily_series_reduces_to_one_record_per_entity() {
        let series = allocation_series(
            ReportWindow::Last7Days,
            AggregationLevel::Namespace,
            &query(false, vec![]),
            today(),
        );
        let totals = cumulative(&series);
        assert_eq!(totals.len(), NAMESPACES.len());
        assert_eq!(totals["production"].minutes, 7.0 * 1440.0);
        assert!((totals["production"].total_efficiency - 0.78).abs() < 1e-9);
    }

    #[test]
    fn test_asset_inventory_covers_every_kind() {
        let assets = asset_inventory(ReportWindow::Last7Days, today());
        assert_eq!(assets.len(), 9);
        for kind in AssetKind::KNOWN {
            assert!(assets.iter().any(|a| a.kind() == kind), "{kind}");
        }
        let node = &assets[0];
        assert_eq!(node.total_cost, 12.35);
        assert_eq!(node.cpu_cost(), 8.42);
        assert_eq!(node.start.as_deref(), Some("2024-03-07T00:00:00.000Z"));
    }
}
