//! Infrastructure assets as returned by the assets API.
//!
//! Every asset carries a `type` tag selecting its kind-specific fields; the
//! common fields (properties, window, adjustment, total cost) live on
//! [`AssetRecord`] itself.

use crate::core::cost::{TimeWindow, null_as_default};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub enum AssetKind {
    Node,
    Disk,
    LoadBalancer,
    Network,
    Cloud,
    ClusterManagement,
    Other,
}

impl AssetKind {
    pub const KNOWN: [AssetKind; 6] = [
        AssetKind::Node,
        AssetKind::Disk,
        AssetKind::LoadBalancer,
        AssetKind::Network,
        AssetKind::Cloud,
        AssetKind::ClusterManagement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Node => "Node",
            AssetKind::Disk => "Disk",
            AssetKind::LoadBalancer => "LoadBalancer",
            AssetKind::Network => "Network",
            AssetKind::Cloud => "Cloud",
            AssetKind::ClusterManagement => "ClusterManagement",
            AssetKind::Other => "Other",
        }
    }

    /// Plural label used on summary lines.
    pub fn label(&self) -> &'static str {
        match self {
            AssetKind::Node => "Nodes",
            AssetKind::Disk => "Disks",
            AssetKind::LoadBalancer => "Load Balancers",
            AssetKind::Network => "Network",
            AssetKind::Cloud => "Cloud",
            AssetKind::ClusterManagement => "Management",
            AssetKind::Other => "Other",
        }
    }
}

impl Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AssetKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::KNOWN
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow::anyhow!("Invalid asset type: {}", s))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeDetails {
    #[serde(deserialize_with = "null_as_default")]
    pub node_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub pool: String,
    #[serde(deserialize_with = "null_as_default")]
    pub cpu_cores: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub ram_bytes: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub cpu_cost: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub gpu_cost: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub gpu_count: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub ram_cost: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub discount: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub preemptible: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiskDetails {
    #[serde(deserialize_with = "null_as_default")]
    pub bytes: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub storage_class: String,
    #[serde(deserialize_with = "null_as_default")]
    pub volume_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub claim_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub claim_namespace: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoadBalancerDetails {
    #[serde(deserialize_with = "null_as_default")]
    pub ip: String,
    #[serde(deserialize_with = "null_as_default")]
    pub private: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CloudDetails {
    #[serde(deserialize_with = "null_as_default")]
    pub credit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AssetDetails {
    Node(NodeDetails),
    Disk(DiskDetails),
    LoadBalancer(LoadBalancerDetails),
    Network,
    Cloud(CloudDetails),
    ClusterManagement,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetProperties {
    pub category: Option<String>,
    pub provider: Option<String>,
    pub account: Option<String>,
    pub project: Option<String>,
    pub service: Option<String>,
    pub cluster: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "providerID")]
    pub provider_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    /// Composite resource key the asset was listed under.
    #[serde(skip)]
    pub id: String,
    #[serde(flatten)]
    pub details: AssetDetails,
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: AssetProperties,
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub window: TimeWindow,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub minutes: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub adjustment: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_cost: f64,
}

impl AssetRecord {
    pub fn kind(&self) -> AssetKind {
        match self.details {
            AssetDetails::Node(_) => AssetKind::Node,
            AssetDetails::Disk(_) => AssetKind::Disk,
            AssetDetails::LoadBalancer(_) => AssetKind::LoadBalancer,
            AssetDetails::Network => AssetKind::Network,
            AssetDetails::Cloud(_) => AssetKind::Cloud,
            AssetDetails::ClusterManagement => AssetKind::ClusterManagement,
            AssetDetails::Other => AssetKind::Other,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.properties.name.as_deref()
    }

    pub fn cpu_cost(&self) -> f64 {
        match &self.details {
            AssetDetails::Node(node) => node.cpu_cost,
            _ => 0.0,
        }
    }

    pub fn ram_cost(&self) -> f64 {
        match &self.details {
            AssetDetails::Node(node) => node.ram_cost,
            _ => 0.0,
        }
    }

    pub fn gpu_cost(&self) -> f64 {
        match &self.details {
            AssetDetails::Node(node) => node.gpu_cost,
            _ => 0.0,
        }
    }

    pub(crate) fn scale_costs(&mut self, rate: f64) {
        self.total_cost *= rate;
        self.adjustment *= rate;
        match &mut self.details {
            AssetDetails::Node(node) => {
                node.cpu_cost *= rate;
                node.ram_cost *= rate;
                node.gpu_cost *= rate;
            }
            AssetDetails::Cloud(cloud) => cloud.credit *= rate,
            _ => {}
        }
    }

    /// Kind-specific attributes as label/value pairs for detail output.
    pub fn detail_fields(&self) -> Vec<(&'static str, String)> {
        match &self.details {
            AssetDetails::Node(node) => vec![
                ("Instance type", node.node_type.clone()),
                ("Pool", node.pool.clone()),
                ("CPU cores", format!("{}", node.cpu_cores)),
                ("RAM", format!("{:.1} GiB", node.ram_bytes / 1024f64.powi(3))),
                ("GPUs", format!("{}", node.gpu_count)),
                ("Discount", format!("{:.0}%", node.discount * 100.0)),
                (
                    "Preemptible",
                    if node.preemptible > 0.0 { "yes" } else { "no" }.to_string(),
                ),
            ],
            AssetDetails::Disk(disk) => vec![
                ("Size", format!("{:.1} GiB", disk.bytes / 1024f64.powi(3))),
                ("Storage class", disk.storage_class.clone()),
                ("Volume", disk.volume_name.clone()),
                (
                    "Claim",
                    format!("{}/{}", disk.claim_namespace, disk.claim_name),
                ),
            ],
            AssetDetails::LoadBalancer(lb) => vec![
                ("IP", lb.ip.clone()),
                ("Private", if lb.private { "yes" } else { "no" }.to_string()),
            ],
            AssetDetails::Cloud(cloud) => vec![("Credit", format!("{:.2}", cloud.credit))],
            AssetDetails::Network | AssetDetails::ClusterManagement | AssetDetails::Other => {
                Vec::new()
            }
        }
    }
}

/// Parses the `{key: asset}` map of an assets response, keeping each key as
/// the asset id.
pub fn assets_from_map(map: BTreeMap<String, AssetRecord>) -> Vec<AssetRecord> {
    map.into_iter()
        .map(|(id, mut asset)| {
            asset.id = id;
            asset
        })
        .collect()
}

/// Asset count and total cost per kind.
pub fn summarize_by_kind(assets: &[AssetRecord]) -> BTreeMap<AssetKind, (usize, f64)> {
    let mut summary = BTreeMap::new();
    for asset in assets {
        let entry = summary.entry(asset.kind()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += asset.total_cost;
    }
    summary
}
