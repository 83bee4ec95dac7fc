//! Aggregation levels understood by the allocation API

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AggregationLevel {
    Namespace,
    Cluster,
    Node,
    ControllerKind,
    Controller,
    Pod,
    Container,
}

/// Levels reachable by drilling down, coarse to fine.
pub const DRILL_CHAIN: [AggregationLevel; 5] = [
    AggregationLevel::Namespace,
    AggregationLevel::ControllerKind,
    AggregationLevel::Controller,
    AggregationLevel::Pod,
    AggregationLevel::Container,
];

impl AggregationLevel {
    pub const ALL: [AggregationLevel; 7] = [
        AggregationLevel::Namespace,
        AggregationLevel::Cluster,
        AggregationLevel::Node,
        AggregationLevel::ControllerKind,
        AggregationLevel::Controller,
        AggregationLevel::Pod,
        AggregationLevel::Container,
    ];

    /// Query value for the `aggregate` parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationLevel::Namespace => "namespace",
            AggregationLevel::Cluster => "cluster",
            AggregationLevel::Node => "node",
            AggregationLevel::ControllerKind => "controllerKind",
            AggregationLevel::Controller => "controller",
            AggregationLevel::Pod => "pod",
            AggregationLevel::Container => "container",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AggregationLevel::Namespace => "Namespace",
            AggregationLevel::Cluster => "Cluster",
            AggregationLevel::Node => "Node",
            AggregationLevel::ControllerKind => "Controller Kind",
            AggregationLevel::Controller => "Controller",
            AggregationLevel::Pod => "Pod",
            AggregationLevel::Container => "Container",
        }
    }

    /// Next level in the drill chain. `cluster` and `node` are not part of
    /// the chain and `container` is terminal.
    pub fn successor(&self) -> Option<AggregationLevel> {
        match self {
            AggregationLevel::Namespace => Some(AggregationLevel::ControllerKind),
            AggregationLevel::ControllerKind => Some(AggregationLevel::Controller),
            AggregationLevel::Controller => Some(AggregationLevel::Pod),
            AggregationLevel::Pod => Some(AggregationLevel::Container),
            AggregationLevel::Container | AggregationLevel::Cluster | AggregationLevel::Node => {
                None
            }
        }
    }

    /// Filter property that constrains the next level to a row of this one.
    pub fn filter_property(&self) -> &'static str {
        match self {
            AggregationLevel::Controller => "controllerName",
            other => other.as_str(),
        }
    }
}

impl Display for AggregationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AggregationLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().to_lowercase() == lowered)
            .ok_or_else(|| anyhow::anyhow!("Invalid aggregation: {}", s))
    }
}
