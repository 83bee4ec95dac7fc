//! Drill-down state machine over the allocation hierarchy.
//!
//! The state is the active aggregation level plus the filter stack that
//! narrows it. Drilling into a row appends a filter and moves one level down
//! the chain; breadcrumb navigation truncates the stack and re-derives the
//! level from its length.

use crate::core::aggregation::{AggregationLevel, DRILL_CHAIN};
use crate::core::filter::FilterEntry;
use tracing::debug;

const CONTROLLER_KIND_PROPERTY: &str = "controllerKind";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrillState {
    pub level: AggregationLevel,
    pub filters: Vec<FilterEntry>,
}

impl Default for DrillState {
    fn default() -> Self {
        Self {
            level: DRILL_CHAIN[0],
            filters: Vec::new(),
        }
    }
}

impl DrillState {
    pub fn new(level: AggregationLevel, filters: Vec<FilterEntry>) -> Self {
        Self { level, filters }
    }

    pub fn drill(&self, selected: &str) -> DrillState {
        drill(self.level, selected, &self.filters)
    }

    pub fn navigate(&self, target: Breadcrumb) -> DrillState {
        navigate(&self.filters, target)
    }
}

/// Target of a breadcrumb click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Breadcrumb {
    AllResults,
    /// Keep the filters up to and including this index.
    Level(usize),
}

impl Breadcrumb {
    /// `-1` (or any negative index) is "All Results".
    pub fn from_index(index: isize) -> Breadcrumb {
        usize::try_from(index).map_or(Breadcrumb::AllResults, Breadcrumb::Level)
    }
}

/// Computes the state after selecting `selected` at `level`.
///
/// Terminal levels, levels outside the drill chain and blank names leave the
/// state unchanged. The input stack is never modified.
pub fn drill(level: AggregationLevel, selected: &str, filters: &[FilterEntry]) -> DrillState {
    let unchanged = || DrillState::new(level, filters.to_vec());

    let Some(next) = level.successor() else {
        debug!("No drill-down defined below {}", level);
        return unchanged();
    };
    let trimmed = selected.trim();
    if trimmed.is_empty() {
        debug!("Ignoring drill-down on blank entity name");
        return unchanged();
    }

    let mut next_filters = filters.to_vec();
    let mut value = trimmed.to_string();

    // Controllers are keyed "kind:name" but filtered by name alone.
    if level == AggregationLevel::Controller
        && let Some((kind, name)) = trimmed.split_once(':')
    {
        let name = name.trim();
        if !name.is_empty() {
            value = name.to_string();
        }
        let kind = kind.trim();
        if !kind.is_empty()
            && !next_filters
                .iter()
                .any(|f| f.property == CONTROLLER_KIND_PROPERTY)
        {
            next_filters.push(FilterEntry::new(CONTROLLER_KIND_PROPERTY, kind));
        }
    }

    next_filters.push(FilterEntry::new(level.filter_property(), &value));
    DrillState::new(next, next_filters)
}

/// Breadcrumb navigation: the inverse of repeated [`drill`] calls.
pub fn navigate(filters: &[FilterEntry], target: Breadcrumb) -> DrillState {
    match target {
        Breadcrumb::AllResults => DrillState::default(),
        Breadcrumb::Level(index) => {
            let kept = filters[..filters.len().min(index + 1)].to_vec();
            // A stack longer than the chain restarts at the first level.
            let level = DRILL_CHAIN.get(kept.len()).copied().unwrap_or(DRILL_CHAIN[0]);
            DrillState::new(level, kept)
        }
    }
}

/// Renders the trail shown above a report, e.g.
/// `All Results › prod › deployment › pod`.
pub fn breadcrumbs(state: &DrillState) -> Option<String> {
    if state.filters.is_empty() {
        return None;
    }
    let mut parts = vec!["All Results".to_string()];
    parts.extend(state.filters.iter().map(|f| f.value.clone()));
    parts.push(state.level.to_string());
    Some(parts.join(" › "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(property: &str, value: &str) -> FilterEntry {
        FilterEntry::new(property, value)
    }

    #[test]
    fn test_drill_from_namespace() {
        let state = drill(AggregationLevel::Namespace, "checkout", &[]);
        assert_eq!(state.level, AggregationLevel::ControllerKind);
        assert_eq!(state.filters, vec![entry("namespace", "checkout")]);
    }

    #[test]
    fn test_drill_controller_compound_name() {
        let current = vec![entry("namespace", "prod")];
        let state = drill(
            AggregationLevel::Controller,
            "Deployment:api-gateway",
            &current,
        );

        assert_eq!(state.level, AggregationLevel::Pod);
        assert_eq!(
            state.filters,
            vec![
                entry("namespace", "prod"),
                entry("controllerKind", "Deployment"),
                entry("controllerName", "api-gateway"),
            ]
        );
        // Input untouched
        assert_eq!(current, vec![entry("namespace", "prod")]);
    }

    #[test]
    fn test_drill_controller_keeps_existing_kind_filter() {
        let current = vec![
            entry("namespace", "prod"),
            entry("controllerKind", "deployment"),
        ];
        let state = drill(AggregationLevel::Controller, "deployment:web", &current);
        assert_eq!(
            state.filters,
            vec![
                entry("namespace", "prod"),
                entry("controllerKind", "deployment"),
                entry("controllerName", "web"),
            ]
        );
    }

    #[test]
    fn test_drill_controller_splits_on_first_colon_only() {
        let state = drill(AggregationLevel::Controller, "job:backup:nightly", &[]);
        assert_eq!(
            state.filters,
            vec![
                entry("controllerKind", "job"),
                entry("controllerName", "backup:nightly"),
            ]
        );
    }

    #[test]
    fn test_drill_controller_without_name_part_keeps_full_value() {
        let state = drill(AggregationLevel::Controller, "deployment:", &[]);
        assert_eq!(
            state.filters,
            vec![
                entry("controllerKind", "deployment"),
                entry("controllerName", "deployment:"),
            ]
        );
    }

    #[test]
    fn test_drill_trims_selected_name() {
        let state = drill(AggregationLevel::Pod, "  api-7b8f-x2k4m ", &[]);
        assert_eq!(state.level, AggregationLevel::Container);
        assert_eq!(state.filters, vec![entry("pod", "api-7b8f-x2k4m")]);
    }

    #[test]
    fn test_drill_noops() {
        let current = vec![entry("namespace", "prod"), entry("pod", "nginx-1")];

        let terminal = drill(AggregationLevel::Container, "nginx", &current);
        assert_eq!(
            terminal,
            DrillState::new(AggregationLevel::Container, current.clone())
        );

        let blank = drill(AggregationLevel::Namespace, "   ", &current);
        assert_eq!(
            blank,
            DrillState::new(AggregationLevel::Namespace, current.clone())
        );

        let empty = drill(AggregationLevel::Pod, "", &current);
        assert_eq!(empty.level, AggregationLevel::Pod);

        for level in [AggregationLevel::Cluster, AggregationLevel::Node] {
            assert_eq!(
                drill(level, "demo-cluster", &current),
                DrillState::new(level, current.clone())
            );
        }
    }

    #[test]
    fn test_navigate_all_results() {
        let filters = vec![entry("namespace", "prod"), entry("controllerKind", "x")];
        let state = navigate(&filters, Breadcrumb::from_index(-1));
        assert_eq!(state, DrillState::default());
        assert_eq!(state.level, AggregationLevel::Namespace);
    }

    #[test]
    fn test_navigate_inverts_drill_sequence() {
        let selections = ["prod", "deployment", "deployment:api", "api-7b8f-x2k4m"];

        let mut state = DrillState::default();
        let mut levels_after_drill = Vec::new();
        for name in selections {
            state = state.drill(name);
            levels_after_drill.push(state.level);
        }
        assert_eq!(state.level, AggregationLevel::Container);
        assert_eq!(state.filters.len(), 4);

        for (k, expected) in levels_after_drill.iter().enumerate() {
            let back = state.navigate(Breadcrumb::Level(k));
            assert_eq!(back.level, *expected, "breadcrumb {k}");
            assert_eq!(back.filters, state.filters[..k + 1].to_vec());
        }
    }

    #[test]
    fn test_navigate_beyond_stack_length() {
        let filters = vec![entry("namespace", "prod")];
        let state = navigate(&filters, Breadcrumb::Level(10));
        assert_eq!(state.level, AggregationLevel::ControllerKind);
        assert_eq!(state.filters, filters);
    }

    #[test]
    fn test_navigate_stack_longer_than_chain() {
        let filters = vec![
            entry("cluster", "prod-cluster"),
            entry("namespace", "prod"),
            entry("controllerKind", "deployment"),
            entry("controllerName", "api"),
            entry("pod", "api-7b8f-x2k4m"),
            entry("container", "api"),
        ];
        let state = navigate(&filters, Breadcrumb::Level(4));
        assert_eq!(state.level, AggregationLevel::Namespace);
        assert_eq!(state.filters, filters[..5].to_vec());

        let state = navigate(&filters, Breadcrumb::Level(3));
        assert_eq!(state.level, AggregationLevel::Container);
    }

    #[test]
    fn test_breadcrumbs() {
        assert_eq!(breadcrumbs(&DrillState::default()), None);
        let state = DrillState::default().drill("prod").drill("deployment");
        assert_eq!(
            breadcrumbs(&state).unwrap(),
            "All Results › prod › deployment › controller"
        );
    }
}
