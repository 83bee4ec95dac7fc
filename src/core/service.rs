//! Data service contracts consumed by the CLI.
//!
//! Implementations never fail: when the backend is unavailable they return
//! deterministic fallback content and set `is_fallback_data`.

use crate::core::aggregation::AggregationLevel;
use crate::core::asset::AssetRecord;
use crate::core::cost::CostRecordSeries;
use crate::core::filter::FilterEntry;
use crate::core::window::ReportWindow;
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq)]
pub struct AllocationQuery {
    /// One accumulated snapshot instead of one per day.
    pub accumulate: bool,
    pub filters: Vec<FilterEntry>,
    pub include_idle: bool,
}

impl Default for AllocationQuery {
    fn default() -> Self {
        Self {
            accumulate: false,
            filters: Vec::new(),
            include_idle: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllocationSeries {
    pub series: CostRecordSeries,
    pub is_fallback_data: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetInventory {
    pub assets: Vec<AssetRecord>,
    pub is_fallback_data: bool,
}

#[async_trait]
pub trait AllocationDataService: Send + Sync {
    async fn fetch_allocation_series(
        &self,
        window: ReportWindow,
        level: AggregationLevel,
        query: &AllocationQuery,
    ) -> AllocationSeries;
}

#[async_trait]
pub trait AssetDataService: Send + Sync {
    async fn fetch_asset_inventory(&self, window: ReportWindow) -> AssetInventory;
}
