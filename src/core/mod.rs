//! Core cost-reporting logic, independent of any backend or terminal

pub mod aggregation;
pub mod asset;
pub mod cache;
pub mod config;
pub mod cost;
pub mod cumulative;
pub mod currency;
pub mod drilldown;
pub mod export;
pub mod filter;
pub mod log;
pub mod preferences;
pub mod refresh;
pub mod service;
pub mod window;

// Re-export main types for cleaner imports
pub use aggregation::AggregationLevel;
pub use asset::{AssetKind, AssetRecord};
pub use cost::{CostRecord, CostRecordSeries};
pub use currency::{CurrencyRateProvider, ExchangeRateTable, RatesResult};
pub use drilldown::{Breadcrumb, DrillState};
pub use filter::FilterEntry;
pub use service::{AllocationDataService, AllocationQuery, AssetDataService};
pub use window::ReportWindow;
