use super::fallback;
use super::util::{DEFAULT_RETRIES, DEFAULT_RETRY_DELAY_MS, endpoint, http_client, with_retry};
use crate::core::aggregation::AggregationLevel;
use crate::core::asset::{AssetRecord, assets_from_map};
use crate::core::cost::{CostRecord, CostRecordSeries, Snapshot};
use crate::core::filter;
use crate::core::service::{
    AllocationDataService, AllocationQuery, AllocationSeries, AssetDataService, AssetInventory,
};
use crate::core::window::ReportWindow;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

const ALLOCATION_PATH: &str = "/allocation/compute";
const ASSETS_PATH: &str = "/model/assets";

/// A snapshot is either a list of records or a name-to-record map.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireSnapshot {
    List(Vec<CostRecord>),
    Map(BTreeMap<String, CostRecord>),
}

impl From<WireSnapshot> for Snapshot {
    fn from(wire: WireSnapshot) -> Self {
        match wire {
            WireSnapshot::List(records) => records,
            WireSnapshot::Map(map) => map
                .into_iter()
                .map(|(name, mut record)| {
                    if record.name.is_empty() {
                        record.name = name;
                    }
                    record
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AllocationResponse {
    code: Option<u16>,
    #[serde(default)]
    data: Vec<Option<WireSnapshot>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireAssets {
    Sets(Vec<BTreeMap<String, AssetRecord>>),
    Single(BTreeMap<String, AssetRecord>),
}

#[derive(Debug, Deserialize)]
struct AssetsResponse {
    code: Option<u16>,
    data: WireAssets,
}

/// Client for the OpenCost cost-model API.
pub struct OpenCostClient {
    base_url: String,
    client: reqwest::Client,
}

impl OpenCostClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: base_url.to_string(),
            client: http_client()?,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<T> {
        let url = endpoint(&self.base_url, path);
        debug!(url = %url, ?params, "Requesting OpenCost data");

        let response = with_retry(
            || async {
                self.client
                    .get(&url)
                    .query(params)
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
            },
            DEFAULT_RETRIES,
            DEFAULT_RETRY_DELAY_MS,
        )
        .await
        .with_context(|| format!("Request to {} failed", url))?;

        let text = response
            .text()
            .await
            .context("Failed to read response body")?;
        serde_json::from_str(&text).with_context(|| format!("Failed to parse response from {}", url))
    }

    /// Fetches the raw allocation series. Errors are returned to the caller.
    #[instrument(
        name = "AllocationFetch",
        skip_all,
        fields(window = %window, aggregate = %level)
    )]
    pub async fn fetch_allocations(
        &self,
        window: ReportWindow,
        level: AggregationLevel,
        query: &AllocationQuery,
    ) -> Result<CostRecordSeries> {
        let mut params = vec![
            ("window", window.as_str().to_string()),
            ("aggregate", level.as_str().to_string()),
            ("includeIdle", query.include_idle.to_string()),
            ("step", "1d".to_string()),
            ("accumulate", query.accumulate.to_string()),
        ];
        if !query.filters.is_empty() {
            params.push(("filter", filter::encode(&query.filters)));
        }

        let response: AllocationResponse = self.get_json(ALLOCATION_PATH, &params).await?;
        if let Some(code) = response.code
            && code >= 400
        {
            bail!("Allocation API returned code {}", code);
        }

        let series: CostRecordSeries = response
            .data
            .into_iter()
            .map(|snapshot| snapshot.map(Snapshot::from).unwrap_or_default())
            .collect();
        debug!(snapshots = series.len(), "Received allocation series");
        Ok(series)
    }

    /// Fetches the raw asset list, keyed ids preserved.
    #[instrument(name = "AssetFetch", skip_all, fields(window = %window))]
    pub async fn fetch_assets(&self, window: ReportWindow) -> Result<Vec<AssetRecord>> {
        let params = [("window", window.as_str().to_string())];
        let response: AssetsResponse = self.get_json(ASSETS_PATH, &params).await?;
        if let Some(code) = response.code
            && code >= 400
        {
            bail!("Assets API returned code {}", code);
        }

        let assets = match response.data {
            WireAssets::Sets(sets) => sets.into_iter().flat_map(assets_from_map).collect(),
            WireAssets::Single(map) => assets_from_map(map),
        };
        Ok(assets)
    }
}

#[async_trait]
impl AllocationDataService for OpenCostClient {
    async fn fetch_allocation_series(
        &self,
        window: ReportWindow,
        level: AggregationLevel,
        query: &AllocationQuery,
    ) -> AllocationSeries {
        match self.fetch_allocations(window, level, query).await {
            Ok(series) => AllocationSeries {
                series,
                is_fallback_data: false,
            },
            Err(e) => {
                warn!(error = %e, "Allocation API unavailable, using sample data");
                AllocationSeries {
                    series: fallback::allocation_series(
                        window,
                        level,
                        query,
                        Utc::now().date_naive(),
                    ),
                    is_fallback_data: true,
                }
            }
        }
    }
}

#[async_trait]
impl AssetDataService for OpenCostClient {
    async fn fetch_asset_inventory(&self, window: ReportWindow) -> AssetInventory {
        match self.fetch_assets(window).await {
            Ok(assets) => AssetInventory {
                assets,
                is_fallback_data: false,
            },
            Err(e) => {
                warn!(error = %e, "Assets API unavailable, using sample data");
                AssetInventory {
                    assets: fallback::asset_inventory(window, Utc::now().date_naive()),
                    is_fallback_data: true,
                }
            }
        }
    }
}
