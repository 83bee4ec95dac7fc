//! Persisted client state: the selected display currency and the last
//! successfully fetched exchange-rate table.

use crate::core::cache::{KeyValueCollection, get_json, put_json};
use crate::core::currency::{BASE_CURRENCY, ExchangeRateTable, currency_option};
use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const CURRENCY_KEY: &str = "opencost-currency";
pub const EXCHANGE_RATES_KEY: &str = "opencost-exchange-rates";
pub const COLLECTION_NAME: &str = "preferences";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedRates {
    pub rates: ExchangeRateTable,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone)]
pub struct Preferences {
    collection: Arc<dyn KeyValueCollection>,
}

impl Preferences {
    pub fn new(collection: Arc<dyn KeyValueCollection>) -> Self {
        Self { collection }
    }

    /// Stored currency code, if a supported one has been saved.
    pub async fn stored_currency(&self) -> Option<String> {
        get_json::<String>(self.collection.as_ref(), CURRENCY_KEY)
            .await
            .and_then(|code| currency_option(&code).map(|c| c.code.to_string()))
    }

    /// Stored currency code, or USD when nothing valid is stored.
    pub async fn load_currency(&self) -> String {
        self.stored_currency()
            .await
            .unwrap_or_else(|| BASE_CURRENCY.to_string())
    }

    pub async fn save_currency(&self, code: &str) -> Result<String> {
        let Some(option) = currency_option(code) else {
            bail!("Unsupported currency: {}", code);
        };
        put_json(self.collection.as_ref(), CURRENCY_KEY, &option.code, None).await?;
        Ok(option.code.to_string())
    }

    pub async fn load_cached_rates(&self) -> Option<CachedRates> {
        get_json(self.collection.as_ref(), EXCHANGE_RATES_KEY).await
    }

    pub async fn save_cached_rates(&self, cached: &CachedRates) -> Result<()> {
        put_json(self.collection.as_ref(), EXCHANGE_RATES_KEY, cached, None).await
    }
}
