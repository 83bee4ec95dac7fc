use crate::core::currency::{
    BASE_CURRENCY, CurrencyRateProvider, RatesResult, fallback_rates, supported_codes,
};
use crate::core::preferences::{CachedRates, Preferences};
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

/// Cached rates younger than this are served without a network call.
pub const RATES_TTL_SECS: i64 = 60 * 60;

/// Rate source with a persistent cache and an offline fallback table.
pub struct CachingRatesProvider<T: CurrencyRateProvider> {
    inner: T,
    preferences: Preferences,
}

impl<T: CurrencyRateProvider> CachingRatesProvider<T> {
    pub fn new(inner: T, preferences: Preferences) -> Self {
        Self { inner, preferences }
    }

    /// Never fails. Order of preference: fresh cache, live fetch (which
    /// refreshes the cache), approximate offline rates.
    pub async fn get_rates(&self) -> RatesResult {
        self.get_rates_at(Utc::now()).await
    }

    pub async fn get_rates_at(&self, now: DateTime<Utc>) -> RatesResult {
        if let Some(cached) = self.preferences.load_cached_rates().await {
            if now - cached.timestamp < Duration::seconds(RATES_TTL_SECS) {
                debug!("Cache hit for exchange rates from {}", cached.timestamp);
                return RatesResult {
                    rates: cached.rates,
                    is_live: true,
                    is_cached: true,
                };
            }
            debug!("Cached exchange rates from {} are stale", cached.timestamp);
        }

        match self.inner.fetch_rates(BASE_CURRENCY, &supported_codes()).await {
            Ok(rates) => {
                let cached = CachedRates {
                    rates: rates.clone(),
                    timestamp: now,
                };
                if let Err(e) = self.preferences.save_cached_rates(&cached).await {
                    warn!(error = %e, "Failed to cache exchange rates");
                }
                RatesResult {
                    rates,
                    is_live: true,
                    is_cached: false,
                }
            }
            Err(e) => {
                warn!(error = %e, "Exchange rate API unavailable, using approximate rates");
                RatesResult {
                    rates: fallback_rates(),
                    is_live: false,
                    is_cached: false,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cost::CostRecord;
    use crate::core::currency::{ExchangeRateTable, convert};
    use crate::core::cumulative::cumulative;
    use crate::store::memory::MemoryCollection;
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockRateSource {
        call_count: AtomicUsize,
        rates: Option<BTreeMap<String, f64>>,
    }

    impl MockRateSource {
        fn live(eur: f64) -> Self {
            Self {
                call_count: AtomicUsize::new(0),
                rates: Some(BTreeMap::from([("EUR".to_string(), eur)])),
            }
        }

        fn failing() -> Self {
            Self {
                call_count: AtomicUsize::new(0),
                rates: None,
            }
        }
    }

    #[async_trait]
    impl<'a> CurrencyRateProvider for &'a MockRateSource {
        async fn fetch_rates(&self, base: &str, codes: &[&str]) -> Result<ExchangeRateTable> {
            assert_eq!(base, "USD");
            assert_eq!(codes.len(), 17);
            self.call_count.fetch_add(1, Ordering::SeqCst);
            self.rates
                .clone()
                .map(ExchangeRateTable::new)
                .ok_or_else(|| anyhow!("network down"))
        }
    }

    fn preferences() -> Preferences {
        Preferences::new(Arc::new(MemoryCollection::new()))
    }

    #[tokio::test]
    async fn test_live_fetch_is_cached() {
        let source = MockRateSource::live(0.9);
        let provider = CachingRatesProvider::new(&source, preferences());
        let now = Utc::now();

        let first = provider.get_rates_at(now).await;
        assert!(first.is_live);
        assert!(!first.is_cached);
        assert_eq!(first.rates.rate_for("EUR"), 0.9);

        let second = provider.get_rates_at(now + Duration::minutes(59)).await;
        assert!(second.is_live);
        assert!(second.is_cached);
        assert_eq!(second.rates, first.rates);
        assert_eq!(source.call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stale_cache_triggers_refetch() {
        let source = MockRateSource::live(0.95);
        let prefs = preferences();
        prefs
            .save_cached_rates(&CachedRates {
                rates: ExchangeRateTable::new(BTreeMap::from([("EUR".to_string(), 0.5)])),
                timestamp: Utc::now() - Duration::hours(2),
            })
            .await
            .unwrap();
        let provider = CachingRatesProvider::new(&source, prefs.clone());

        let result = provider.get_rates().await;
        assert!(!result.is_cached);
        assert_eq!(result.rates.rate_for("EUR"), 0.95);
        assert_eq!(source.call_count.load(Ordering::SeqCst), 1);
        assert_eq!(
            prefs.load_cached_rates().await.unwrap().rates.rate_for("EUR"),
            0.95
        );
    }

    #[tokio::test]
    async fn test_failing_source_uses_fallback_rates() {
        let source = MockRateSource::failing();
        let prefs = preferences();
        let provider = CachingRatesProvider::new(&source, prefs.clone());

        let result = provider.get_rates().await;
        assert!(!result.is_live);
        assert_eq!(result.rates, fallback_rates());
        assert!(prefs.load_cached_rates().await.is_none());

        let record = CostRecord {
            name: "ns-a".to_string(),
            total_cost: 100.0,
            ..Default::default()
        };
        let converted = convert(&record, result.rates.rate_for("EUR"));
        assert_eq!(converted.total_cost, 92.0);
    }

    #[tokio::test]
    async fn test_three_day_series_in_eur() {
        let day = |a: f64, b: f64| {
            vec![
                CostRecord {
                    total_cost: a,
                    ..CostRecord::named("ns-a")
                },
                CostRecord {
                    total_cost: b,
                    ..CostRecord::named("ns-b")
                },
            ]
        };
        let series = vec![day(10.0, 3.0), day(11.0, 3.0), day(12.0, 4.0)];

        let source = MockRateSource::live(0.9);
        let provider = CachingRatesProvider::new(&source, preferences());
        let rate = provider.get_rates().await.rates.rate_for("EUR");

        let totals = cumulative(&series);
        assert_eq!(totals["ns-a"].total_cost, 33.0);
        assert_eq!(totals["ns-b"].total_cost, 10.0);

        let a = convert(&totals["ns-a"], rate);
        let b = convert(&totals["ns-b"], rate);
        assert!((a.total_cost - 29.7).abs() < 1e-9);
        assert!((b.total_cost - 9.0).abs() < 1e-9);
    }
}
