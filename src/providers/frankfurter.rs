use super::util::{DEFAULT_RETRIES, DEFAULT_RETRY_DELAY_MS, endpoint, http_client, with_retry};
use crate::core::currency::{CurrencyRateProvider, ExchangeRateTable};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

#[derive(Debug, Deserialize)]
struct FrankfurterResponse {
    rates: BTreeMap<String, f64>,
}

/// Live exchange rates from the Frankfurter API.
pub struct FrankfurterProvider {
    base_url: String,
    client: reqwest::Client,
}

impl FrankfurterProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: base_url.to_string(),
            client: http_client()?,
        })
    }
}

#[async_trait]
impl CurrencyRateProvider for FrankfurterProvider {
    #[instrument(name = "FrankfurterRates", skip_all, fields(base = %base))]
    async fn fetch_rates(&self, base: &str, codes: &[&str]) -> Result<ExchangeRateTable> {
        let url = endpoint(&self.base_url, "/latest");
        let params = [("from", base.to_string()), ("to", codes.join(","))];
        debug!("Requesting exchange rates from {}", url);

        let response = with_retry(
            || async { self.client.get(&url).query(&params).send().await },
            DEFAULT_RETRIES,
            DEFAULT_RETRY_DELAY_MS,
        )
        .await
        .map_err(|e| anyhow!("Request error: {} for rates URL: {}", e, url))?;

        if !response.status().is_success() {
            return Err(anyhow!("HTTP error: {} for rates", response.status()));
        }

        let text = response.text().await?;
        let data: FrankfurterResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse rates response: {}", e))?;

        let rates = data
            .rates
            .into_iter()
            .filter(|(_, rate)| rate.is_finite() && *rate > 0.0)
            .collect();
        Ok(ExchangeRateTable::new(rates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_successful_rates_fetch() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .and(query_param("from", "USD"))
            .and(query_param("to", "EUR,INR"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"amount":1.0,"base":"USD","date":"2024-03-13","rates":{"EUR":0.9,"INR":83.2}}"#,
            ))
            .mount(&mock_server)
            .await;

        let provider = FrankfurterProvider::new(&mock_server.uri()).unwrap();
        let rates = provider.fetch_rates("USD", &["EUR", "INR"]).await.unwrap();

        assert_eq!(rates.rate_for("EUR"), 0.9);
        assert_eq!(rates.rate_for("INR"), 83.2);
        assert_eq!(rates.rate_for("USD"), 1.0);
        assert_eq!(rates.len(), 3);
    }

    #[tokio::test]
    async fn test_rates_api_error_response() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let provider = FrankfurterProvider::new(&mock_server.uri()).unwrap();
        let result = provider.fetch_rates("USD", &["EUR"]).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 503 Service Unavailable for rates"
        );
    }

    #[tokio::test]
    async fn test_rates_api_malformed_response() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"quotes": {}}"#))
            .mount(&mock_server)
            .await;

        let provider = FrankfurterProvider::new(&mock_server.uri()).unwrap();
        let result = provider.fetch_rates("USD", &["EUR"]).await;
        assert!(
            result
                .unwrap_err()
                .to_string()
                .starts_with("Failed to parse rates response")
        );
    }
}
