use super::util::with_retry;
use crate::core::config::ProviderConfig;
use crate::core::currency::CurrencyCode;
use crate::core::rates::{RateProvider, RateTable};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

const RETRY_DELAY_MS: u64 = 500;

/// Rates from the exchangerate-api.com `latest` endpoint.
pub struct ExchangeRateApiProvider {
    base_url: String,
    client: reqwest::Client,
    retries: usize,
}

impl ExchangeRateApiProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::from_config(&ProviderConfig {
            base_url: base_url.to_string(),
            ..ProviderConfig::default()
        })
    }

    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("cambio/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(ExchangeRateApiProvider {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            retries: config.retries,
        })
    }

    async fn fetch_once(&self, url: &str, base: CurrencyCode) -> Result<RateTable> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for base currency: {}", e, base))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for base currency: {}",
                response.status(),
                base
            ));
        }

        let text = response.text().await?;
        let data: LatestRatesResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", base, e))?;

        if let Some(reported) = data.base.as_deref() {
            if !reported.eq_ignore_ascii_case(base.code()) {
                return Err(anyhow!(
                    "Requested rates for {} but received rates for {}",
                    base,
                    reported
                ));
            }
        }

        Ok(RateTable {
            base,
            rates: data.rates,
            updated_at: data
                .time_last_updated
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
        })
    }
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    base: Option<String>,
    time_last_updated: Option<i64>,
    rates: HashMap<String, f64>,
}

#[async_trait]
impl RateProvider for ExchangeRateApiProvider {
    #[instrument(name = "ExchangeRateFetch", skip(self), fields(base = %base))]
    async fn fetch_rates(&self, base: CurrencyCode) -> Result<RateTable> {
        let url = format!("{}/latest/{}", self.base_url, base.code());
        debug!("Requesting rate table from {}", url);

        let table = with_retry(
            || self.fetch_once(&url, base),
            self.retries,
            RETRY_DELAY_MS,
        )
        .await?;
        debug!(rates = table.rates.len(), "Received rate table");
        Ok(table)
    }
}
