//! Exchange rate abstractions

use super::currency::CurrencyCode;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Rates against a single base currency, as returned by one provider call.
#[derive(Debug, Clone)]
pub struct RateTable {
    pub base: CurrencyCode,
    /// Keyed by upper-case currency code. Providers usually return far more
    /// codes than [`CurrencyCode::ALL`], so this stays a plain string map.
    pub rates: HashMap<String, f64>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl RateTable {
    pub fn new(base: CurrencyCode, rates: HashMap<String, f64>) -> Self {
        Self {
            base,
            rates,
            updated_at: None,
        }
    }

    /// Looks up the rate for `target`, rejecting entries that cannot be used
    /// to convert an amount.
    pub fn rate(&self, target: CurrencyCode) -> Result<f64> {
        let rate = *self
            .rates
            .get(target.code())
            .ok_or_else(|| anyhow!("No rate for {} in table based on {}", target, self.base))?;

        if !rate.is_finite() || rate <= 0.0 {
            return Err(anyhow!(
                "Invalid rate {} for {} in table based on {}",
                rate,
                target,
                self.base
            ));
        }
        Ok(rate)
    }
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch_rates(&self, base: CurrencyCode) -> Result<RateTable>;
}
