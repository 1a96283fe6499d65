//! A single conversion cycle: validate the inputs, fetch the rate table,
//! multiply.

use super::currency::CurrencyCode;
use super::format::format_currency;
use super::rates::RateProvider;
use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::{debug, instrument};

/// Message shown to the user for every kind of conversion failure.
pub const CONVERSION_FAILED_MESSAGE: &str = "Erro ao converter moeda. Tente novamente mais tarde.";

/// Raw, user-edited inputs of the converter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionInputs {
    pub amount: String,
    pub source: CurrencyCode,
    pub target: CurrencyCode,
}

impl Default for ConversionInputs {
    fn default() -> Self {
        Self {
            amount: "1".to_string(),
            source: CurrencyCode::Brl,
            target: CurrencyCode::Usd,
        }
    }
}

impl ConversionInputs {
    /// Exchanges source and target, both taken from the current state.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.source, &mut self.target);
    }

    /// The validated request, or `None` when the amount is empty or not a
    /// finite number. No conversion is triggered in that case.
    pub fn request(&self) -> Option<ConversionRequest> {
        parse_amount(&self.amount).map(|amount| ConversionRequest {
            amount,
            source: self.source,
            target: self.target,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionRequest {
    pub amount: f64,
    pub source: CurrencyCode,
    pub target: CurrencyCode,
}

/// Parses a user-typed amount. Accepts `,` as the decimal separator when no
/// `.` is present, so both `1.5` and `1,5` work.
pub fn parse_amount(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let normalized = if !trimmed.contains('.') && trimmed.matches(',').count() == 1 {
        trimmed.replace(',', ".")
    } else {
        trimmed.to_string()
    };

    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub request: ConversionRequest,
    pub rate: f64,
    pub converted_amount: f64,
    pub rates_updated_at: Option<DateTime<Utc>>,
}

impl Conversion {
    /// `"R$ 1,00 = US$ 0,20"`
    pub fn summary(&self) -> String {
        format!(
            "{} = {}",
            format_currency(self.request.amount, self.request.source),
            format_currency(self.converted_amount, self.request.target)
        )
    }
}

/// The single failure kind of a conversion cycle. The cause is kept for
/// logging; users only ever see [`CONVERSION_FAILED_MESSAGE`].
#[derive(Debug)]
pub struct ConversionFailed {
    cause: anyhow::Error,
}

impl ConversionFailed {
    pub fn new(cause: anyhow::Error) -> Self {
        Self { cause }
    }

    pub fn cause(&self) -> &anyhow::Error {
        &self.cause
    }
}

impl Display for ConversionFailed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{CONVERSION_FAILED_MESSAGE}")
    }
}

impl std::error::Error for ConversionFailed {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.cause)
    }
}

#[instrument(
    name = "Convert",
    skip(provider),
    fields(source = %request.source, target = %request.target)
)]
pub async fn convert(
    provider: &dyn RateProvider,
    request: ConversionRequest,
) -> Result<Conversion, ConversionFailed> {
    let table = provider
        .fetch_rates(request.source)
        .await
        .map_err(ConversionFailed::new)?;
    let rate = table.rate(request.target).map_err(ConversionFailed::new)?;

    let converted_amount = request.amount * rate;
    if !converted_amount.is_finite() {
        return Err(ConversionFailed::new(anyhow!(
            "Conversion of {} {} produced a non-finite value",
            request.amount,
            request.source
        )));
    }
    debug!(rate, converted_amount, "Conversion computed");

    Ok(Conversion {
        request,
        rate,
        converted_amount,
        rates_updated_at: table.updated_at,
    })
}
