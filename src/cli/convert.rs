use super::ui;
use crate::core::conversion::CONVERSION_FAILED_MESSAGE;
use crate::core::{Conversion, ConversionController, ConversionInputs, RateProvider, ViewState};
use anyhow::{Result, anyhow, bail};
use std::sync::Arc;
use tracing::debug;

/// Runs a single conversion cycle and prints the outcome.
pub async fn run(provider: Arc<dyn RateProvider>, inputs: ConversionInputs) -> Result<Conversion> {
    if inputs.request().is_none() {
        bail!("Invalid amount: '{}'", inputs.amount);
    }

    let handle = ConversionController::spawn(provider, inputs);
    let spinner = ui::new_spinner("Convertendo...");
    let snapshot = handle.settled().await;
    spinner.finish_and_clear();

    let snapshot = snapshot?;
    debug!(?snapshot, "Conversion settled");
    match snapshot.state {
        ViewState::Success(conversion) => {
            println!("{}", format_result(&conversion));
            Ok(conversion)
        }
        ViewState::Failure { message } => Err(anyhow!(message)),
        // Inputs were validated above, so the cycle cannot end idle
        ViewState::Idle | ViewState::Loading => Err(anyhow!(CONVERSION_FAILED_MESSAGE)),
    }
}

/// Result line plus the rate it was computed with.
pub fn format_result(conversion: &Conversion) -> String {
    let request = &conversion.request;
    let mut details = format!(
        "1 {} = {:.4} {}",
        request.source, conversion.rate, request.target
    );
    if let Some(updated_at) = conversion.rates_updated_at {
        details.push_str(&format!(
            " (taxas de {})",
            updated_at.format("%d/%m/%Y %H:%M UTC")
        ));
    }

    format!(
        "{}\n{}",
        ui::style_text(&conversion.summary(), ui::StyleType::Result),
        ui::style_text(&details, ui::StyleType::Subtle)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ConversionRequest, CurrencyCode, RateTable};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;

    struct StaticProvider(Option<f64>);

    #[async_trait]
    impl RateProvider for StaticProvider {
        async fn fetch_rates(&self, base: CurrencyCode) -> Result<RateTable> {
            let rate = self.0.ok_or_else(|| anyhow!("offline"))?;
            Ok(RateTable::new(
                base,
                HashMap::from([("EUR".to_string(), rate)]),
            ))
        }
    }

    fn inputs(amount: &str) -> ConversionInputs {
        ConversionInputs {
            amount: amount.to_string(),
            source: CurrencyCode::Usd,
            target: CurrencyCode::Eur,
        }
    }

    #[tokio::test]
    async fn test_run_returns_conversion() {
        let conversion = run(Arc::new(StaticProvider(Some(0.92))), inputs("100"))
            .await
            .unwrap();
        assert!((conversion.converted_amount - 92.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_run_rejects_invalid_amount() {
        let err = run(Arc::new(StaticProvider(Some(0.92))), inputs("dez"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid amount: 'dez'");
    }

    #[tokio::test]
    async fn test_run_reports_fixed_message_on_failure() {
        let err = run(Arc::new(StaticProvider(None)), inputs("1"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), CONVERSION_FAILED_MESSAGE);
    }

    #[test]
    fn test_format_result() {
        let conversion = Conversion {
            request: ConversionRequest {
                amount: 1.0,
                source: CurrencyCode::Brl,
                target: CurrencyCode::Usd,
            },
            rate: 0.2,
            converted_amount: 0.2,
            rates_updated_at: Utc.with_ymd_and_hms(2025, 3, 14, 0, 0, 1).single(),
        };
        let text = format_result(&conversion);
        assert!(text.contains("R$ 1,00 = US$ 0,20"));
        assert!(text.contains("1 BRL = 0.2000 USD"));
        assert!(text.contains("taxas de 14/03/2025 00:00 UTC"));
    }
}
