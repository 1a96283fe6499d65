pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use crate::core::{ConversionInputs, CurrencyCode, RateProvider};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// Converts once; unset fields fall back to the configured defaults.
    Convert {
        amount: Option<String>,
        from: Option<CurrencyCode>,
        to: Option<CurrencyCode>,
    },
    Interactive,
    Currencies,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Currency converter starting...");

    match command {
        AppCommand::Currencies => {
            cli::currencies::run();
            Ok(())
        }
        AppCommand::Convert { amount, from, to } => {
            let (provider, defaults) = load_provider(config_path)?;
            let inputs = ConversionInputs {
                amount: amount.unwrap_or(defaults.amount),
                source: from.unwrap_or(defaults.source),
                target: to.unwrap_or(defaults.target),
            };
            cli::convert::run(provider, inputs).await.map(|_| ())
        }
        AppCommand::Interactive => {
            let (provider, defaults) = load_provider(config_path)?;
            cli::interactive::run(provider, defaults).await
        }
    }
}

/// Reads the config and builds the rate provider plus the starting inputs.
fn load_provider(config_path: Option<&str>) -> Result<(Arc<dyn RateProvider>, ConversionInputs)> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let provider: Arc<dyn RateProvider> = Arc::new(
        providers::exchange_rate_api::ExchangeRateApiProvider::from_config(&config.provider)?,
    );
    Ok((provider, config.defaults.inputs()))
}
