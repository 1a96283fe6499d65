//! Supported currencies and their display metadata

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyCode {
    Usd,
    Eur,
    Brl,
    Gbp,
    Jpy,
    Aud,
    Cad,
    Chf,
    Cny,
    Ars,
}

impl CurrencyCode {
    /// Every supported currency, in the order they are offered to the user.
    pub const ALL: [CurrencyCode; 10] = [
        CurrencyCode::Usd,
        CurrencyCode::Eur,
        CurrencyCode::Brl,
        CurrencyCode::Gbp,
        CurrencyCode::Jpy,
        CurrencyCode::Aud,
        CurrencyCode::Cad,
        CurrencyCode::Chf,
        CurrencyCode::Cny,
        CurrencyCode::Ars,
    ];

    /// ISO 4217 code, as used by the rate API.
    pub fn code(&self) -> &'static str {
        match self {
            CurrencyCode::Usd => "USD",
            CurrencyCode::Eur => "EUR",
            CurrencyCode::Brl => "BRL",
            CurrencyCode::Gbp => "GBP",
            CurrencyCode::Jpy => "JPY",
            CurrencyCode::Aud => "AUD",
            CurrencyCode::Cad => "CAD",
            CurrencyCode::Chf => "CHF",
            CurrencyCode::Cny => "CNY",
            CurrencyCode::Ars => "ARS",
        }
    }

    /// Human readable name shown next to the code.
    pub fn display_name(&self) -> &'static str {
        match self {
            CurrencyCode::Usd => "Dólar Americano",
            CurrencyCode::Eur => "Euro",
            CurrencyCode::Brl => "Real Brasileiro",
            CurrencyCode::Gbp => "Libra Esterlina",
            CurrencyCode::Jpy => "Iene Japonês",
            CurrencyCode::Aud => "Dólar Australiano",
            CurrencyCode::Cad => "Dólar Canadense",
            CurrencyCode::Chf => "Franco Suíço",
            CurrencyCode::Cny => "Yuan Chinês",
            CurrencyCode::Ars => "Peso Argentino",
        }
    }

    /// Symbol used by the pt-BR currency format.
    pub fn symbol(&self) -> &'static str {
        match self {
            CurrencyCode::Usd => "US$",
            CurrencyCode::Eur => "€",
            CurrencyCode::Brl => "R$",
            CurrencyCode::Gbp => "£",
            CurrencyCode::Jpy => "JP¥",
            CurrencyCode::Aud => "AU$",
            CurrencyCode::Cad => "CA$",
            CurrencyCode::Chf => "CHF",
            CurrencyCode::Cny => "CN¥",
            CurrencyCode::Ars => "ARS",
        }
    }

    pub fn fraction_digits(&self) -> usize {
        match self {
            CurrencyCode::Jpy => 0,
            _ => 2,
        }
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for CurrencyCode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        CurrencyCode::ALL
            .into_iter()
            .find(|c| c.code() == wanted)
            .ok_or_else(|| anyhow!("Unsupported currency: {}", s))
    }
}
