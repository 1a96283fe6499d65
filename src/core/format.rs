//! pt-BR currency formatting

use super::currency::CurrencyCode;

/// Formats `value` the way a pt-BR locale displays money: symbol, a space,
/// `.` as thousands separator and `,` before the fraction.
pub fn format_currency(value: f64, currency: CurrencyCode) -> String {
    if value.is_nan() {
        return format!("{} NaN", currency.symbol());
    }
    if value.is_infinite() {
        let sign = if value < 0.0 { "-" } else { "" };
        return format!("{sign}{} ∞", currency.symbol());
    }

    let digits = currency.fraction_digits();
    let fixed = format!("{:.*}", digits, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut number = group_thousands(int_part);
    if let Some(frac) = frac_part {
        number.push(',');
        number.push_str(frac);
    }

    // -0,00 is shown as 0,00
    let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };

    format!("{sign}{} {number}", currency.symbol())
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}
