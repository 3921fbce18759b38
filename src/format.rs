//! Human-readable rendering of converted values

use crate::asset::AssetClass;

pub fn currency_symbol(code: &str) -> Option<&'static str> {
    match code {
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "INR" => Some("₹"),
        "JPY" => Some("¥"),
        _ => None,
    }
}

/// Renders a value with a fixed number of decimals and thousands separators,
/// e.g. `1234567.891` with 2 decimals becomes `1,234,567.89`.
pub fn number_format(value: f64, decimals: usize) -> String {
    let formatted = format!("{value:.decimals$}");
    let (raw_int, frac) = match formatted.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (formatted.as_str(), None),
    };
    let (sign, digits) = match raw_int.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw_int),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match frac {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Builds the per-target equivalence string, e.g.
/// `$100.00 ≈ 0.00153846 BTC` or `₹8,500.00 ≈ 1.57 grams GOLD`.
pub fn equivalence(
    source_value: f64,
    source_asset: &str,
    target_value: f64,
    target_asset: &str,
    target_class: AssetClass,
) -> String {
    let source_label = currency_symbol(source_asset).unwrap_or(source_asset);
    let source = format!("{source_label}{}", number_format(source_value, 2));

    match target_class {
        AssetClass::Crypto => {
            format!("{source} ≈ {} {target_asset}", number_format(target_value, 8))
        }
        AssetClass::Metal => {
            format!(
                "{source} ≈ {} grams {target_asset}",
                number_format(target_value, 2)
            )
        }
        AssetClass::Vehicle => {
            format!("{source} ≈ {} {target_asset}", number_format(target_value, 2))
        }
        AssetClass::Fiat | AssetClass::Equity => {
            let target_label = currency_symbol(target_asset).unwrap_or(target_asset);
            format!("{source} ≈ {} {target_label}", number_format(target_value, 2))
        }
    }
}
