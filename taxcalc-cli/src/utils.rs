use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;

use taxcalc_core::calculations::common::round_half_up;

/// Error returned when a string cannot be parsed as a currency amount.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseCurrencyError {
    #[error("amount is empty")]
    Empty,

    #[error("invalid amount '{0}': expected digits with optional '$', thousands commas and decimal point")]
    Malformed(String),

    #[error("invalid amount '{input}': {reason}")]
    OutOfRange { input: String, reason: String },
}

// Either properly grouped thousands or a plain digit run.
static CURRENCY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?\$?(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?$|^-?\$?\.\d+$")
        .expect("currency pattern is valid")
});

/// Parses user-entered currency text into a [`Decimal`].
///
/// Accepts an optional leading `-`, an optional `$`, comma thousands
/// separators (`"$50,000.00"`, `"1,234.5"`, `"50000"`). Surrounding
/// whitespace is ignored.
pub fn parse_currency(s: &str) -> Result<Decimal, ParseCurrencyError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(ParseCurrencyError::Empty);
    }
    if !CURRENCY.is_match(trimmed) {
        tracing::error!(input = %s, "invalid currency amount");
        return Err(ParseCurrencyError::Malformed(s.to_string()));
    }

    let normalized: String = trimmed.chars().filter(|c| *c != '$' && *c != ',').collect();
    normalized
        .parse()
        .map_err(|e: rust_decimal::Error| ParseCurrencyError::OutOfRange {
            input: s.to_string(),
            reason: e.to_string(),
        })
}

/// Formats an amount as dollars with thousands separators, rounded half-up
/// to cents: `6307.5` → `"$6,307.50"`.
pub fn format_money(amount: Decimal) -> String {
    let rounded = round_half_up(amount);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{sign}${grouped}.{cents}")
}

/// Formats a fractional rate as a percentage with two decimals, using "—"
/// when `None`: `0.12615` → `"12.62%"`.
pub fn format_rate(rate: Option<Decimal>) -> String {
    rate.map(|r| format!("{:.2}%", round_half_up(r * Decimal::ONE_HUNDRED)))
        .unwrap_or_else(|| "—".to_string())
}

/// Formats an optional amount, using "—" when `None`.
pub fn format_optional_money(amount: Option<Decimal>) -> String {
    amount.map(format_money).unwrap_or_else(|| "—".to_string())
}
