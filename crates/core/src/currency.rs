//! Deal-value parsing and display.
//!
//! Deal values arrive as human-entered strings (`"$75,000"`, `"$50M"`, `""`). They are parsed
//! once at the ingestion boundary into a [`DealValue`]; everything downstream works on the
//! tagged value and never re-parses text.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const THOUSAND: i64 = 1_000;
const MILLION: i64 = 1_000_000;

/// A parsed deal value. `Unknown` is distinct from zero: it contributes nothing to a sum and is
/// excluded from averages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<Decimal>", into = "Option<Decimal>")]
pub enum DealValue {
    Known(Decimal),
    #[default]
    Unknown,
}

impl DealValue {
    pub fn parse(raw: &str) -> Self {
        parse_currency(raw).map_or(Self::Unknown, Self::Known)
    }

    pub fn amount(self) -> Option<Decimal> {
        match self {
            Self::Known(amount) => Some(amount),
            Self::Unknown => None,
        }
    }

    /// Value used by sums: `Unknown` counts as zero.
    pub fn or_zero(self) -> Decimal {
        self.amount().unwrap_or(Decimal::ZERO)
    }

    pub fn is_known(self) -> bool {
        matches!(self, Self::Known(_))
    }

    /// Exact amount as written to flat files; empty for `Unknown`.
    pub fn stored(self) -> String {
        self.amount().map(format_amount).unwrap_or_default()
    }
}

impl From<Option<Decimal>> for DealValue {
    fn from(value: Option<Decimal>) -> Self {
        value.map_or(Self::Unknown, Self::Known)
    }
}

impl From<DealValue> for Option<Decimal> {
    fn from(value: DealValue) -> Self {
        value.amount()
    }
}

impl fmt::Display for DealValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(amount) => f.write_str(&format_currency(*amount)),
            Self::Unknown => f.write_str("TBD"),
        }
    }
}

/// Parses `[$]digits[,digits]*[K|M]`. Total over all inputs: anything that does not parse,
/// including empty and whitespace-only input, yields `None`.
pub fn parse_currency(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw.trim().chars().filter(|ch| *ch != '$' && *ch != ',').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }

    let (digits, multiplier) = if let Some(stripped) = cleaned.strip_suffix('K') {
        (stripped, Some(THOUSAND))
    } else if let Some(stripped) = cleaned.strip_suffix('M') {
        (stripped, Some(MILLION))
    } else {
        (cleaned, None)
    };

    let amount = digits.trim().parse::<Decimal>().ok()?;
    match multiplier {
        Some(multiplier) => amount.checked_mul(Decimal::from(multiplier)),
        None => Some(amount),
    }
}

/// Formats an amount as whole currency units with thousands separators, e.g. `$1,250,000`.
pub fn format_currency(amount: Decimal) -> String {
    with_sign(amount.round_dp(0), "")
}

/// Formats an amount without rounding, e.g. `$25,000.50`. [`parse_currency`] reads it back to
/// the same value.
pub fn format_amount(amount: Decimal) -> String {
    let text = amount.abs().to_string();
    match text.split_once('.') {
        Some((_, fraction)) => with_sign(amount, &format!(".{fraction}")),
        None => with_sign(amount, ""),
    }
}

fn with_sign(amount: Decimal, fraction: &str) -> String {
    let grouped = group_thousands(&amount.abs().trunc().to_string());
    if amount.is_sign_negative() && !amount.is_zero() {
        format!("-${grouped}{fraction}")
    } else {
        format!("${grouped}{fraction}")
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{format_amount, format_currency, parse_currency, DealValue};

    #[test]
    fn parses_plain_and_comma_grouped_amounts() {
        assert_eq!(parse_currency("$75,000"), Some(Decimal::from(75_000)));
        assert_eq!(parse_currency("1,250,000"), Some(Decimal::from(1_250_000)));
        assert_eq!(parse_currency("$25000.50"), Some(Decimal::new(2_500_050, 2)));
    }

    #[test]
    fn applies_thousand_and_million_suffixes() {
        assert_eq!(parse_currency("$50M"), Some(Decimal::from(50_000_000)));
        assert_eq!(parse_currency("$100K"), Some(Decimal::from(100_000)));
        assert_eq!(parse_currency("$1.5M"), Some(Decimal::from(1_500_000)));
    }

    #[test]
    fn empty_and_garbage_inputs_are_missing() {
        for raw in ["", "   ", "$", "garbage", "K", "$100K-$500K", "1.2B", "$$", "12MM"] {
            assert_eq!(parse_currency(raw), None, "`{raw}` should not parse");
        }
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        assert_eq!(parse_currency("  $75,000 "), Some(Decimal::from(75_000)));
    }

    #[test]
    fn overflowing_amounts_are_missing_instead_of_panicking() {
        assert_eq!(parse_currency("79228162514264337593543950335M"), None);
        assert_eq!(parse_currency("999999999999999999999999999999999999"), None);
    }

    #[test]
    fn deal_value_keeps_unknown_distinct_from_zero() {
        assert_eq!(DealValue::parse(""), DealValue::Unknown);
        assert_eq!(DealValue::parse("$0"), DealValue::Known(Decimal::ZERO));
        assert_eq!(DealValue::Unknown.or_zero(), Decimal::ZERO);
        assert!(!DealValue::Unknown.is_known());
    }

    #[test]
    fn formats_whole_units_with_separators() {
        assert_eq!(format_currency(Decimal::from(75_000)), "$75,000");
        assert_eq!(format_currency(Decimal::from(50_000_000)), "$50,000,000");
        assert_eq!(format_currency(Decimal::from(950)), "$950");
        assert_eq!(format_currency(Decimal::new(525_000, 1)), "$52,500");
        assert_eq!(format_currency(Decimal::from(-1_500)), "-$1,500");
        assert_eq!(DealValue::Known(Decimal::from(200_000)).to_string(), "$200,000");
    }

    #[test]
    fn stored_amounts_keep_cents() {
        let amount = Decimal::new(2_500_050, 2);
        assert_eq!(format_amount(amount), "$25,000.50");
        assert_eq!(parse_currency(&format_amount(amount)), Some(amount));
        assert_eq!(format_amount(Decimal::from(75_000)), "$75,000");
        assert_eq!(format_amount(Decimal::new(-1_234_567, 3)), "-$1,234.567");
        assert_eq!(DealValue::Known(amount).stored(), "$25,000.50");
        assert_eq!(DealValue::Unknown.stored(), "");
    }
}
