//! Parsing of the display strings delivery sites put on product cards.

use std::str::FromStr;
use std::sync::LazyLock;

use bestdeal_core::UNKNOWN_ETA_MINUTES;
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

static DISCOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+(?:\.\d+)?)\s*%").expect("valid discount regex"));

static ETA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(minutes|minute|mins|min|hours|hour|hrs|hr)\b")
        .expect("valid eta regex")
});

const CURRENCY_PREFIXES: [&str; 3] = ["inr", "rs.", "rs"];

/// Parses a displayed price such as `"₹1,234.50"`, `"Rs. 45"` or `"$3"`.
///
/// Currency markers and thousands separators are removed and the rest must
/// be a single decimal numeral. Empty, unparseable or negative input
/// yields `None`, never zero.
#[must_use]
pub(crate) fn parse_price(raw: &str) -> Option<Decimal> {
    let cleaned = raw
        .chars()
        .filter(|c| !matches!(c, '₹' | '$' | ','))
        .collect::<String>()
        .trim()
        .to_ascii_lowercase();

    let numeral = CURRENCY_PREFIXES
        .iter()
        .find_map(|prefix| cleaned.strip_prefix(prefix))
        .unwrap_or(&cleaned)
        .trim();

    if numeral.is_empty() {
        return None;
    }
    let value = Decimal::from_str(numeral).ok()?;
    (!value.is_sign_negative()).then_some(value)
}

/// Parses a leading percentage such as `"20% OFF"` or `"12.5 %"`.
///
/// Values outside `0..=100` and text without a leading number followed by
/// `%` yield `None`; nothing is clamped.
#[must_use]
pub(crate) fn parse_discount(raw: &str) -> Option<Decimal> {
    let caps = DISCOUNT_RE.captures(raw)?;
    let value = Decimal::from_str(caps.get(1)?.as_str()).ok()?;
    (value <= Decimal::ONE_HUNDRED).then_some(value)
}

/// Parses delivery time text such as `"12 mins"`, `"1 hour"` or
/// `"1.5 hours"` into whole minutes, rounding half away from zero.
///
/// Anything unparseable, including empty text, yields
/// [`UNKNOWN_ETA_MINUTES`] so that unknown ETAs sort last.
#[must_use]
pub(crate) fn parse_eta_minutes(raw: &str) -> u32 {
    let Some(caps) = ETA_RE.captures(raw) else {
        return UNKNOWN_ETA_MINUTES;
    };
    let (Some(number), Some(unit)) = (caps.get(1), caps.get(2)) else {
        return UNKNOWN_ETA_MINUTES;
    };
    let Ok(value) = Decimal::from_str(number.as_str()) else {
        return UNKNOWN_ETA_MINUTES;
    };

    let minutes = if unit.as_str().to_ascii_lowercase().starts_with('h') {
        value.checked_mul(Decimal::from(60))
    } else {
        Some(value)
    };
    minutes
        .map(|m| m.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|m| m.to_u32())
        .unwrap_or(UNKNOWN_ETA_MINUTES)
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
