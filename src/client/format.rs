//! Display strings for the coin table.

use rust_decimal::{Decimal, RoundingStrategy};

const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
}

/// USD price; sub-cent prices keep up to 8 fraction digits.
pub fn format_price(price: Option<Decimal>) -> String {
    let Some(price) = price else {
        return NOT_AVAILABLE.to_string();
    };

    let max_fraction = if price > Decimal::ZERO && price < Decimal::new(1, 2) {
        8
    } else {
        2
    };

    format_usd(price, 2, max_fraction)
}

pub fn format_market_cap(market_cap: Option<Decimal>) -> String {
    match market_cap {
        Some(value) => format_usd(value, 0, 0),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Absent changes read as 0.00%.
pub fn format_percent(change: Option<Decimal>) -> String {
    let change = change
        .unwrap_or(Decimal::ZERO)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}%", change)
}

pub fn trend(change: Option<Decimal>) -> Trend {
    if change.unwrap_or(Decimal::ZERO) >= Decimal::ZERO {
        Trend::Up
    } else {
        Trend::Down
    }
}

pub fn format_rank(rank: Option<u32>) -> String {
    rank.map(|r| r.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn display_name(name: Option<&str>) -> &str {
    name.unwrap_or("Unknown Coin")
}

pub fn display_symbol(symbol: Option<&str>) -> String {
    symbol
        .map(str::to_uppercase)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn format_usd(value: Decimal, min_fraction: u32, max_fraction: u32) -> String {
    let rounded = value.round_dp_with_strategy(max_fraction, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    let digits = rounded.abs().to_string();
    let (integer, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), ""));

    let mut fraction = fraction.trim_end_matches('0').to_string();
    while fraction.len() < min_fraction as usize {
        fraction.push('0');
    }

    let integer = group_thousands(integer);
    if fraction.is_empty() {
        format!("{}${}", sign, integer)
    } else {
        format!("{}${}.{}", sign, integer, fraction)
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
