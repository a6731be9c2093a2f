use alloy_primitives::U256;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::Holding;

/// Fractional digits shown for token amounts.
pub const DEFAULT_AMOUNT_DECIMALS: u32 = 6;

/// Scale a raw on-chain integer by `decimals` and render it with exactly
/// `display_decimals` fractional digits, truncating (never rounding) the rest.
///
/// Works on the decimal string of the full 256-bit value, so no precision is
/// lost before truncation.
pub fn format_units(raw: U256, decimals: u8, display_decimals: u32) -> String {
    let digits = raw.to_string();
    let decimals = decimals as usize;

    let (int_part, frac_part) = if digits.len() > decimals {
        let split = digits.len() - decimals;
        (digits[..split].to_string(), digits[split..].to_string())
    } else {
        ("0".to_string(), format!("{digits:0>decimals$}"))
    };

    pad_fraction_to_dp(&int_part, &frac_part, display_decimals)
}

fn pad_fraction_to_dp(int_part: &str, frac_part: &str, dp: u32) -> String {
    if dp == 0 {
        return int_part.to_string();
    }

    let mut out = String::with_capacity(int_part.len() + 1 + dp as usize);
    out.push_str(int_part);
    out.push('.');

    let mut written = 0usize;
    for ch in frac_part.chars().take(dp as usize) {
        out.push(ch);
        written += 1;
    }
    while written < dp as usize {
        out.push('0');
        written += 1;
    }

    out
}

/// Numeric value of a string produced by [`format_units`].
pub fn amount_value(formatted: &str) -> f64 {
    formatted.parse::<f64>().unwrap_or(0.0)
}

fn group_int_digits(int_part: &str) -> String {
    // Insert commas every 3 digits.
    let mut out = String::with_capacity(int_part.len() + int_part.len() / 3);
    let len = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        out.push(ch);
        let remaining = len.saturating_sub(i + 1);
        if remaining > 0 && remaining % 3 == 0 {
            out.push(',');
        }
    }
    out
}

/// Render a USD value with two decimals, optional symbol and thousands
/// separators, e.g. `$1,234.50`.
pub fn format_usd(value: f64, symbol: Option<&str>, grouping: bool) -> String {
    let value = Decimal::from_f64_retain(value).unwrap_or(Decimal::ZERO);
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let s = rounded.abs().normalize().to_string();
    let (int_part, frac_part) = s.split_once('.').unwrap_or((s.as_str(), ""));

    let int_part = if grouping {
        group_int_digits(int_part)
    } else {
        int_part.to_string()
    };

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    if let Some(sym) = symbol {
        out.push_str(sym);
    }
    out.push_str(&pad_fraction_to_dp(&int_part, frac_part, 2));
    out
}

/// The value cell of a holding row as the dashboard shows it.
pub fn holding_value_display(holding: &Holding, symbol: Option<&str>, grouping: bool) -> String {
    if holding.is_price_loading {
        "Loading...".to_string()
    } else if holding.price_unavailable {
        "unavailable".to_string()
    } else {
        format_usd(holding.usd_value, symbol, grouping)
    }
}
