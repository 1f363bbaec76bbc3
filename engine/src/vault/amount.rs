//! # Fixed-Point Amounts
//!
//! Users type decimals ("50", "12.5", "0.000001"); the engine only ever sees
//! `u64` micro-units. This module is the one place that crosses between the
//! two. Parsing is strict: anything that isn't a plain non-negative decimal
//! with at most [`AMOUNT_DECIMALS`] fractional digits is an
//! [`VaultError::InvalidAmount`], which is also how negative input gets
//! rejected (the type can't hold it).

use crate::config::{AMOUNT_DECIMALS, MICROS_PER_UNIT};

use super::error::VaultError;

/// Converts whole units to micro-units. Handy for constants and tests.
pub const fn units(whole: u64) -> u64 {
    whole * MICROS_PER_UNIT
}

/// Parses a user-entered decimal string into micro-units.
///
/// Accepts `"50"`, `"50.5"` and `".5"`. Separators, signs and exponents are
/// rejected. Zero parses fine; rejecting it is the reducer's job.
///
/// # Errors
///
/// Returns [`VaultError::InvalidAmount`] for empty, negative, malformed, or
/// over-precise input, and [`VaultError::Overflow`] when the value does not
/// fit in a `u64` of micro-units.
pub fn parse_amount(input: &str) -> Result<u64, VaultError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(VaultError::InvalidAmount("amount is empty".into()));
    }
    if s.starts_with('-') {
        return Err(VaultError::InvalidAmount(format!(
            "amount must be positive, got {s}"
        )));
    }

    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return Err(VaultError::InvalidAmount(format!("not a number: {s}")));
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(VaultError::InvalidAmount(format!("not a number: {s}")));
    }
    if frac.len() > AMOUNT_DECIMALS as usize {
        return Err(VaultError::InvalidAmount(format!(
            "at most {AMOUNT_DECIMALS} decimal places allowed, got {s}"
        )));
    }

    let whole_value: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| VaultError::Overflow("amount"))?
    };

    let mut frac_value: u64 = 0;
    for digit in frac.bytes() {
        frac_value = frac_value * 10 + u64::from(digit - b'0');
    }
    frac_value *= 10u64.pow(AMOUNT_DECIMALS - frac.len() as u32);

    whole_value
        .checked_mul(MICROS_PER_UNIT)
        .and_then(|w| w.checked_add(frac_value))
        .ok_or(VaultError::Overflow("amount"))
}

/// Formats micro-units as a USDC string with at least two decimals.
///
/// `145_500_000` renders as `"145.50"`, `1_234_567` as `"1.234567"`.
pub fn format_amount(micros: u64) -> String {
    format_fixed(micros, 2)
}

/// Formats micro-points without forcing decimals: `30.0` renders as `"30"`.
pub fn format_points(micros: u64) -> String {
    format_fixed(micros, 0)
}

/// Formats a basis-point rate as a percentage, e.g. `620` as `"6.2"`.
pub fn format_bps_percent(bps: u32) -> String {
    let whole = bps / 100;
    let frac = bps % 100;
    match frac {
        0 => format!("{whole}.0"),
        f if f % 10 == 0 => format!("{whole}.{}", f / 10),
        f => format!("{whole}.{f:02}"),
    }
}

fn format_fixed(micros: u64, min_decimals: usize) -> String {
    let whole = micros / MICROS_PER_UNIT;
    let frac = micros % MICROS_PER_UNIT;
    let digits = format!("{:0width$}", frac, width = AMOUNT_DECIMALS as usize);
    let trimmed = digits.trim_end_matches('0');
    let shown = if trimmed.len() < min_decimals {
        &digits[..min_decimals]
    } else {
        trimmed
    };
    if shown.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{shown}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_whole_and_fractional() {
        assert_eq!(parse_amount("50").unwrap(), units(50));
        assert_eq!(parse_amount("145.50").unwrap(), 145_500_000);
        assert_eq!(parse_amount(".5").unwrap(), 500_000);
        assert_eq!(parse_amount("0.000001").unwrap(), 1);
        assert_eq!(parse_amount("  10  ").unwrap(), units(10));
    }

    #[test]
    fn parse_zero_is_allowed() {
        assert_eq!(parse_amount("0").unwrap(), 0);
        assert_eq!(parse_amount("0.00").unwrap(), 0);
    }

    #[test]
    fn parse_negative_rejected() {
        assert!(matches!(
            parse_amount("-5"),
            Err(VaultError::InvalidAmount(_))
        ));
    }

    #[test]
    fn parse_garbage_rejected() {
        for bad in ["", "abc", ".", "1.2.3", "1e5", "+5", "NaN", "1,000"] {
            assert!(
                matches!(parse_amount(bad), Err(VaultError::InvalidAmount(_))),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn parse_too_precise_rejected() {
        assert!(matches!(
            parse_amount("1.0000001"),
            Err(VaultError::InvalidAmount(_))
        ));
    }

    #[test]
    fn parse_overflow_reported() {
        assert!(matches!(
            parse_amount("99999999999999999999"),
            Err(VaultError::Overflow(_))
        ));
        assert!(matches!(
            parse_amount("18446744073709551615"),
            Err(VaultError::Overflow(_))
        ));
    }

    #[test]
    fn format_keeps_two_decimals_minimum() {
        assert_eq!(format_amount(0), "0.00");
        assert_eq!(format_amount(units(600)), "600.00");
        assert_eq!(format_amount(145_500_000), "145.50");
        assert_eq!(format_amount(1_234_567), "1.234567");
    }

    #[test]
    fn format_points_trims() {
        assert_eq!(format_points(units(30)), "30");
        assert_eq!(format_points(1_500_000), "1.5");
        assert_eq!(format_points(0), "0");
    }

    #[test]
    fn format_rates() {
        assert_eq!(format_bps_percent(450), "4.5");
        assert_eq!(format_bps_percent(620), "6.2");
        assert_eq!(format_bps_percent(1_200), "12.0");
        assert_eq!(format_bps_percent(1_234), "12.34");
    }
}
