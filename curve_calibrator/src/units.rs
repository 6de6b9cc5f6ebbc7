//! Conversions between human-facing decimals and kernel fixed-point values.
//!
//! Floats only ever describe targets and reports. Every quantity that reaches
//! the kernel is rounded to its integer scale here, once.

use curve_pricing::storage::{
    BPS_DENOMINATOR, CAPITAL_UNIT, PERCENT_SCALE, PRICE_SCALE, SHARE_UNIT,
};
use tracing::warn;

use crate::error::{CalibrationError, Result};

fn to_scaled(value: f64, scale: i128, what: &str) -> Result<i128> {
    if !value.is_finite() || value < 0.0 {
        return Err(CalibrationError::InvalidConfig(format!(
            "{} must be a finite non-negative number, got {}",
            what, value
        )));
    }
    let scaled = (value * scale as f64).round();
    if scaled >= i128::MAX as f64 {
        return Err(CalibrationError::InvalidConfig(format!("{} is too large: {}", what, value)));
    }
    Ok(scaled as i128)
}

/// Capital units (e.g. 1.5) to capital base units.
pub fn capital_to_units(amount: f64) -> Result<i128> {
    to_scaled(amount, CAPITAL_UNIT, "capital amount")
}

pub fn units_to_capital(units: i128) -> f64 {
    units as f64 / CAPITAL_UNIT as f64
}

/// Whole shares (possibly fractional) to share base units.
pub fn shares_to_units(shares: f64) -> Result<i128> {
    to_scaled(shares, SHARE_UNIT, "share supply")
}

pub fn units_to_shares(units: i128) -> f64 {
    units as f64 / SHARE_UNIT as f64
}

/// Price in capital per share to `PRICE_SCALE`.
pub fn price_to_scaled(price: f64) -> Result<i128> {
    to_scaled(price, PRICE_SCALE, "price")
}

pub fn scaled_to_price(scaled: i128) -> f64 {
    scaled as f64 / PRICE_SCALE as f64
}

/// Fractional rate (0.01 = 1%) to basis points.
pub fn rate_to_bps(rate: f64, what: &str) -> Result<u32> {
    let bps = to_scaled(rate, BPS_DENOMINATOR, what)?;
    if bps > i128::from(u32::MAX) {
        return Err(CalibrationError::InvalidConfig(format!("{} is too large: {}", what, rate)));
    }
    let exact = rate * BPS_DENOMINATOR as f64;
    if (exact - bps as f64).abs() > 1e-6 {
        warn!(
            "{} = {} is not a whole number of basis points; using {} bps",
            what, rate, bps
        );
    }
    Ok(bps as u32)
}

pub fn bps_to_rate(bps: u32) -> f64 {
    f64::from(bps) / BPS_DENOMINATOR as f64
}

/// Kernel percent (`PERCENT_SCALE`) to a plain percentage.
pub fn scaled_to_percent(scaled: i128) -> f64 {
    scaled as f64 / PERCENT_SCALE as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capital_round_trip_for_reference_amounts() {
        assert_eq!(capital_to_units(1.0).unwrap(), 1_000_000_000);
        assert_eq!(capital_to_units(0.99).unwrap(), 990_000_000);
        assert_eq!(units_to_capital(14_000_000_000), 14.0);
    }

    #[test]
    fn test_prices_land_on_exact_mantissas() {
        assert_eq!(price_to_scaled(0.000001).unwrap(), 1_000_000_000_000);
        assert_eq!(price_to_scaled(0.000005).unwrap(), 5_000_000_000_000);
        assert!((scaled_to_price(1_459_800_000_000) - 0.0000014598).abs() < 1e-15);
    }

    #[test]
    fn test_rates_to_bps() {
        assert_eq!(rate_to_bps(0.01, "fee").unwrap(), 100);
        assert_eq!(rate_to_bps(0.95, "redemption").unwrap(), 9_500);
        assert_eq!(rate_to_bps(0.0, "fee").unwrap(), 0);
        // Rounded to the nearest basis point
        assert_eq!(rate_to_bps(0.012345, "fee").unwrap(), 123);
        assert_eq!(bps_to_rate(9_500), 0.95);
    }

    #[test]
    fn test_rejects_negative_and_non_finite() {
        assert!(capital_to_units(-1.0).is_err());
        assert!(price_to_scaled(f64::NAN).is_err());
        assert!(shares_to_units(f64::INFINITY).is_err());
    }

    #[test]
    fn test_percent() {
        assert_eq!(scaled_to_percent(500_000_000), 50.0);
    }
}
