//! Fixed-point helpers shared by every pricing computation.
//!
//! Values are `i128` mantissas at the scales defined in `storage`.
//! Rounding rule: every division truncates toward zero. All operands in the
//! kernel are non-negative, so this is floor rounding, identical to native
//! integer division in the settlement program.

use crate::error::CurveError;
use crate::storage::{BPS_DENOMINATOR, SHARE_UNIT};

/// `a * b / c`, floored, with overflow and division-by-zero reported as errors.
pub fn mul_div_floor(a: i128, b: i128, c: i128) -> Result<i128, CurveError> {
    a.checked_mul(b)
        .ok_or(CurveError::Overflow)?
        .checked_div(c)
        .ok_or(CurveError::Overflow)
}

/// Portion of `amount` represented by `bps` basis points, floored.
pub fn apply_bps(amount: i128, bps: u32) -> Result<i128, CurveError> {
    mul_div_floor(amount, i128::from(bps), BPS_DENOMINATOR)
}

/// Convert a whole-share count into share base units.
pub fn shares_to_units(whole_shares: u64) -> Result<i128, CurveError> {
    i128::from(whole_shares)
        .checked_mul(SHARE_UNIT)
        .ok_or(CurveError::Overflow)
}
