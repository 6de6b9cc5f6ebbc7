//! Implied probability from outstanding outcome supply.
//!
//! P(yes) = (yes + floor) / (yes + no + 2 * floor) * 100
//!
//! The virtual floor keeps a single early trade from quoting 0% or 100%.
//! Results are percentages scaled by `PERCENT_SCALE`, floored. With a
//! non-zero floor the result is kept strictly inside (0, 100) even where floor
//! rounding would land on an endpoint.

use crate::error::CurveError;
use crate::fixed::{mul_div_floor, shares_to_units};
use crate::storage::FULL_PERCENT;

fn floored_supply(supply: i128, floor_units: i128) -> Result<i128, CurveError> {
    if supply < 0 {
        return Err(CurveError::InvalidSupply);
    }
    supply.checked_add(floor_units).ok_or(CurveError::Overflow)
}

fn share_of_total(adjusted: i128, total: i128, virtual_floor: u64) -> Result<i128, CurveError> {
    if total == 0 {
        return Err(CurveError::DegenerateFloor);
    }
    let percent = mul_div_floor(adjusted, FULL_PERCENT, total)?;
    if virtual_floor == 0 {
        return Ok(percent);
    }
    Ok(percent.clamp(1, FULL_PERCENT - 1))
}

/// Implied YES probability for a binary market.
pub fn implied_probability(
    yes_supply: i128,
    no_supply: i128,
    virtual_floor: u64,
) -> Result<i128, CurveError> {
    let floor_units = shares_to_units(virtual_floor)?;
    let adjusted_yes = floored_supply(yes_supply, floor_units)?;
    let adjusted_no = floored_supply(no_supply, floor_units)?;
    let total = adjusted_yes
        .checked_add(adjusted_no)
        .ok_or(CurveError::Overflow)?;

    share_of_total(adjusted_yes, total, virtual_floor)
}

/// Implied probability of outcome `index` in a market with any number of
/// outcomes, using the same floor for every outcome.
pub fn outcome_probability(
    supplies: &[i128],
    index: usize,
    virtual_floor: u64,
) -> Result<i128, CurveError> {
    let floor_units = shares_to_units(virtual_floor)?;

    let mut total: i128 = 0;
    let mut target = None;
    for (i, supply) in supplies.iter().enumerate() {
        let adjusted = floored_supply(*supply, floor_units)?;
        total = total.checked_add(adjusted).ok_or(CurveError::Overflow)?;
        if i == index {
            target = Some(adjusted);
        }
    }

    let adjusted = target.ok_or(CurveError::InvalidSupply)?;
    share_of_total(adjusted, total, virtual_floor)
}
