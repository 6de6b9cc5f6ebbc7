//! Two-phase bonding curve.
//!
//! Phase 1 interpolates linearly from `start_price` at effective supply 0 to
//! `mid_price` at `phase1_end_supply`. Phase 2 is flat at `mid_price`.
//!
//! Effective supply = outstanding supply + `virtual_anchor`, so a fresh market
//! already sits part-way up the curve.
//!
//! Supplies are in share base units (`SHARE_UNIT`), prices in `PRICE_SCALE`.

use crate::error::CurveError;
use crate::fixed::{mul_div_floor, shares_to_units};
use crate::params::CurveParams;
use crate::storage::PRICE_SCALE;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CurvePhase {
    /// Effective supply at or below `phase1_end_supply`
    Linear,
    /// Effective supply above `phase1_end_supply`
    Flat,
}

/// Outstanding supply shifted by the virtual anchor.
pub fn effective_supply(outcome_supply: i128, params: &CurveParams) -> Result<i128, CurveError> {
    if outcome_supply < 0 {
        return Err(CurveError::InvalidSupply);
    }
    outcome_supply
        .checked_add(shares_to_units(params.virtual_anchor)?)
        .ok_or(CurveError::Overflow)
}

pub fn phase(outcome_supply: i128, params: &CurveParams) -> Result<CurvePhase, CurveError> {
    let effective = effective_supply(outcome_supply, params)?;
    if effective <= shares_to_units(params.phase1_end_supply)? {
        Ok(CurvePhase::Linear)
    } else {
        Ok(CurvePhase::Flat)
    }
}

/// Spot price for one outcome at the given outstanding supply.
pub fn spot_price(outcome_supply: i128, params: &CurveParams) -> Result<i128, CurveError> {
    if params.phase1_end_supply == 0 {
        return Err(CurveError::InvalidParams);
    }

    let effective = effective_supply(outcome_supply, params)?;
    let phase1_end = shares_to_units(params.phase1_end_supply)?;

    if effective > phase1_end {
        return Ok(params.mid_price);
    }

    // price = start + (mid - start) * effective / phase1_end
    let span = params
        .mid_price
        .checked_sub(params.start_price)
        .ok_or(CurveError::Overflow)?;
    let delta = mul_div_floor(span, effective, phase1_end)?;

    params
        .start_price
        .checked_add(delta)
        .ok_or(CurveError::Overflow)
}

/// Market capitalization in capital base units: spot price times effective
/// supply. At zero outstanding supply this is `spot_price(0) * virtual_anchor`.
pub fn market_cap(outcome_supply: i128, params: &CurveParams) -> Result<i128, CurveError> {
    let price = spot_price(outcome_supply, params)?;
    let effective = effective_supply(outcome_supply, params)?;
    mul_div_floor(price, effective, PRICE_SCALE)
}
