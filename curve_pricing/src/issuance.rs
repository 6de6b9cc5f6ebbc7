//! Share issuance for a capital contribution.
//!
//! 1. fee = contribution * fee_bps / 10_000, net = contribution - fee
//! 2. avg_price = spot_price(current_supply + net * share_scale)
//! 3. shares = (net / avg_price) * redemption_bps / 10_000
//!
//! Step 2 probes the curve at a single shifted point instead of integrating
//! between the pre- and post-trade supply. The settlement program uses the
//! same approximation, so it must be kept as is.

use soroban_sdk::contracttype;

use crate::curve::spot_price;
use crate::error::CurveError;
use crate::fixed::{apply_bps, mul_div_floor};
use crate::params::CurveParams;
use crate::storage::{BPS_DENOMINATOR, PRICE_SCALE};

/// Full receipt for a buy. Capital in capital base units, supplies and shares
/// in share base units, prices in `PRICE_SCALE`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ShareQuote {
    pub fee: i128,
    pub net: i128,
    pub probe_supply: i128,
    pub avg_price: i128,
    pub shares: i128,
    /// Spot price before the buy
    pub start_price: i128,
    /// Spot price once `shares` are added to supply
    pub end_price: i128,
    pub price_impact_bps: i128,
}

/// Split a contribution into (fee, net). `fee + net == contribution` exactly.
pub fn split_fee(contribution: i128, fee_bps: u32) -> Result<(i128, i128), CurveError> {
    if contribution <= 0 {
        return Err(CurveError::InvalidContribution);
    }
    let fee = apply_bps(contribution, fee_bps)?;
    let net = contribution.checked_sub(fee).ok_or(CurveError::Overflow)?;
    Ok((fee, net))
}

/// Quote a buy of `contribution` against `current_supply` of one outcome.
pub fn quote_buy(
    contribution: i128,
    current_supply: i128,
    params: &CurveParams,
) -> Result<ShareQuote, CurveError> {
    if current_supply < 0 {
        return Err(CurveError::InvalidSupply);
    }
    let (fee, net) = split_fee(contribution, params.fee_bps)?;

    let offset = net
        .checked_mul(i128::from(params.share_scale))
        .ok_or(CurveError::Overflow)?;
    let probe_supply = current_supply
        .checked_add(offset)
        .ok_or(CurveError::Overflow)?;

    let avg_price = spot_price(probe_supply, params)?;
    if avg_price <= 0 {
        return Err(CurveError::DegenerateCurve);
    }

    let gross = mul_div_floor(net, PRICE_SCALE, avg_price)?;
    let shares = apply_bps(gross, params.redemption_bps)?;

    let start_price = spot_price(current_supply, params)?;
    let end_price = spot_price(
        current_supply.checked_add(shares).ok_or(CurveError::Overflow)?,
        params,
    )?;
    let price_impact_bps = if start_price > 0 {
        mul_div_floor(end_price - start_price, BPS_DENOMINATOR, start_price)?
    } else {
        0
    };

    Ok(ShareQuote {
        fee,
        net,
        probe_supply,
        avg_price,
        shares,
        start_price,
        end_price,
        price_impact_bps,
    })
}

/// Shares issued for `contribution` at `current_supply`.
pub fn quote_shares(
    contribution: i128,
    current_supply: i128,
    params: &CurveParams,
) -> Result<i128, CurveError> {
    Ok(quote_buy(contribution, current_supply, params)?.shares)
}

/// Reject a quote that issues fewer than `min_shares_out`.
pub fn ensure_min_shares(quote: &ShareQuote, min_shares_out: i128) -> Result<(), CurveError> {
    if quote.shares < min_shares_out {
        return Err(CurveError::SlippageExceeded);
    }
    Ok(())
}
