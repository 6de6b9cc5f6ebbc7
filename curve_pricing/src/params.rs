use soroban_sdk::contracttype;

use crate::error::CurveError;
use crate::storage::BPS_DENOMINATOR;

/// Per-market curve constants, fixed at market creation.
///
/// Supply-like fields are whole shares; prices are scaled by `PRICE_SCALE`;
/// rates are basis points.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CurveParams {
    /// Effective supply (whole shares) where the curve flattens
    pub phase1_end_supply: u64,
    /// Price at effective supply 0
    pub start_price: i128,
    /// Price at `phase1_end_supply` and beyond
    pub mid_price: i128,
    /// Whole shares added to real supply before evaluating the curve
    pub virtual_anchor: u64,
    /// Whole shares added to every outcome before computing probability
    pub virtual_floor: u64,
    /// Buy fee deducted from each contribution
    pub fee_bps: u32,
    /// Probe offset, in shares per unit of net capital
    pub share_scale: u64,
    /// Haircut applied to computed shares at issuance
    pub redemption_bps: u32,
}

impl CurveParams {
    /// The reference market: 100M-share linear phase from 0.000001 to
    /// 0.000005, 11M anchor, 600k floor, 1% fee, 0.95 redemption.
    pub fn reference() -> Self {
        CurveParams {
            phase1_end_supply: 100_000_000,
            start_price: 1_000_000_000_000,
            mid_price: 5_000_000_000_000,
            virtual_anchor: 11_000_000,
            virtual_floor: 600_000,
            fee_bps: 100,
            share_scale: 500_000,
            redemption_bps: 9_500,
        }
    }

    /// Same curve with a different anchor and floor.
    pub fn with_virtuals(&self, virtual_anchor: u64, virtual_floor: u64) -> Self {
        CurveParams {
            virtual_anchor,
            virtual_floor,
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<(), CurveError> {
        if self.phase1_end_supply == 0 {
            return Err(CurveError::InvalidParams);
        }
        if self.start_price < 0 || self.mid_price < self.start_price {
            return Err(CurveError::InvalidParams);
        }
        if i128::from(self.fee_bps) >= BPS_DENOMINATOR {
            return Err(CurveError::InvalidParams);
        }
        if self.redemption_bps == 0 || i128::from(self.redemption_bps) > BPS_DENOMINATOR {
            return Err(CurveError::InvalidParams);
        }
        Ok(())
    }
}
