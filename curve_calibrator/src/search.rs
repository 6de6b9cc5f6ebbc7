//! Brute-force search for `(virtual_anchor, virtual_floor)` pairs.
//!
//! Every pair is pushed through the same fixed-point kernel the settlement
//! program uses: initial market cap from `market_cap(0)`, the reference buy
//! from `quote_shares(reference, 0)`, and the resulting YES probability from
//! `implied_probability(shares, 0, floor)`. Pairs inside both target windows
//! are reported, closest first.

use std::cmp::Ordering;

use curve_pricing::{curve, issuance, probability, CurveParams};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{TargetConfig, MAX_GRID_CELLS};
use crate::error::{CalibrationError, Result};
use crate::units::{
    capital_to_units, scaled_to_percent, scaled_to_price, units_to_capital, units_to_shares,
};

/// Kernel outputs for one grid cell.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CandidateResult {
    pub anchor: u64,
    pub floor: u64,
    /// Spot price at zero real supply (capital per share)
    pub initial_price: f64,
    /// Initial market cap in capital units
    pub market_cap: f64,
    /// Shares issued for the reference contribution
    pub shares_issued: f64,
    /// YES probability (percent) after the reference buy
    pub probability: f64,
    pub market_cap_ok: bool,
    pub probability_ok: bool,
    /// Normalized distance from the window centers (0 = on target)
    pub distance: f64,
    pub market_cap_units: i128,
    pub shares_issued_units: i128,
    pub probability_scaled: i128,
}

impl CandidateResult {
    pub fn passes(&self) -> bool {
        self.market_cap_ok && self.probability_ok
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub evaluated: Vec<CandidateResult>,
    /// Passing pairs ordered by `distance`, then anchor, then floor
    pub matches: Vec<CandidateResult>,
    /// Pairs the kernel rejected (logged, not fatal)
    pub skipped: usize,
}

impl SearchOutcome {
    pub fn best(&self) -> Option<&CandidateResult> {
        self.matches.first()
    }

    pub fn require_match(&self) -> Result<&CandidateResult> {
        self.best().ok_or(CalibrationError::NoCandidateFound {
            evaluated: self.evaluated.len(),
        })
    }
}

pub struct Calibrator {
    base: CurveParams,
    targets: TargetConfig,
    reference_units: i128,
}

impl Calibrator {
    pub fn new(base: CurveParams, targets: TargetConfig) -> Result<Self> {
        targets.validate()?;
        base.validate()?;
        let reference_units = capital_to_units(targets.reference_contribution)?;
        if reference_units <= 0 {
            return Err(CalibrationError::InvalidTarget(format!(
                "reference_contribution {} rounds to zero base units",
                targets.reference_contribution
            )));
        }
        Ok(Self {
            base,
            targets,
            reference_units,
        })
    }

    pub fn targets(&self) -> &TargetConfig {
        &self.targets
    }

    /// Evaluate a single pair against both windows.
    pub fn evaluate(&self, anchor: u64, floor: u64) -> Result<CandidateResult> {
        let params = self.base.with_virtuals(anchor, floor);

        let initial_price = curve::spot_price(0, &params)?;
        let market_cap_units = curve::market_cap(0, &params)?;
        let shares_issued_units = issuance::quote_shares(self.reference_units, 0, &params)?;
        let probability_scaled =
            probability::implied_probability(shares_issued_units, 0, params.virtual_floor)?;

        let market_cap = units_to_capital(market_cap_units);
        let probability = scaled_to_percent(probability_scaled);

        Ok(CandidateResult {
            anchor,
            floor,
            initial_price: scaled_to_price(initial_price),
            market_cap,
            shares_issued: units_to_shares(shares_issued_units),
            probability,
            market_cap_ok: self.targets.market_cap_ok(market_cap),
            probability_ok: self.targets.probability_ok(probability),
            distance: self.distance(market_cap, probability),
            market_cap_units,
            shares_issued_units,
            probability_scaled,
        })
    }

    /// Evaluate the full grid `anchors x floors`.
    pub fn search(&self, anchors: &[u64], floors: &[u64]) -> Result<SearchOutcome> {
        if anchors.is_empty() {
            return Err(CalibrationError::EmptyCandidates("anchors"));
        }
        if floors.is_empty() {
            return Err(CalibrationError::EmptyCandidates("floors"));
        }

        let cells = anchors
            .len()
            .checked_mul(floors.len())
            .filter(|cells| *cells <= MAX_GRID_CELLS)
            .ok_or_else(|| {
                CalibrationError::InvalidConfig(format!(
                    "{} anchors x {} floors exceeds the {} cell search limit",
                    anchors.len(),
                    floors.len(),
                    MAX_GRID_CELLS
                ))
            })?;

        info!(
            "Searching {} anchors x {} floors ({} pairs)",
            anchors.len(),
            floors.len(),
            cells
        );

        let mut evaluated = Vec::with_capacity(cells);
        let mut skipped = 0;
        for &anchor in anchors {
            for &floor in floors {
                match self.evaluate(anchor, floor) {
                    Ok(result) => {
                        debug!(
                            anchor,
                            floor,
                            market_cap = result.market_cap,
                            probability = result.probability,
                            passes = result.passes(),
                            "Evaluated candidate"
                        );
                        evaluated.push(result);
                    }
                    Err(err) => {
                        warn!(anchor, floor, "Skipping candidate: {}", err);
                        skipped += 1;
                    }
                }
            }
        }

        let mut matches: Vec<CandidateResult> =
            evaluated.iter().filter(|c| c.passes()).cloned().collect();
        matches.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
                .then(a.anchor.cmp(&b.anchor))
                .then(a.floor.cmp(&b.floor))
        });

        if matches.is_empty() {
            warn!("No candidate satisfies both windows");
        } else {
            info!("{} of {} candidates pass", matches.len(), evaluated.len());
        }

        Ok(SearchOutcome {
            evaluated,
            matches,
            skipped,
        })
    }

    fn distance(&self, market_cap: f64, probability: f64) -> f64 {
        let t = &self.targets;
        let cap_term = if t.market_cap_tolerance > 0.0 {
            (market_cap - t.market_cap).abs() / t.market_cap_tolerance
        } else {
            (market_cap - t.market_cap).abs()
        };
        let half_width = (t.probability_max - t.probability_min) / 2.0;
        let prob_term = if half_width > 0.0 {
            (probability - t.probability_center()).abs() / half_width
        } else {
            (probability - t.probability_center()).abs()
        };
        cap_term + prob_term
    }
}
