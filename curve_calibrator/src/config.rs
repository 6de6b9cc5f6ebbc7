//! TOML configuration for the calibrator.
//!
//! ```toml
//! [curve]
//! phase1_end_supply = 100000000
//! start_price = 0.000001
//! mid_price = 0.000005
//! fee_rate_buy = 0.01
//! share_scale = 500000
//! redemption_factor = 0.95
//! virtual_anchor = 11000000
//! virtual_floor = 600000
//!
//! [targets]
//! market_cap = 17.0
//! market_cap_tolerance = 2.0
//! reference_contribution = 1.0
//! probability_min = 63.0
//! probability_max = 70.0
//!
//! [candidates]
//! anchors = { start = 8000000, end = 14000000, step = 1000000 }
//! floors = [500000, 550000, 600000, 650000, 700000]
//! ```

use std::fs;
use std::path::Path;

use curve_pricing::CurveParams;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CalibrationError, Result};
use crate::units::{price_to_scaled, rate_to_bps};

/// Upper bound on a single candidate range.
pub const MAX_RANGE_CANDIDATES: usize = 100_000;

/// Upper bound on `anchors x floors` for one search.
pub const MAX_GRID_CELLS: usize = 1_000_000;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CalibratorConfig {
    pub curve: CurveConfig,
    pub targets: TargetConfig,
    pub candidates: CandidateConfig,
    pub simulation: SimulationConfig,
}

impl CalibratorConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        debug!("Loaded calibrator config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Curve constants in human units.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CurveConfig {
    /// Whole shares of effective supply where the curve flattens
    pub phase1_end_supply: u64,
    /// Capital per share at effective supply 0
    pub start_price: f64,
    /// Capital per share at and beyond `phase1_end_supply`
    pub mid_price: f64,
    /// Buy fee as a fraction (0.01 = 1%)
    pub fee_rate_buy: f64,
    /// Probe offset in shares per unit of net capital
    pub share_scale: u64,
    /// Issuance haircut as a fraction (0.95 keeps 95%)
    pub redemption_factor: f64,
    pub virtual_anchor: u64,
    pub virtual_floor: u64,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            phase1_end_supply: 100_000_000,
            start_price: 0.000001,
            mid_price: 0.000005,
            fee_rate_buy: 0.01,
            share_scale: 500_000,
            redemption_factor: 0.95,
            virtual_anchor: 11_000_000,
            virtual_floor: 600_000,
        }
    }
}

impl CurveConfig {
    /// Convert to kernel parameters and check their invariants.
    pub fn to_params(&self) -> Result<CurveParams> {
        let params = CurveParams {
            phase1_end_supply: self.phase1_end_supply,
            start_price: price_to_scaled(self.start_price)?,
            mid_price: price_to_scaled(self.mid_price)?,
            virtual_anchor: self.virtual_anchor,
            virtual_floor: self.virtual_floor,
            fee_bps: rate_to_bps(self.fee_rate_buy, "fee_rate_buy")?,
            share_scale: self.share_scale,
            redemption_bps: rate_to_bps(self.redemption_factor, "redemption_factor")?,
        };
        params.validate().map_err(|err| {
            CalibrationError::InvalidConfig(format!("curve parameters rejected: {:?}", err))
        })?;
        Ok(params)
    }
}

/// The two design windows a calibrated market must land in.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TargetConfig {
    /// Initial market cap in capital units (`spot_price(0) * anchor`)
    pub market_cap: f64,
    pub market_cap_tolerance: f64,
    /// Size of the first buy used to probe the probability move
    pub reference_contribution: f64,
    /// Acceptable YES probability range (percent) after the reference buy
    pub probability_min: f64,
    pub probability_max: f64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            market_cap: 17.0,
            market_cap_tolerance: 2.0,
            reference_contribution: 1.0,
            probability_min: 63.0,
            probability_max: 70.0,
        }
    }
}

impl TargetConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.market_cap.is_finite() && self.market_cap > 0.0) {
            return Err(CalibrationError::InvalidTarget(format!(
                "market_cap must be positive, got {}",
                self.market_cap
            )));
        }
        if !(self.market_cap_tolerance.is_finite() && self.market_cap_tolerance >= 0.0) {
            return Err(CalibrationError::InvalidTarget(format!(
                "market_cap_tolerance must be non-negative, got {}",
                self.market_cap_tolerance
            )));
        }
        if !(self.reference_contribution.is_finite() && self.reference_contribution > 0.0) {
            return Err(CalibrationError::InvalidTarget(format!(
                "reference_contribution must be positive, got {}",
                self.reference_contribution
            )));
        }
        let in_range = |p: f64| p.is_finite() && (0.0..=100.0).contains(&p);
        if !in_range(self.probability_min)
            || !in_range(self.probability_max)
            || self.probability_min > self.probability_max
        {
            return Err(CalibrationError::InvalidTarget(format!(
                "probability range [{}, {}] must be ordered and within [0, 100]",
                self.probability_min, self.probability_max
            )));
        }
        Ok(())
    }

    pub fn probability_center(&self) -> f64 {
        (self.probability_min + self.probability_max) / 2.0
    }

    pub fn market_cap_ok(&self, market_cap: f64) -> bool {
        (market_cap - self.market_cap).abs() <= self.market_cap_tolerance
    }

    pub fn probability_ok(&self, probability: f64) -> bool {
        probability >= self.probability_min && probability <= self.probability_max
    }
}

/// A finite set of candidate values: an explicit list or an inclusive range.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum CandidateSet {
    Values(Vec<u64>),
    Range { start: u64, end: u64, step: u64 },
}

impl CandidateSet {
    pub fn expand(&self) -> Result<Vec<u64>> {
        match self {
            CandidateSet::Values(values) => Ok(values.clone()),
            CandidateSet::Range { start, end, step } => {
                if *step == 0 {
                    return Err(CalibrationError::InvalidConfig(
                        "candidate range step must be positive".to_string(),
                    ));
                }
                if start > end {
                    return Ok(Vec::new());
                }
                // checked before the +1: span can be u64::MAX
                let span = (end - start) / step;
                if span >= MAX_RANGE_CANDIDATES as u64 {
                    return Err(CalibrationError::InvalidConfig(format!(
                        "candidate range yields more than {} values",
                        MAX_RANGE_CANDIDATES
                    )));
                }
                let count = span as usize + 1;
                Ok((0..count as u64).map(|i| start + i * step).collect())
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CandidateConfig {
    pub anchors: CandidateSet,
    pub floors: CandidateSet,
}

impl Default for CandidateConfig {
    fn default() -> Self {
        Self {
            anchors: CandidateSet::Range {
                start: 8_000_000,
                end: 14_000_000,
                step: 1_000_000,
            },
            floors: CandidateSet::Values(vec![500_000, 550_000, 600_000, 650_000, 700_000]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Yes,
    No,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct BuyStep {
    pub side: Side,
    /// Contribution in capital units
    pub amount: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub buys: Vec<BuyStep>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            buys: vec![
                BuyStep { side: Side::Yes, amount: 1.0 },
                BuyStep { side: Side::Yes, amount: 5.0 },
                BuyStep { side: Side::Yes, amount: 10.0 },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_curve_matches_reference_params() {
        let params = CurveConfig::default().to_params().unwrap();
        assert_eq!(params, CurveParams::reference());
    }

    #[test]
    fn test_sample_config_round_trips() {
        let sample = CalibratorConfig::default();
        let text = sample.to_toml().unwrap();
        let parsed = CalibratorConfig::from_toml(&text).unwrap();
        assert_eq!(parsed.curve, sample.curve);
        assert_eq!(parsed.targets, sample.targets);
        assert_eq!(parsed.candidates, sample.candidates);
        assert_eq!(parsed.simulation, sample.simulation);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let text = r#"
            [targets]
            market_cap = 25.0

            [candidates]
            anchors = [12000000, 13000000]
        "#;
        let config = CalibratorConfig::from_toml(text).unwrap();
        assert_eq!(config.targets.market_cap, 25.0);
        assert_eq!(config.targets.market_cap_tolerance, 2.0);
        assert_eq!(config.curve, CurveConfig::default());
        assert_eq!(
            config.candidates.anchors,
            CandidateSet::Values(vec![12_000_000, 13_000_000])
        );
        assert_eq!(config.candidates.floors, CandidateConfig::default().floors);
    }

    #[test]
    fn test_range_candidates() {
        let text = r#"
            [candidates]
            anchors = { start = 1000000, end = 3000000, step = 1000000 }
            floors = { start = 5, end = 4, step = 1 }
        "#;
        let config = CalibratorConfig::from_toml(text).unwrap();
        assert_eq!(
            config.candidates.anchors.expand().unwrap(),
            vec![1_000_000, 2_000_000, 3_000_000]
        );
        assert!(config.candidates.floors.expand().unwrap().is_empty());
    }

    #[test]
    fn test_range_rejects_zero_step_and_huge_grids() {
        let zero = CandidateSet::Range { start: 0, end: 10, step: 0 };
        assert!(matches!(zero.expand(), Err(CalibrationError::InvalidConfig(_))));

        let huge = CandidateSet::Range { start: 0, end: u64::MAX, step: 1 };
        assert!(matches!(huge.expand(), Err(CalibrationError::InvalidConfig(_))));

        let just_over = CandidateSet::Range {
            start: 0,
            end: MAX_RANGE_CANDIDATES as u64,
            step: 1,
        };
        assert!(matches!(just_over.expand(), Err(CalibrationError::InvalidConfig(_))));
    }

    #[test]
    fn test_range_at_limit_expands() {
        let at_limit = CandidateSet::Range {
            start: 1,
            end: MAX_RANGE_CANDIDATES as u64,
            step: 1,
        };
        let values = at_limit.expand().unwrap();
        assert_eq!(values.len(), MAX_RANGE_CANDIDATES);
        assert_eq!(values.last(), Some(&(MAX_RANGE_CANDIDATES as u64)));
    }

    #[test]
    fn test_simulation_buys_parse() {
        let text = r#"
            [[simulation.buys]]
            side = "no"
            amount = 2.5
        "#;
        let config = CalibratorConfig::from_toml(text).unwrap();
        assert_eq!(
            config.simulation.buys,
            vec![BuyStep { side: Side::No, amount: 2.5 }]
        );
    }

    #[test]
    fn test_invalid_curve_rejected() {
        let curve = CurveConfig {
            mid_price: 0.0000001,
            ..CurveConfig::default()
        };
        assert!(matches!(curve.to_params(), Err(CalibrationError::InvalidConfig(_))));

        let curve = CurveConfig {
            redemption_factor: 0.0,
            ..CurveConfig::default()
        };
        assert!(matches!(curve.to_params(), Err(CalibrationError::InvalidConfig(_))));
    }

    #[test]
    fn test_target_validation() {
        assert!(TargetConfig::default().validate().is_ok());

        let inverted = TargetConfig {
            probability_min: 70.0,
            probability_max: 60.0,
            ..TargetConfig::default()
        };
        assert!(matches!(inverted.validate(), Err(CalibrationError::InvalidTarget(_))));

        let no_reference = TargetConfig {
            reference_contribution: 0.0,
            ..TargetConfig::default()
        };
        assert!(matches!(no_reference.validate(), Err(CalibrationError::InvalidTarget(_))));
    }

    #[test]
    fn test_target_windows() {
        let targets = TargetConfig::default();
        assert!(targets.market_cap_ok(15.84));
        assert!(!targets.market_cap_ok(14.0));
        assert!(targets.probability_ok(67.47));
        assert!(!targets.probability_ok(71.0));
        assert_eq!(targets.probability_center(), 66.5);
    }
}
