//! Off-chain tooling for `curve_pricing` markets: grid search over the
//! virtual anchor and floor, buy-sequence replay, and quote previews.

pub mod config;
pub mod error;
pub mod report;
pub mod search;
pub mod simulate;
pub mod units;

pub use config::{CalibratorConfig, CandidateSet, Side, TargetConfig};
pub use error::{CalibrationError, Result};
pub use report::{OutputFormat, Render};
pub use search::{CandidateResult, Calibrator, SearchOutcome};
pub use simulate::{MarketSupply, QuotePreview, SimulationReport};
