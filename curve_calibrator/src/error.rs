use curve_pricing::CurveError;
use thiserror::Error;

/// Errors raised by the calibration tooling.
#[derive(Error, Debug)]
pub enum CalibrationError {
    #[error("Candidate list is empty: {0}")]
    EmptyCandidates(&'static str),
    #[error("No (anchor, floor) pair satisfies both target windows ({evaluated} evaluated)")]
    NoCandidateFound { evaluated: usize },
    #[error("Invalid target: {0}")]
    InvalidTarget(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Pricing kernel rejected input: {0:?}")]
    Kernel(CurveError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config parse error: {0}")]
    TomlDe(#[from] toml::de::Error),
    #[error("Config serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// CurveError is a contract error type without std::error::Error, so no #[from].
impl From<CurveError> for CalibrationError {
    fn from(err: CurveError) -> Self {
        CalibrationError::Kernel(err)
    }
}

pub type Result<T> = std::result::Result<T, CalibrationError>;
