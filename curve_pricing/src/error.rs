use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum CurveError {
    /// Contribution must be positive
    InvalidContribution = 1,
    /// Curve evaluated to a non-positive price (misconfigured CurveParams)
    DegenerateCurve = 2,
    /// Probability denominator is zero (zero floor and zero supplies)
    DegenerateFloor = 3,
    /// Outstanding supply must be non-negative
    InvalidSupply = 4,
    /// Curve parameters violate their invariants
    InvalidParams = 5,
    /// Arithmetic overflow
    Overflow = 6,
    /// Slippage exceeded - shares issued below min_shares_out
    SlippageExceeded = 7,
    /// Contract already initialized
    AlreadyInitialized = 8,
    /// Contract not initialized
    NotInitialized = 9,
    /// Critical storage data missing (contract state corrupted)
    StorageCorrupted = 10,
}
