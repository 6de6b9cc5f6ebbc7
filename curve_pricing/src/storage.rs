use soroban_sdk::contracttype;

/// Storage keys for the contract.
/// Only immutable market configuration is stored; supply lives with the
/// settlement authority and is passed in on every call.
#[derive(Clone)]
#[contracttype]
pub enum DataKey {
    /// Address that configured the market
    Creator,
    /// Curve parameters fixed at deployment
    Params,
}

/// Base units per whole capital unit (9 decimals, lamport precision).
pub const CAPITAL_UNIT: i128 = 1_000_000_000; // 10^9

/// Base units per whole share (9 decimals).
/// Equal to CAPITAL_UNIT so that `net * share_scale` is already a supply
/// delta in share base units.
pub const SHARE_UNIT: i128 = 1_000_000_000; // 10^9

/// Price scale: capital per share, multiplied by 10^18.
/// 0.000001 capital per share is stored as 1_000_000_000_000.
pub const PRICE_SCALE: i128 = 1_000_000_000_000_000_000; // 10^18

/// Probability scale: percent multiplied by 10^7.
/// 50% is 500_000_000, 100% is 1_000_000_000.
pub const PERCENT_SCALE: i128 = 10_000_000; // 10^7

/// 100% at PERCENT_SCALE.
pub const FULL_PERCENT: i128 = 100 * PERCENT_SCALE;

/// Basis points denominator (100% = 10000 bp).
pub const BPS_DENOMINATOR: i128 = 10_000;
