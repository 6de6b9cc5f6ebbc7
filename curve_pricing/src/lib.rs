#![no_std]

pub mod curve;
pub mod error;
pub mod fixed;
pub mod issuance;
pub mod params;
pub mod probability;
pub mod storage;

pub use error::CurveError;
pub use issuance::ShareQuote;
pub use params::CurveParams;

use soroban_sdk::{contract, contractimpl, symbol_short, Address, Env};
use storage::DataKey;

/// Bonding-Curve Pricing Contract
///
/// Pins one market's curve parameters at deployment and exposes the pricing
/// kernel to the settlement program and to off-chain preview simulations.
///
/// Key features:
/// - Spot price on a two-phase (linear, then flat) curve shifted by a virtual anchor
/// - Share quotes for a capital contribution, with fee and redemption haircut
/// - Implied YES probability damped by a virtual floor
/// - Read-only: outstanding supply is passed in, never stored
#[contract]
pub struct CurvePricing;

#[contractimpl]
impl CurvePricing {
    /// Constructor: Called automatically when deployed with constructor args.
    ///
    /// Delegates to initialize() for the actual setup logic.
    pub fn __constructor(env: Env, creator: Address, params: CurveParams) {
        Self::initialize(env, creator, params).expect("initialization failed");
    }

    /// Pin the curve parameters for this market.
    ///
    /// # Arguments
    /// * `creator` - Address configuring the market (must authorize)
    /// * `params` - Curve constants; immutable once stored
    pub fn initialize(env: Env, creator: Address, params: CurveParams) -> Result<(), CurveError> {
        if env.storage().instance().has(&DataKey::Params) {
            return Err(CurveError::AlreadyInitialized);
        }

        params.validate()?;

        creator.require_auth();

        env.storage().instance().set(&DataKey::Creator, &creator);
        env.storage().instance().set(&DataKey::Params, &params);

        env.events()
            .publish((symbol_short!("curve"), symbol_short!("init")), params);

        Ok(())
    }

    /// Spot price of an outcome at `supply` (share base units).
    ///
    /// # Returns
    /// Price scaled by 10^18 (1_000_000_000_000 = 0.000001)
    pub fn spot_price(env: Env, supply: i128) -> Result<i128, CurveError> {
        let params = Self::load_params(&env)?;
        curve::spot_price(supply, &params)
    }

    /// Shares issued for `contribution` (capital base units) at `supply`.
    pub fn quote_shares(env: Env, contribution: i128, supply: i128) -> Result<i128, CurveError> {
        let params = Self::load_params(&env)?;
        issuance::quote_shares(contribution, supply, &params)
    }

    /// Full receipt for a buy: fee, net, average price, shares and price impact.
    pub fn get_quote(env: Env, contribution: i128, supply: i128) -> Result<ShareQuote, CurveError> {
        let params = Self::load_params(&env)?;
        issuance::quote_buy(contribution, supply, &params)
    }

    /// Same as get_quote, but fails when fewer than `min_shares_out` would be issued.
    ///
    /// # Arguments
    /// * `min_shares_out` - Minimum shares acceptable (slippage protection).
    ///                      Protects users from supply moving between preview and execution.
    pub fn get_quote_checked(
        env: Env,
        contribution: i128,
        supply: i128,
        min_shares_out: i128,
    ) -> Result<ShareQuote, CurveError> {
        let params = Self::load_params(&env)?;
        let quote = issuance::quote_buy(contribution, supply, &params)?;
        issuance::ensure_min_shares(&quote, min_shares_out)?;
        Ok(quote)
    }

    /// Implied YES probability.
    ///
    /// # Returns
    /// Percent scaled by 10^7 (500_000_000 = 50%)
    pub fn implied_probability(env: Env, yes_supply: i128, no_supply: i128) -> Result<i128, CurveError> {
        let params = Self::load_params(&env)?;
        probability::implied_probability(yes_supply, no_supply, params.virtual_floor)
    }

    /// Market capitalization of an outcome (capital base units) at `supply`.
    pub fn market_cap(env: Env, supply: i128) -> Result<i128, CurveError> {
        let params = Self::load_params(&env)?;
        curve::market_cap(supply, &params)
    }

    pub fn get_params(env: Env) -> Result<CurveParams, CurveError> {
        Self::load_params(&env)
    }

    pub fn get_creator(env: Env) -> Result<Address, CurveError> {
        Self::require_initialized(&env)?;
        env.storage()
            .instance()
            .get(&DataKey::Creator)
            .ok_or(CurveError::StorageCorrupted)
    }

    // --- Internal helpers ---

    fn require_initialized(env: &Env) -> Result<(), CurveError> {
        if !env.storage().instance().has(&DataKey::Params) {
            return Err(CurveError::NotInitialized);
        }
        Ok(())
    }

    fn load_params(env: &Env) -> Result<CurveParams, CurveError> {
        Self::require_initialized(env)?;
        env.storage()
            .instance()
            .get(&DataKey::Params)
            .ok_or(CurveError::StorageCorrupted)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::storage::{CAPITAL_UNIT, PERCENT_SCALE, SHARE_UNIT};
    use soroban_sdk::testutils::Address as _;

    /// Register an initialized pricing contract for the reference market.
    /// Returns (env, contract_id, creator)
    fn setup_test() -> (Env, Address, Address) {
        setup_test_with_params(CurveParams::reference())
    }

    fn setup_test_with_params(params: CurveParams) -> (Env, Address, Address) {
        let env = Env::default();
        env.mock_all_auths();

        let creator = Address::generate(&env);

        // Register contract with constructor args (this calls __constructor which calls initialize)
        let contract_id = env.register(CurvePricing, (creator.clone(), params));

        (env, contract_id, creator)
    }

    #[test]
    fn test_initialize() {
        let (env, contract_id, creator) = setup_test();
        let client = CurvePricingClient::new(&env, &contract_id);

        assert_eq!(client.get_creator(), creator);
        assert_eq!(client.get_params(), CurveParams::reference());
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #8)")] // AlreadyInitialized = 8
    fn test_double_initialize_fails() {
        let (env, contract_id, creator) = setup_test();
        let client = CurvePricingClient::new(&env, &contract_id);

        client.initialize(&creator, &CurveParams::reference());
    }

    #[test]
    #[should_panic(expected = "InvalidParams")]
    fn test_invalid_params_rejected_at_deploy() {
        let params = CurveParams {
            redemption_bps: 0,
            ..CurveParams::reference()
        };
        setup_test_with_params(params);
    }

    #[test]
    fn test_spot_price() {
        let (env, contract_id, _creator) = setup_test();
        let client = CurvePricingClient::new(&env, &contract_id);

        // 11M anchor: 0.000001 + 4e-14 * 11M = 0.00000144
        assert_eq!(client.spot_price(&0), 1_440_000_000_000);
        assert_eq!(client.spot_price(&(500_000_000 * SHARE_UNIT)), 5_000_000_000_000);
    }

    #[test]
    fn test_quote_shares_matches_kernel() {
        let (env, contract_id, _creator) = setup_test();
        let client = CurvePricingClient::new(&env, &contract_id);

        let shares = client.quote_shares(&CAPITAL_UNIT, &0);
        let expected = crate::issuance::quote_shares(CAPITAL_UNIT, 0, &CurveParams::reference()).unwrap();
        assert_eq!(shares, expected);
        assert_eq!(shares / SHARE_UNIT, 644_266);
    }

    #[test]
    fn test_get_quote_receipt() {
        let (env, contract_id, _creator) = setup_test();
        let client = CurvePricingClient::new(&env, &contract_id);

        let quote = client.get_quote(&CAPITAL_UNIT, &0);
        assert_eq!(quote.fee + quote.net, CAPITAL_UNIT);
        assert_eq!(quote.avg_price, 1_459_800_000_000);
        assert!(quote.end_price > quote.start_price);
    }

    #[test]
    fn test_get_quote_checked_passes_at_exact_minimum() {
        let (env, contract_id, _creator) = setup_test();
        let client = CurvePricingClient::new(&env, &contract_id);

        let quote = client.get_quote(&CAPITAL_UNIT, &0);
        let checked = client.get_quote_checked(&CAPITAL_UNIT, &0, &quote.shares);
        assert_eq!(checked, quote);
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #7)")] // SlippageExceeded = 7
    fn test_get_quote_checked_slippage() {
        let (env, contract_id, _creator) = setup_test();
        let client = CurvePricingClient::new(&env, &contract_id);

        let quote = client.get_quote(&CAPITAL_UNIT, &0);
        client.get_quote_checked(&CAPITAL_UNIT, &0, &(quote.shares + 1));
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1)")] // InvalidContribution = 1
    fn test_quote_zero_contribution() {
        let (env, contract_id, _creator) = setup_test();
        let client = CurvePricingClient::new(&env, &contract_id);

        client.quote_shares(&0, &0);
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #4)")] // InvalidSupply = 4
    fn test_quote_negative_supply() {
        let (env, contract_id, _creator) = setup_test();
        let client = CurvePricingClient::new(&env, &contract_id);

        client.quote_shares(&CAPITAL_UNIT, &-1);
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #2)")] // DegenerateCurve = 2
    fn test_zero_price_curve_is_degenerate() {
        let params = CurveParams {
            start_price: 0,
            mid_price: 0,
            ..CurveParams::reference()
        };
        let (env, contract_id, _creator) = setup_test_with_params(params);
        let client = CurvePricingClient::new(&env, &contract_id);

        client.quote_shares(&CAPITAL_UNIT, &0);
    }

    #[test]
    fn test_implied_probability() {
        let (env, contract_id, _creator) = setup_test();
        let client = CurvePricingClient::new(&env, &contract_id);

        assert_eq!(client.implied_probability(&0, &0), 50 * PERCENT_SCALE);

        let shares = client.quote_shares(&CAPITAL_UNIT, &0);
        let p = client.implied_probability(&shares, &0);
        assert!(p > 67 * PERCENT_SCALE && p < 68 * PERCENT_SCALE, "p = {}", p);

        // Buying NO mirrors the move, up to one unit of floor rounding
        let q = client.implied_probability(&0, &shares);
        let sum = p + q;
        assert!(sum == 100 * PERCENT_SCALE || sum == 100 * PERCENT_SCALE - 1);
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #3)")] // DegenerateFloor = 3
    fn test_zero_floor_empty_market() {
        let params = CurveParams {
            virtual_floor: 0,
            ..CurveParams::reference()
        };
        let (env, contract_id, _creator) = setup_test_with_params(params);
        let client = CurvePricingClient::new(&env, &contract_id);

        client.implied_probability(&0, &0);
    }

    #[test]
    fn test_market_cap() {
        let params = CurveParams::reference().with_virtuals(10_000_000, 600_000);
        let (env, contract_id, _creator) = setup_test_with_params(params);
        let client = CurvePricingClient::new(&env, &contract_id);

        assert_eq!(client.market_cap(&0), 14 * CAPITAL_UNIT);
    }

    #[test]
    fn test_sequential_buys_preview() {
        // The settlement authority commits supply; previews pass the new snapshot.
        let (env, contract_id, _creator) = setup_test();
        let client = CurvePricingClient::new(&env, &contract_id);

        let mut yes_supply = 0i128;
        let mut last_shares = i128::MAX;
        let mut last_probability = 0i128;
        for _ in 0..5 {
            let shares = client.quote_shares(&CAPITAL_UNIT, &yes_supply);
            assert!(shares < last_shares, "later buys get fewer shares");
            yes_supply += shares;
            last_shares = shares;

            let p = client.implied_probability(&yes_supply, &0);
            assert!(p > last_probability && p < 100 * PERCENT_SCALE);
            last_probability = p;
        }
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #9)")] // NotInitialized = 9
    fn test_uninitialized_contract() {
        let env = Env::default();
        env.mock_all_auths();

        let contract_id = env.register(CurvePricing, (Address::generate(&env), CurveParams::reference()));
        env.as_contract(&contract_id, || {
            env.storage().instance().remove(&DataKey::Params);
        });

        let client = CurvePricingClient::new(&env, &contract_id);
        client.spot_price(&0);
    }
}
