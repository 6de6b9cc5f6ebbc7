//! Buy-sequence replay and single-quote previews.
//!
//! Supply is accumulated per outcome exactly as the settlement authority
//! would after each accepted buy; every number comes from the kernel.

use curve_pricing::storage::PRICE_SCALE;
use curve_pricing::{curve, fixed::mul_div_floor, issuance, probability, CurveError, CurveParams};
use serde::Serialize;
use tracing::debug;

use crate::config::{BuyStep, Side};
use crate::error::Result;
use crate::units::{
    capital_to_units, scaled_to_percent, scaled_to_price, shares_to_units, units_to_capital,
    units_to_shares,
};

/// Outstanding supply of each outcome, in share base units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MarketSupply {
    pub yes: i128,
    pub no: i128,
}

impl MarketSupply {
    pub fn of(&self, side: Side) -> i128 {
        match side {
            Side::Yes => self.yes,
            Side::No => self.no,
        }
    }

    fn credit(&mut self, side: Side, shares: i128) -> Result<()> {
        let slot = match side {
            Side::Yes => &mut self.yes,
            Side::No => &mut self.no,
        };
        *slot = slot.checked_add(shares).ok_or(CurveError::Overflow)?;
        Ok(())
    }

    pub fn yes_probability(&self, params: &CurveParams) -> Result<i128> {
        Ok(probability::implied_probability(
            self.yes,
            self.no,
            params.virtual_floor,
        )?)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationStep {
    pub step: usize,
    pub side: Side,
    pub contribution: f64,
    pub fee: f64,
    pub shares: f64,
    /// Spot price of the bought side after the step
    pub spot_price: f64,
    pub price_multiple: f64,
    pub market_cap: f64,
    pub market_cap_multiple: f64,
    /// Mark-to-market value of this step's shares at the new spot price
    pub position_value: f64,
    pub profit_pct: f64,
    pub yes_probability: f64,
    pub supply: MarketSupply,
}

/// Spot price and market cap of one side at the replay's starting supply.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Baseline {
    pub price: f64,
    pub market_cap: f64,
    #[serde(skip)]
    price_scaled: i128,
    #[serde(skip)]
    market_cap_units: i128,
}

impl Baseline {
    fn at(supply: i128, params: &CurveParams) -> Result<Self> {
        let price_scaled = curve::spot_price(supply, params)?;
        let market_cap_units = curve::market_cap(supply, params)?;
        Ok(Self {
            price: scaled_to_price(price_scaled),
            market_cap: units_to_capital(market_cap_units),
            price_scaled,
            market_cap_units,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub anchor: u64,
    pub floor: u64,
    pub start_supply: MarketSupply,
    /// Multiples in each step are relative to the bought side's baseline
    pub yes_baseline: Baseline,
    pub no_baseline: Baseline,
    pub steps: Vec<SimulationStep>,
    pub final_supply: MarketSupply,
}

/// Replay `buys` in order starting from `start`.
pub fn simulate(
    params: &CurveParams,
    buys: &[BuyStep],
    start: MarketSupply,
) -> Result<SimulationReport> {
    params.validate()?;

    let yes_baseline = Baseline::at(start.yes, params)?;
    let no_baseline = Baseline::at(start.no, params)?;

    let mut supply = start;
    let mut steps = Vec::with_capacity(buys.len());

    for (i, buy) in buys.iter().enumerate() {
        let contribution = capital_to_units(buy.amount)?;
        let quote = issuance::quote_buy(contribution, supply.of(buy.side), params)?;
        supply.credit(buy.side, quote.shares)?;

        let side_supply = supply.of(buy.side);
        let spot = curve::spot_price(side_supply, params)?;
        let cap = curve::market_cap(side_supply, params)?;
        let value = mul_div_floor(quote.shares, spot, PRICE_SCALE)?;
        let yes = supply.yes_probability(params)?;
        let baseline = match buy.side {
            Side::Yes => &yes_baseline,
            Side::No => &no_baseline,
        };

        debug!(
            step = i + 1,
            shares = quote.shares,
            spot,
            yes_probability = yes,
            "Replayed buy"
        );

        steps.push(SimulationStep {
            step: i + 1,
            side: buy.side,
            contribution: units_to_capital(contribution),
            fee: units_to_capital(quote.fee),
            shares: units_to_shares(quote.shares),
            spot_price: scaled_to_price(spot),
            price_multiple: ratio(spot, baseline.price_scaled),
            market_cap: units_to_capital(cap),
            market_cap_multiple: ratio(cap, baseline.market_cap_units),
            position_value: units_to_capital(value),
            profit_pct: (ratio(value, contribution) - 1.0) * 100.0,
            yes_probability: scaled_to_percent(yes),
            supply,
        });
    }

    Ok(SimulationReport {
        anchor: params.virtual_anchor,
        floor: params.virtual_floor,
        start_supply: start,
        yes_baseline,
        no_baseline,
        steps,
        final_supply: supply,
    })
}

/// A single buy quote with the probability it would move the market to.
#[derive(Debug, Clone, Serialize)]
pub struct QuotePreview {
    pub side: Side,
    pub contribution: f64,
    pub fee: f64,
    pub net: f64,
    pub shares: f64,
    pub avg_price: f64,
    pub start_price: f64,
    pub end_price: f64,
    pub price_impact_bps: i128,
    pub yes_probability_before: f64,
    pub yes_probability_after: f64,
    pub shares_units: i128,
}

pub fn preview(
    params: &CurveParams,
    side: Side,
    amount: f64,
    supply: MarketSupply,
    min_shares_out: Option<f64>,
) -> Result<QuotePreview> {
    params.validate()?;
    let contribution = capital_to_units(amount)?;
    let quote = issuance::quote_buy(contribution, supply.of(side), params)?;
    if let Some(min) = min_shares_out {
        issuance::ensure_min_shares(&quote, shares_to_units(min)?)?;
    }

    let before = supply.yes_probability(params)?;
    let mut after_supply = supply;
    after_supply.credit(side, quote.shares)?;
    let after = after_supply.yes_probability(params)?;

    Ok(QuotePreview {
        side,
        contribution: units_to_capital(contribution),
        fee: units_to_capital(quote.fee),
        net: units_to_capital(quote.net),
        shares: units_to_shares(quote.shares),
        avg_price: scaled_to_price(quote.avg_price),
        start_price: scaled_to_price(quote.start_price),
        end_price: scaled_to_price(quote.end_price),
        price_impact_bps: quote.price_impact_bps,
        yes_probability_before: scaled_to_percent(before),
        yes_probability_after: scaled_to_percent(after),
        shares_units: quote.shares,
    })
}

fn ratio(numerator: i128, denominator: i128) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64
}
