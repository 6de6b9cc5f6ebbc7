//! ASCII and JSON renderings of search, simulation and quote results.

use std::fmt::Write;
use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::config::{Side, TargetConfig};
use crate::error::Result;
use crate::search::{CandidateResult, SearchOutcome};
use crate::simulate::{QuotePreview, SimulationReport};

const WIDTH: usize = 86;

/// `writeln!` into a `String`, which cannot fail.
macro_rules! push_line {
    ($out:expr, $($arg:tt)*) => {{
        let _ = writeln!($out, $($arg)*);
    }};
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Ascii,
    Json,
    Both,
}

/// Anything the CLI can print.
pub trait Render: Serialize {
    fn ascii(&self) -> String;

    fn json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Print in the requested format and write the JSON form to `output` if given.
pub fn emit<R: Render>(report: &R, format: OutputFormat, output: Option<&Path>) -> Result<()> {
    match format {
        OutputFormat::Ascii => println!("{}", report.ascii()),
        OutputFormat::Json => println!("{}", report.json()?),
        OutputFormat::Both => {
            println!("{}", report.ascii());
            println!();
            println!("{}", report.json()?);
        }
    }

    if let Some(path) = output {
        fs::write(path, report.json()?)?;
        info!("Report written to {}", path.display());
    }
    Ok(())
}

fn side_label(side: Side) -> &'static str {
    match side {
        Side::Yes => "YES",
        Side::No => "NO",
    }
}

/// A search outcome together with the windows it was judged against.
#[derive(Debug, Serialize)]
pub struct SearchReport<'a> {
    pub targets: &'a TargetConfig,
    #[serde(flatten)]
    pub outcome: &'a SearchOutcome,
}

fn candidate_row(out: &mut String, c: &CandidateResult) {
    let mark = |ok: bool| if ok { "ok" } else { "--" };
    push_line!(
        out,
        " {:>12} {:>10} {:>14.10} {:>10.4} {:>14.2} {:>9.4}% {:>4} {:>4} {:>8.4}",
        c.anchor,
        c.floor,
        c.initial_price,
        c.market_cap,
        c.shares_issued,
        c.probability,
        mark(c.market_cap_ok),
        mark(c.probability_ok),
        c.distance
    );
}

fn candidate_header(out: &mut String, separator: &str) {
    push_line!(
        out,
        " {:>12} {:>10} {:>14} {:>10} {:>14} {:>10} {:>4} {:>4} {:>8}",
        "Anchor", "Floor", "Init Price", "Init Cap", "Shares", "P(yes)", "Cap", "Prob", "Dist"
    );
    push_line!(out, "{}", separator);
}

impl Render for SearchReport<'_> {
    fn ascii(&self) -> String {
        let border = "=".repeat(WIDTH);
        let separator = "-".repeat(WIDTH);
        let t = self.targets;
        let mut out = String::new();

        push_line!(out, "{}", border);
        push_line!(out, "{:^WIDTH$}", "CURVE PARAMETER SEARCH");
        push_line!(out, "{}", border);
        push_line!(
            out,
            " Target market cap: {} +/- {} | Reference buy: {} | P(yes) window: {}% - {}%",
            t.market_cap,
            t.market_cap_tolerance,
            t.reference_contribution,
            t.probability_min,
            t.probability_max
        );
        push_line!(
            out,
            " Evaluated: {} | Passing: {} | Skipped: {}",
            self.outcome.evaluated.len(),
            self.outcome.matches.len(),
            self.outcome.skipped
        );
        push_line!(out, "{}", separator);

        push_line!(out, " ALL CANDIDATES");
        push_line!(out, "{}", separator);
        candidate_header(&mut out, &separator);
        for c in &self.outcome.evaluated {
            candidate_row(&mut out, c);
        }
        push_line!(out, "{}", separator);

        if self.outcome.matches.is_empty() {
            push_line!(out, " No candidate satisfies both windows.");
        } else {
            push_line!(out, " PASSING CANDIDATES (closest first)");
            push_line!(out, "{}", separator);
            candidate_header(&mut out, &separator);
            for c in &self.outcome.matches {
                candidate_row(&mut out, c);
            }
            push_line!(out, "{}", separator);
            if let Some(best) = self.outcome.best() {
                push_line!(
                    out,
                    " RECOMMENDATION: virtual_anchor = {}, virtual_floor = {}",
                    best.anchor, best.floor
                );
            }
        }
        out.push_str(&border);
        out
    }
}

impl Render for SimulationReport {
    fn ascii(&self) -> String {
        let border = "=".repeat(WIDTH);
        let separator = "-".repeat(WIDTH);
        let mut out = String::new();

        push_line!(out, "{}", border);
        push_line!(out, "{:^WIDTH$}", "BUY SEQUENCE SIMULATION");
        push_line!(out, "{}", border);
        push_line!(out, " Anchor: {} | Floor: {}", self.anchor, self.floor);
        push_line!(
            out,
            " Start supply: YES {} | NO {} (base units)",
            self.start_supply.yes, self.start_supply.no
        );
        push_line!(
            out,
            " YES start price: {:.10} cap: {:.4} | NO start price: {:.10} cap: {:.4}",
            self.yes_baseline.price,
            self.yes_baseline.market_cap,
            self.no_baseline.price,
            self.no_baseline.market_cap
        );
        push_line!(out, "{}", separator);
        push_line!(
            out,
            " {:>4} {:>4} {:>8} {:>14} {:>14} {:>7} {:>9} {:>7} {:>8} {:>9}",
            "#", "Side", "Buy", "Shares", "Spot", "xPrice", "Cap", "xCap", "PnL", "P(yes)"
        );
        push_line!(out, "{}", separator);
        for s in &self.steps {
            push_line!(
                out,
                " {:>4} {:>4} {:>8.2} {:>14.2} {:>14.10} {:>7.3} {:>9.4} {:>7.3} {:>7.2}% {:>8.4}%",
                s.step,
                side_label(s.side),
                s.contribution,
                s.shares,
                s.spot_price,
                s.price_multiple,
                s.market_cap,
                s.market_cap_multiple,
                s.profit_pct,
                s.yes_probability
            );
        }
        push_line!(out, "{}", separator);
        push_line!(
            out,
            " Final supply: YES {} | NO {} (base units)",
            self.final_supply.yes, self.final_supply.no
        );
        out.push_str(&border);
        out
    }
}

impl Render for QuotePreview {
    fn ascii(&self) -> String {
        let border = "=".repeat(WIDTH);
        let mut out = String::new();

        push_line!(out, "{}", border);
        push_line!(out, "{:^WIDTH$}", "BUY QUOTE");
        push_line!(out, "{}", border);
        push_line!(out, " Side:           {}", side_label(self.side));
        push_line!(out, " Contribution:   {}", self.contribution);
        push_line!(out, " Fee / Net:      {} / {}", self.fee, self.net);
        push_line!(out, " Avg price:      {:.12}", self.avg_price);
        push_line!(out, " Shares:         {:.4}", self.shares);
        push_line!(
            out,
            " Spot price:     {:.12} -> {:.12} ({} bps)",
            self.start_price, self.end_price, self.price_impact_bps
        );
        push_line!(
            out,
            " P(yes):         {:.4}% -> {:.4}%",
            self.yes_probability_before, self.yes_probability_after
        );
        out.push_str(&border);
        out
    }
}
