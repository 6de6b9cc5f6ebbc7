//! Curve calibration CLI
//!
//! Usage:
//!   curve-calibrator [OPTIONS] <COMMAND>
//!
//! Commands:
//!   search        Grid-search virtual anchor/floor pairs against the targets
//!   quote         Preview a single buy
//!   simulate      Replay the configured buy sequence
//!   init-config   Write a sample config file
//!
//! Example:
//!   curve-calibrator --config calibrator.toml search --format both --output search.json

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

use curve_calibrator::config::{BuyStep, CandidateSet};
use curve_calibrator::report::{emit, SearchReport};
use curve_calibrator::units::shares_to_units;
use curve_calibrator::{
    simulate, CalibrationError, CalibratorConfig, Calibrator, MarketSupply, OutputFormat, Side,
};

#[derive(Parser)]
#[command(name = "curve-calibrator")]
#[command(version, about = "Calibrate and preview bonding-curve market parameters", long_about = None)]
struct Cli {
    /// TOML config file (defaults reproduce the reference market)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output format: ascii, json, both
    #[arg(short, long, global = true, value_enum, default_value = "ascii")]
    format: OutputFormat,

    /// Output file for the JSON report
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Override curve.virtual_anchor
    #[arg(long, global = true)]
    anchor: Option<u64>,

    /// Override curve.virtual_floor
    #[arg(long, global = true)]
    floor: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grid-search virtual anchor/floor pairs
    Search {
        /// Candidate anchors (comma separated), replaces candidates.anchors
        #[arg(long, value_delimiter = ',')]
        anchors: Option<Vec<u64>>,

        /// Candidate floors (comma separated), replaces candidates.floors
        #[arg(long, value_delimiter = ',')]
        floors: Option<Vec<u64>>,

        /// Target initial market cap
        #[arg(long)]
        market_cap: Option<f64>,

        /// Allowed deviation from the target market cap
        #[arg(long)]
        tolerance: Option<f64>,

        /// Reference contribution used to probe the probability move
        #[arg(long)]
        reference: Option<f64>,

        /// Lower bound of the YES probability window (percent)
        #[arg(long)]
        prob_min: Option<f64>,

        /// Upper bound of the YES probability window (percent)
        #[arg(long)]
        prob_max: Option<f64>,

        /// Exit with an error when no pair passes
        #[arg(long)]
        require_match: bool,
    },
    /// Preview a single buy
    Quote {
        /// Contribution in capital units
        amount: f64,

        #[arg(long, value_enum, default_value = "yes")]
        side: Side,

        /// Current YES supply in whole shares
        #[arg(long, default_value = "0")]
        yes_supply: f64,

        /// Current NO supply in whole shares
        #[arg(long, default_value = "0")]
        no_supply: f64,

        /// Fail if fewer shares would be issued
        #[arg(long)]
        min_shares: Option<f64>,
    },
    /// Replay the configured buy sequence
    Simulate {
        /// YES buy amounts (comma separated), replaces simulation.buys
        #[arg(long, value_delimiter = ',')]
        buys: Option<Vec<f64>>,
    },
    /// Write a sample config file
    InitConfig {
        #[arg(default_value = "calibrator.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let log_level = match cli.log_level.as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match &cli.config {
        Some(path) => CalibratorConfig::load(path)?,
        None => CalibratorConfig::default(),
    };
    if let Some(anchor) = cli.anchor {
        config.curve.virtual_anchor = anchor;
    }
    if let Some(floor) = cli.floor {
        config.curve.virtual_floor = floor;
    }

    let output = cli.output.as_deref();

    match cli.command {
        Commands::Search {
            anchors,
            floors,
            market_cap,
            tolerance,
            reference,
            prob_min,
            prob_max,
            require_match,
        } => {
            if let Some(anchors) = anchors {
                config.candidates.anchors = CandidateSet::Values(anchors);
            }
            if let Some(floors) = floors {
                config.candidates.floors = CandidateSet::Values(floors);
            }
            let targets = &mut config.targets;
            if let Some(v) = market_cap {
                targets.market_cap = v;
            }
            if let Some(v) = tolerance {
                targets.market_cap_tolerance = v;
            }
            if let Some(v) = reference {
                targets.reference_contribution = v;
            }
            if let Some(v) = prob_min {
                targets.probability_min = v;
            }
            if let Some(v) = prob_max {
                targets.probability_max = v;
            }

            let calibrator = Calibrator::new(config.curve.to_params()?, config.targets.clone())?;
            let anchors = config.candidates.anchors.expand()?;
            let floors = config.candidates.floors.expand()?;

            let outcome = match calibrator.search(&anchors, &floors) {
                Ok(outcome) => outcome,
                Err(CalibrationError::EmptyCandidates(which)) => {
                    warn!("Nothing to search: {} candidate list is empty", which);
                    return Ok(());
                }
                Err(err) => return Err(err.into()),
            };

            emit(
                &SearchReport {
                    targets: &config.targets,
                    outcome: &outcome,
                },
                cli.format,
                output,
            )?;

            if require_match {
                outcome.require_match()?;
            }
        }
        Commands::Quote {
            amount,
            side,
            yes_supply,
            no_supply,
            min_shares,
        } => {
            let params = config.curve.to_params()?;
            let supply = MarketSupply {
                yes: shares_to_units(yes_supply)?,
                no: shares_to_units(no_supply)?,
            };
            let quote = simulate::preview(&params, side, amount, supply, min_shares)?;
            emit(&quote, cli.format, output)?;
        }
        Commands::Simulate { buys } => {
            if let Some(amounts) = buys {
                config.simulation.buys = amounts
                    .into_iter()
                    .map(|amount| BuyStep {
                        side: Side::Yes,
                        amount,
                    })
                    .collect();
            }
            let params = config.curve.to_params()?;
            let report =
                simulate::simulate(&params, &config.simulation.buys, MarketSupply::default())?;
            emit(&report, cli.format, output)?;
        }
        Commands::InitConfig { path, force } => {
            if path.exists() && !force {
                return Err(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )
                .into());
            }
            std::fs::write(&path, config.to_toml()?)?;
            info!("Sample config written to {}", path.display());
        }
    }

    Ok(())
}
