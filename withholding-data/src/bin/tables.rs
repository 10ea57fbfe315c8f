use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use rust_decimal::Decimal;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use withholding_core::TieredRateCalculator;
use withholding_data::{LoadedSchedule, RateTableLoader, schedules};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Validate withholding rate tables and evaluate sample amounts.
///
/// Loads tables from a CSV file (or falls back to the bundled Brazilian
/// monthly IRRF schedule), checks every table invariant, and optionally
/// evaluates amounts against one of the tables.
///
/// The CSV file should have the following columns:
/// - schedule: identifier for the table, e.g. a jurisdiction code
/// - year: the year the table applies to
/// - lower_bound: inclusive minimum amount for the band
/// - upper_bound: inclusive maximum amount (empty for unbounded)
/// - rate: percentage rate, e.g. 7.5
/// - subtract_amount: fixed amount subtracted after applying the rate
/// - label: display description of the band
#[derive(Debug, Parser)]
#[command(name = "withholding-tables")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a CSV file with rate table data. Omit to use the bundled
    /// schedule.
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Schedule identifier to evaluate amounts against.
    #[arg(short, long)]
    schedule: Option<String>,

    /// Year of the table to evaluate amounts against.
    #[arg(short, long)]
    year: Option<i32>,

    /// Base amount to evaluate. May be given multiple times.
    #[arg(short, long)]
    amount: Vec<Decimal>,
}

// ─── tracing ─────────────────────────────────────────────────────────────────

/// Initialise the tracing subscriber.
///
/// * Honours `RUST_LOG` when set.
/// * Falls back to `info` so normal runs are quiet.
/// * Strips timestamps and target names to keep CLI output clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .init();
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let loaded = match &cli.file {
        Some(path) => {
            debug!("loading tables from {}", path.display());
            let file = File::open(path)
                .with_context(|| format!("Failed to open: {}", path.display()))?;
            let records = RateTableLoader::parse(file)
                .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;
            RateTableLoader::build_tables(records)
                .with_context(|| format!("Invalid table data in: {}", path.display()))?
        }
        None => {
            debug!("no file given, using bundled schedule");
            vec![LoadedSchedule {
                schedule: "BR-M".to_string(),
                year: 2024,
                table: schedules::brazil_irrf_monthly_2024(),
            }]
        }
    };

    for schedule in &loaded {
        info!(
            "schedule {} year {}: {} bands, ok",
            schedule.schedule,
            schedule.year,
            schedule.table.bands().len()
        );
    }

    if cli.amount.is_empty() {
        return Ok(());
    }

    if loaded.len() > 1 && cli.schedule.is_none() && cli.year.is_none() {
        bail!("Multiple tables loaded; pick one with --schedule/--year");
    }

    let selected = loaded
        .iter()
        .find(|s| {
            cli.schedule.as_ref().is_none_or(|want| *want == s.schedule)
                && cli.year.is_none_or(|want| want == s.year)
        })
        .context("No table matches the requested schedule/year")?;

    let calculator = TieredRateCalculator::new(&selected.table);

    for amount in &cli.amount {
        let result = calculator
            .evaluate(*amount)
            .with_context(|| format!("Failed to evaluate amount {amount}"))?
            .rounded();

        info!(
            "{}: band {} deduction {} net {}{}",
            result.base_amount,
            result.matched_band.label,
            result.computed_deduction,
            result.net_amount,
            if result.is_exempt { " (exempt)" } else { "" }
        );
    }

    Ok(())
}
