//! Command-line parsing for the ETF portfolio planner.
//!
//! Argument parsing and validation stay here, separate from the analytics code.
//! Conversion into a `PlannerConfig` happens in `app`.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{ContributionFrequency, DataSource, ETF_CATALOG, Horizon};
use crate::error::{AppError, EXIT_INPUT};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "etfsim", version, about = "ETF portfolio analytics and contribution simulator")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Performance table and chart indicators for one ETF.
    Stats(StatsArgs),
    /// Weighted portfolio analytics plus a contribution simulation at the expected return.
    Portfolio(PortfolioArgs),
    /// Contribution simulation at a fixed annual rate (no price data needed).
    Simulate(SimulateArgs),
}

/// Where prices come from and which date range to load.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Price source.
    #[arg(long, value_enum, default_value_t = DataSource::Yahoo)]
    pub source: DataSource,

    /// Directory of `<TICKER>.csv` files (required with `--source csv`).
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Seed for `--source synthetic`.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// First date to load (YYYY-MM-DD). Defaults to five years before `--end`.
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Date after the last one to load (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub end: Option<NaiveDate>,
}

/// Contribution plan inputs shared by `portfolio` and `simulate`.
#[derive(Debug, Args, Clone)]
pub struct PlanArgs {
    /// Initial investment.
    #[arg(long, default_value_t = 1000.0)]
    pub initial: f64,

    /// Amount added at each contribution.
    #[arg(long, default_value_t = 100.0)]
    pub periodic: f64,

    /// Contribution frequency.
    #[arg(long, value_enum, default_value_t = ContributionFrequency::Monthly)]
    pub frequency: ContributionFrequency,

    /// Investment horizon in years.
    #[arg(long, value_enum, default_value_t = Horizon::Five)]
    pub horizon: Horizon,

    /// Export the yearly trajectories to CSV.
    #[arg(long = "export-trajectory")]
    pub export_trajectory: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct StatsArgs {
    /// ETF ticker from the catalog.
    #[arg(default_value = "SPY")]
    pub ticker: String,

    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Debug, Args, Clone)]
pub struct PortfolioArgs {
    /// Comma-separated tickers from the catalog.
    #[arg(long, value_delimiter = ',', default_value = "SPY,QQQ,EEM")]
    pub assets: Vec<String>,

    /// Comma-separated percentages, one per asset. Defaults to an equal split.
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    pub weights: Option<Vec<f64>>,

    /// Rescale the weights so they add up to exactly 100.
    #[arg(long)]
    pub normalize: bool,

    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub plan: PlanArgs,

    /// Export the weighted portfolio curve to CSV.
    #[arg(long = "export-portfolio")]
    pub export_portfolio: Option<PathBuf>,

    /// Export a JSON summary of the run.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct SimulateArgs {
    /// Expected annual return in percent (e.g. 7.5). May be negative.
    #[arg(long, allow_negative_numbers = true)]
    pub rate: f64,

    #[command(flatten)]
    pub plan: PlanArgs,
}

/// Upper-case a ticker and check it against the catalog.
pub fn validate_ticker(raw: &str) -> Result<String, AppError> {
    let ticker = raw.trim().to_ascii_uppercase();
    if ETF_CATALOG.contains(&ticker.as_str()) {
        Ok(ticker)
    } else {
        Err(AppError::new(
            EXIT_INPUT,
            format!("Unknown ticker '{raw}'. Available: {}.", ETF_CATALOG.join(", ")),
        ))
    }
}

/// Validate a multi-asset selection: known tickers, no duplicates, at least one.
pub fn validate_selection(raw: &[String]) -> Result<Vec<String>, AppError> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for r in raw.iter().filter(|r| !r.trim().is_empty()) {
        let ticker = validate_ticker(r)?;
        if out.contains(&ticker) {
            return Err(AppError::new(EXIT_INPUT, format!("Ticker {ticker} is selected more than once.")));
        }
        out.push(ticker);
    }
    if out.is_empty() {
        return Err(AppError::new(EXIT_INPUT, "Select at least one ETF with --assets."));
    }
    Ok(out)
}

/// Resolve the date range; `start` must be before `end`.
pub fn resolve_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), AppError> {
    let end = end.unwrap_or(today);
    let start = match start {
        Some(start) => start,
        None => end
            .checked_sub_months(chrono::Months::new(12 * 5))
            .ok_or_else(|| AppError::new(EXIT_INPUT, "Default start date is out of range."))?,
    };
    if start >= end {
        return Err(AppError::new(
            EXIT_INPUT,
            format!("--start ({start}) must be before --end ({end})."),
        ));
    }
    Ok((start, end))
}

/// Check plan amounts before any data is fetched.
pub fn validate_plan(plan: &PlanArgs) -> Result<(), AppError> {
    if !(plan.initial.is_finite() && plan.initial >= 0.0) {
        return Err(AppError::new(EXIT_INPUT, "--initial must be a non-negative amount."));
    }
    if !(plan.periodic.is_finite() && plan.periodic >= 0.0) {
        return Err(AppError::new(EXIT_INPUT, "--periodic must be a non-negative amount."));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn portfolio_args_parse_lists() {
        let cli = Cli::parse_from([
            "etfsim",
            "portfolio",
            "--assets",
            "spy,BND",
            "--weights",
            "60,35",
            "--normalize",
            "--source",
            "synthetic",
            "--horizon",
            "10",
            "--frequency",
            "semiannual",
        ]);
        let Command::Portfolio(args) = cli.command else {
            panic!("expected portfolio");
        };
        assert_eq!(args.assets, vec!["spy", "BND"]);
        assert_eq!(args.weights, Some(vec![60.0, 35.0]));
        assert!(args.normalize);
        assert_eq!(args.source.source, DataSource::Synthetic);
        assert_eq!(args.plan.horizon, Horizon::Ten);
        assert_eq!(args.plan.frequency, ContributionFrequency::Semiannual);
        assert_eq!(validate_selection(&args.assets).unwrap(), vec!["SPY", "BND"]);
    }

    #[test]
    fn simulate_accepts_negative_rate() {
        let cli = Cli::parse_from(["etfsim", "-v", "simulate", "--rate", "-2.5"]);
        assert_eq!(cli.verbose, 1);
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        assert_eq!(args.rate, -2.5);
        assert_eq!(args.plan.initial, 1000.0);
    }

    #[test]
    fn selection_rejects_unknown_and_duplicates() {
        assert!(validate_ticker("XYZ").is_err());
        assert!(validate_selection(&["SPY".into(), "spy".into()]).is_err());
        assert!(validate_selection(&[]).is_err());
    }

    #[test]
    fn range_defaults_to_five_years() {
        let (start, end) = resolve_range(None, None, d(2024, 6, 30)).unwrap();
        assert_eq!(end, d(2024, 6, 30));
        assert_eq!(start, d(2019, 6, 30));
        assert!(resolve_range(Some(d(2024, 1, 1)), Some(d(2024, 1, 1)), d(2024, 6, 30)).is_err());
    }
}
