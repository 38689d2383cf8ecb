//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments into a `PlannerConfig`
//! - picks a price provider
//! - runs the pipeline and prints reports
//! - writes optional exports

use chrono::Local;
use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, PlanArgs, PortfolioArgs, SimulateArgs, SourceArgs, StatsArgs};
use crate::data::{CachedProvider, CsvDirectory, PriceSeriesProvider, SyntheticProvider, YahooClient};
use crate::domain::{ContributionPlan, DataSource, PlannerConfig};
use crate::error::{AppError, EXIT_INPUT, EXIT_NO_DATA};

pub mod pipeline;

/// Entry point for the `etfsim` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is the normal case.
    let _ = dotenvy::dotenv();

    // `etfsim` and `etfsim --assets ...` behave like `etfsim portfolio ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    init_tracing(cli.verbose);

    match cli.command {
        Command::Stats(args) => handle_stats(args),
        Command::Portfolio(args) => handle_portfolio(args),
        Command::Simulate(args) => handle_simulate(args),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // Stdout carries the reports.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_stats(args: StatsArgs) -> Result<(), AppError> {
    let ticker = crate::cli::validate_ticker(&args.ticker)?;
    let (start, end) = crate::cli::resolve_range(args.source.start, args.source.end, today())?;
    let provider = build_provider(args.source.source, args.source.data_dir.as_deref(), args.source.seed)?;

    let run = pipeline::run_single(&ticker, start, end, provider.as_ref());
    println!("{}", crate::report::format_single_run(&run));

    if run.report.observations == 0 {
        return Err(AppError::new(
            EXIT_NO_DATA,
            format!("No price data for {ticker} between {start} and {end}."),
        ));
    }
    Ok(())
}

fn handle_portfolio(args: PortfolioArgs) -> Result<(), AppError> {
    let config = planner_config_from_args(&args)?;
    let provider = build_provider(config.source, config.data_dir.as_deref(), config.seed)?;

    let run = pipeline::run_portfolio(&config, provider.as_ref())?;
    println!("{}", crate::report::format_portfolio_run(&run));

    if let Some(path) = &config.export_trajectory {
        match &run.simulation {
            Some(result) => crate::io::write_trajectory_csv(path, result)?,
            None => warn!(path = %path.display(), "no simulation to export"),
        }
    }
    if let Some(path) = &config.export_portfolio {
        crate::io::write_portfolio_csv(path, &run.portfolio_series)?;
    }
    if let Some(path) = &config.export_json {
        crate::io::write_summary_json(path, &run.summary(&config))?;
    }

    if run.series.iter().all(|s| s.series.is_empty()) {
        return Err(AppError::new(EXIT_NO_DATA, "No price data for any selected ETF."));
    }
    Ok(())
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    crate::cli::validate_plan(&args.plan)?;
    if !args.rate.is_finite() {
        return Err(AppError::new(EXIT_INPUT, "--rate must be a finite percentage."));
    }
    let plan = contribution_plan(&args.plan, args.rate / 100.0);
    let result = crate::projection::simulate(&plan)?;
    println!("{}", crate::report::format_simulation(&plan, &result));

    if let Some(path) = &args.plan.export_trajectory {
        crate::io::write_trajectory_csv(path, &result)?;
    }
    Ok(())
}

fn contribution_plan(args: &PlanArgs, annual_rate: f64) -> ContributionPlan {
    ContributionPlan {
        initial_amount: args.initial,
        periodic_amount: args.periodic,
        contributions_per_year: args.frequency.per_year(),
        horizon_years: args.horizon.years(),
        annual_rate,
    }
}

fn today() -> chrono::NaiveDate {
    Local::now().date_naive()
}

/// Validate `portfolio` arguments and turn them into a `PlannerConfig`.
pub fn planner_config_from_args(args: &PortfolioArgs) -> Result<PlannerConfig, AppError> {
    let assets = crate::cli::validate_selection(&args.assets)?;
    crate::cli::validate_plan(&args.plan)?;
    let SourceArgs {
        source,
        data_dir,
        seed,
        start,
        end,
    } = &args.source;
    let (start, end) = crate::cli::resolve_range(*start, *end, today())?;

    if let Some(weights) = &args.weights {
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(AppError::new(EXIT_INPUT, "--weights must be finite percentages."));
        }
    }

    Ok(PlannerConfig {
        source: *source,
        data_dir: data_dir.clone(),
        seed: *seed,
        start,
        end,
        assets,
        weight_edits: args.weights.clone(),
        normalize: args.normalize,
        initial_amount: args.plan.initial,
        periodic_amount: args.plan.periodic,
        frequency: args.plan.frequency,
        horizon: args.plan.horizon,
        export_trajectory: args.plan.export_trajectory.clone(),
        export_portfolio: args.export_portfolio.clone(),
        export_json: args.export_json.clone(),
    })
}

/// Pick the price provider for a run, memoized for the session.
pub fn build_provider(
    source: DataSource,
    data_dir: Option<&std::path::Path>,
    seed: u64,
) -> Result<Box<dyn PriceSeriesProvider>, AppError> {
    debug!(?source, "building price provider");
    let provider: Box<dyn PriceSeriesProvider> = match source {
        DataSource::Yahoo => Box::new(CachedProvider::new(YahooClient::from_env()?)),
        DataSource::Csv => {
            let dir = data_dir.ok_or_else(|| AppError::new(EXIT_INPUT, "--source csv requires --data-dir."))?;
            Box::new(CachedProvider::new(CsvDirectory::new(dir)))
        }
        DataSource::Synthetic => Box::new(CachedProvider::new(SyntheticProvider::new(seed))),
    };
    Ok(provider)
}

/// Rewrite argv so `etfsim` defaults to `etfsim portfolio`.
///
/// Rules:
/// - `etfsim`                          -> `etfsim portfolio`
/// - `etfsim --assets SPY,BND ...`     -> `etfsim portfolio --assets SPY,BND ...`
/// - `etfsim --help/--version/-h`      -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("portfolio".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    // Global flags such as `-v` may precede the subcommand.
    let has_subcommand = argv
        .iter()
        .skip(1)
        .any(|a| matches!(a.as_str(), "stats" | "portfolio" | "simulate"));
    if has_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "portfolio".to_string());
    }
    argv
}
