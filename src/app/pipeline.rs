//! Shared recomputation pipeline used by every command.
//!
//! One pass runs, in dependency order:
//! weights -> fetch -> per-asset stats -> portfolio curve -> portfolio stats -> simulation
//!
//! Everything is recomputed from the inputs; nothing is carried between passes
//! except what the caller passes back in. Degraded results (a ticker without
//! data, too little history for portfolio stats) are recorded as notes instead
//! of aborting the pass.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::analytics::{IndicatorSet, performance_table, portfolio_stats};
use crate::data::{PriceSeriesProvider, fetch_or_empty};
use crate::domain::{
    AssetSeries, ContributionPlan, PerformanceRow, PerformanceWindow, PlannerConfig, PortfolioStats, PriceSeries,
    SimulationResult,
};
use crate::error::{AnalyticsError, AppError};
use crate::io::{AssetSummary, RunSummary};
use crate::portfolio::{WeightSet, WeightStatus, aggregate, reconcile_selection};
use crate::projection::simulate;

/// Per-asset history summary.
#[derive(Debug, Clone)]
pub struct AssetReport {
    pub ticker: String,
    pub observations: usize,
    pub performance: Vec<PerformanceRow>,
}

/// Weights after editing and optional normalization.
#[derive(Debug, Clone)]
pub struct WeightOutcome {
    pub weights: WeightSet,
    /// Status of the edited weights, before any normalization.
    pub edited_status: WeightStatus,
    pub normalized: bool,
}

/// All computed outputs of a `portfolio` run.
#[derive(Debug, Clone)]
pub struct PortfolioRun {
    pub asof: NaiveDate,
    pub weights: WeightOutcome,
    pub assets: Vec<AssetReport>,
    pub series: Vec<AssetSeries>,
    pub portfolio_series: PriceSeries,
    pub stats: Option<PortfolioStats>,
    pub plan: Option<ContributionPlan>,
    pub simulation: Option<SimulationResult>,
    pub notes: Vec<String>,
}

impl PortfolioRun {
    /// Serializable view of this run for `--export-json`.
    pub fn summary(&self, config: &PlannerConfig) -> RunSummary {
        RunSummary {
            tool: "etfsim".to_string(),
            source: format!("{:?}", config.source).to_lowercase(),
            start: config.start,
            end: config.end,
            weights: self.weights.weights.clone(),
            weights_balanced: self.weights.weights.status() == WeightStatus::Balanced,
            assets: self
                .assets
                .iter()
                .map(|a| AssetSummary {
                    ticker: a.ticker.clone(),
                    observations: a.observations,
                    performance: a.performance.clone(),
                })
                .collect(),
            portfolio: self.stats,
            plan: self.plan,
            simulation: self.simulation.clone(),
            notes: self.notes.clone(),
        }
    }
}

/// Outputs of a single-ETF `stats` run.
#[derive(Debug, Clone)]
pub struct SingleRun {
    pub ticker: String,
    pub asof: NaiveDate,
    pub report: AssetReport,
    pub indicators: IndicatorSet,
}

/// Apply raw edits to a fresh selection and normalize on request.
///
/// A zero total cannot be normalized; the edited weights are kept and a note is
/// returned.
pub fn resolve_weights(
    assets: &[String],
    edits: Option<&[f64]>,
    normalize: bool,
) -> Result<(WeightOutcome, Option<String>), AnalyticsError> {
    let mut weights = reconcile_selection(None, assets);
    if let Some(values) = edits {
        weights.apply_edits(values)?;
    }
    let edited_status = weights.status();

    let mut note = None;
    let mut normalized = false;
    if normalize && edited_status != WeightStatus::Balanced {
        match weights.normalize() {
            Ok(set) => {
                info!(total = %weights.total(), "weights normalized to 100");
                weights = set;
                normalized = true;
            }
            Err(AnalyticsError::DivisionByZero) => {
                warn!("weights total zero; normalization skipped");
                note = Some("Weights total 0%; normalization skipped and weights left unchanged.".to_string());
            }
            Err(err) => return Err(err),
        }
    }

    Ok((
        WeightOutcome {
            weights,
            edited_status,
            normalized,
        },
        note,
    ))
}

fn asset_report(ticker: &str, series: &PriceSeries, asof: NaiveDate) -> AssetReport {
    AssetReport {
        ticker: ticker.to_string(),
        observations: series.len(),
        performance: performance_table(series, &PerformanceWindow::standard(), asof),
    }
}

/// Execute the full portfolio pipeline.
pub fn run_portfolio(config: &PlannerConfig, provider: &dyn PriceSeriesProvider) -> Result<PortfolioRun, AppError> {
    let asof = config.end;
    let mut notes = Vec::new();

    // 1) Weights.
    let (weights, note) = resolve_weights(&config.assets, config.weight_edits.as_deref(), config.normalize)?;
    notes.extend(note);

    // 2) Prices, one ticker at a time; failures degrade to empty series.
    let series: Vec<AssetSeries> = weights
        .weights
        .assets()
        .into_iter()
        .map(|ticker| {
            let s = fetch_or_empty(provider, &ticker, config.start, config.end);
            AssetSeries::new(ticker, s)
        })
        .collect();
    for s in series.iter().filter(|s| s.series.is_empty()) {
        notes.push(format!("No price data for {}.", s.ticker));
    }

    // 3) Per-asset stats.
    let assets = series
        .iter()
        .map(|s| asset_report(&s.ticker, &s.series, asof))
        .collect();

    // 4) Portfolio curve and stats.
    let fractions = weights.weights.fractions();
    let portfolio_series = aggregate(&series, &fractions)?;
    let stats = match portfolio_stats(&series, &fractions) {
        Ok(stats) => Some(stats),
        Err(AnalyticsError::InsufficientData(reason)) => {
            warn!(%reason, "portfolio stats unavailable");
            notes.push(format!("Portfolio statistics unavailable: {reason}."));
            None
        }
        Err(err) => return Err(err.into()),
    };

    // 5) Simulation at the expected return.
    let plan = stats.map(|s| ContributionPlan {
        initial_amount: config.initial_amount,
        periodic_amount: config.periodic_amount,
        contributions_per_year: config.frequency.per_year(),
        horizon_years: config.horizon.years(),
        annual_rate: s.expected_return_pct / 100.0,
    });
    let simulation = match &plan {
        Some(plan) => Some(simulate(plan)?),
        None => {
            notes.push("Simulation skipped: no expected return available.".to_string());
            None
        }
    };

    info!(
        assets = series.len(),
        portfolio_points = portfolio_series.len(),
        has_stats = stats.is_some(),
        "portfolio pass complete"
    );

    Ok(PortfolioRun {
        asof,
        weights,
        assets,
        series,
        portfolio_series,
        stats,
        plan,
        simulation,
        notes,
    })
}

/// Execute the single-ETF pipeline (performance table + chart overlays).
pub fn run_single(
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
    provider: &dyn PriceSeriesProvider,
) -> SingleRun {
    let series = fetch_or_empty(provider, ticker, start, end);
    SingleRun {
        ticker: ticker.to_string(),
        asof: end,
        report: asset_report(ticker, &series, end),
        indicators: IndicatorSet::compute(&series),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SyntheticProvider;
    use crate::domain::{ContributionFrequency, DataSource, Horizon};
    use crate::error::ProviderError;
    use rust_decimal_macros::dec;

    fn config(assets: &[&str]) -> PlannerConfig {
        PlannerConfig {
            source: DataSource::Synthetic,
            data_dir: None,
            seed: 42,
            start: NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            assets: assets.iter().map(|s| s.to_string()).collect(),
            weight_edits: None,
            normalize: false,
            initial_amount: 1000.0,
            periodic_amount: 100.0,
            frequency: ContributionFrequency::Monthly,
            horizon: Horizon::Five,
            export_trajectory: None,
            export_portfolio: None,
            export_json: None,
        }
    }

    /// Serves synthetic data except for tickers listed as failing.
    struct PartlyFailing {
        inner: SyntheticProvider,
        failing: &'static str,
    }

    impl PriceSeriesProvider for PartlyFailing {
        fn name(&self) -> &'static str {
            "partly-failing"
        }

        fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries, ProviderError> {
            if ticker == self.failing {
                return Err(ProviderError::NotFound(ticker.to_string()));
            }
            self.inner.fetch(ticker, start, end)
        }
    }

    #[test]
    fn full_pass_produces_stats_and_simulation() {
        let provider = SyntheticProvider::new(42);
        let run = run_portfolio(&config(&["SPY", "QQQ", "BND"]), &provider).unwrap();
        assert_eq!(run.assets.len(), 3);
        assert!(!run.portfolio_series.is_empty());
        assert!(run.stats.is_some());
        let sim = run.simulation.as_ref().unwrap();
        assert_eq!(sim.with_return.len(), 6);
        assert_eq!(sim.final_flat(), 7000.0);
        assert!(run.notes.is_empty(), "{:?}", run.notes);
        // 5 years of weekdays covers the 5Y window.
        assert!(run.assets[0].performance.iter().any(|r| r.window == "5Y"));

        let summary = run.summary(&config(&["SPY", "QQQ", "BND"]));
        assert_eq!(summary.source, "synthetic");
        assert!(summary.weights_balanced);
        assert_eq!(summary.assets.len(), 3);
    }

    #[test]
    fn failing_ticker_does_not_block_others() {
        let provider = PartlyFailing {
            inner: SyntheticProvider::new(42),
            failing: "QQQ",
        };
        let run = run_portfolio(&config(&["SPY", "QQQ"]), &provider).unwrap();
        assert!(!run.assets[0].performance.is_empty());
        assert!(run.assets[1].performance.is_empty());
        assert!(run.portfolio_series.is_empty());
        assert!(run.stats.is_none());
        assert!(run.simulation.is_none());
        assert!(run.notes.iter().any(|n| n.contains("QQQ")));
    }

    #[test]
    fn weight_edits_must_match_selection() {
        let mut cfg = config(&["SPY", "QQQ", "BND"]);
        cfg.weight_edits = Some(vec![50.0, 50.0]);
        let err = run_portfolio(&cfg, &SyntheticProvider::new(1)).unwrap_err();
        assert!(err.to_string().contains("dimension mismatch"));
    }

    #[test]
    fn unbalanced_weights_normalize_on_request() {
        let assets: Vec<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
        let (out, note) = resolve_weights(&assets, Some(&[60.0, 30.0, 5.0]), true).unwrap();
        assert!(note.is_none());
        assert!(out.normalized);
        assert_eq!(out.edited_status, WeightStatus::Unbalanced { total: dec!(95) });
        assert_eq!(out.weights.total(), dec!(100));

        let (out, note) = resolve_weights(&assets, Some(&[60.0, 30.0, 5.0]), false).unwrap();
        assert!(!out.normalized);
        assert!(note.is_none());
        assert_eq!(out.weights.total(), dec!(95));
    }

    #[test]
    fn zero_total_keeps_prior_weights() {
        let assets: Vec<String> = ["A", "B"].iter().map(|s| s.to_string()).collect();
        let (out, note) = resolve_weights(&assets, Some(&[0.0, 0.0]), true).unwrap();
        assert!(!out.normalized);
        assert!(note.is_some());
        assert_eq!(out.weights.total(), dec!(0));
    }

    #[test]
    fn single_run_has_indicators() {
        let provider = SyntheticProvider::new(3);
        let run = run_single(
            "GLD",
            NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            &provider,
        );
        let latest = run.indicators.latest().unwrap();
        assert!(latest.sma_short.is_some());
        assert!(latest.sma_long.is_some());
        assert!(run.report.performance.iter().any(|r| r.window == "1Y"));
    }
}
