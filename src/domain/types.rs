//! Shared domain types.
//!
//! These types are intentionally plain values: every derived quantity is
//! recomputed from its inputs on each run, so nothing here carries identity or
//! hidden state.

use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// The fixed ETF catalog a user can pick from.
pub const ETF_CATALOG: [&str; 9] = ["SPY", "QQQ", "EEM", "IVV", "IEMG", "VOO", "VTI", "BND", "GLD"];

/// Trading days used to annualize daily statistics.
pub const TRADING_DAYS_PER_YEAR: usize = 252;

/// A single closing price observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Chronologically ordered closing prices for one asset.
///
/// Dates are strictly increasing. Construction sorts the input and keeps the
/// last value seen for a duplicated date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(mut points: Vec<PricePoint>) -> Self {
        // Stable sort keeps input order among equal dates, so the later one wins below.
        points.sort_by_key(|p| p.date);
        let mut out: Vec<PricePoint> = Vec::with_capacity(points.len());
        for p in points {
            match out.last_mut() {
                Some(last) if last.date == p.date => *last = p,
                _ => out.push(p),
            }
        }
        Self { points: out }
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (NaiveDate, f64)>) -> Self {
        Self::new(
            pairs
                .into_iter()
                .map(|(date, close)| PricePoint { date, close })
                .collect(),
        )
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// The trailing `n` observations (all of them if `n >= len`).
    pub fn tail(&self, n: usize) -> &[PricePoint] {
        let start = self.points.len().saturating_sub(n);
        &self.points[start..]
    }
}

/// A price series tagged with its ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetSeries {
    pub ticker: String,
    pub series: PriceSeries,
}

impl AssetSeries {
    pub fn new(ticker: impl Into<String>, series: PriceSeries) -> Self {
        Self {
            ticker: ticker.into(),
            series,
        }
    }
}

/// Memoization key for provider fetches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesKey {
    pub ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// How long a performance window is.
///
/// `TradingDays` counts rows directly. `YearToDate` counts *calendar* days since
/// 1 January of the as-of year and then uses that number as a row count, so a
/// YTD window reaches further back than the same number of trading days would.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowSpan {
    TradingDays(usize),
    YearToDate,
}

/// A named trailing period used to slice a series from its tail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceWindow {
    pub label: String,
    pub span: WindowSpan,
}

impl PerformanceWindow {
    pub fn trading_days(label: impl Into<String>, days: usize) -> Self {
        Self {
            label: label.into(),
            span: WindowSpan::TradingDays(days),
        }
    }

    /// Number of rows this window covers as of `asof`.
    pub fn resolve_days(&self, asof: NaiveDate) -> usize {
        match self.span {
            WindowSpan::TradingDays(days) => days,
            WindowSpan::YearToDate => {
                let jan1 = NaiveDate::from_ymd_opt(asof.year(), 1, 1).unwrap_or(asof);
                (asof - jan1).num_days().max(0) as usize
            }
        }
    }

    /// The windows shown in the performance table, in display order.
    pub fn standard() -> Vec<PerformanceWindow> {
        vec![
            PerformanceWindow::trading_days("1M", 21),
            PerformanceWindow::trading_days("3M", 63),
            PerformanceWindow::trading_days("6M", 126),
            PerformanceWindow::trading_days("1Y", TRADING_DAYS_PER_YEAR),
            PerformanceWindow {
                label: "YTD".to_string(),
                span: WindowSpan::YearToDate,
            },
            PerformanceWindow::trading_days("3Y", TRADING_DAYS_PER_YEAR * 3),
            PerformanceWindow::trading_days("5Y", TRADING_DAYS_PER_YEAR * 5),
            PerformanceWindow::trading_days("10Y", TRADING_DAYS_PER_YEAR * 10),
        ]
    }
}

/// Return and annualized volatility over one trailing window (percent, 2dp).
///
/// Volatility is `None` when the window holds fewer than two daily changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodStats {
    pub return_pct: f64,
    pub volatility_pct: Option<f64>,
}

/// One row of a performance table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRow {
    pub window: String,
    pub days: usize,
    pub stats: PeriodStats,
}

/// Portfolio-level expected return and volatility (annualized, percent, 2dp).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioStats {
    pub expected_return_pct: f64,
    pub volatility_pct: f64,
}

/// Inputs to the contribution simulator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContributionPlan {
    pub initial_amount: f64,
    pub periodic_amount: f64,
    pub contributions_per_year: u32,
    pub horizon_years: u32,
    /// Decimal annual rate (0.08 = 8%). May be negative.
    pub annual_rate: f64,
}

/// Yearly wealth values, index = year (year 0 is the initial amount).
pub type WealthTrajectory = Vec<f64>;

/// The two parallel trajectories produced by a simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub with_return: WealthTrajectory,
    pub flat: WealthTrajectory,
}

impl SimulationResult {
    pub fn final_with_return(&self) -> f64 {
        self.with_return.last().copied().unwrap_or(0.0)
    }

    pub fn final_flat(&self) -> f64 {
        self.flat.last().copied().unwrap_or(0.0)
    }
}

/// How often contributions are made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ContributionFrequency {
    Monthly,
    Semiannual,
    Annual,
}

impl ContributionFrequency {
    pub fn per_year(self) -> u32 {
        match self {
            ContributionFrequency::Monthly => 12,
            ContributionFrequency::Semiannual => 2,
            ContributionFrequency::Annual => 1,
        }
    }
}

/// Investment horizons offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Horizon {
    #[value(name = "5")]
    Five,
    #[value(name = "10")]
    Ten,
    #[value(name = "15")]
    Fifteen,
    #[value(name = "20")]
    Twenty,
}

impl Horizon {
    pub fn years(self) -> u32 {
        match self {
            Horizon::Five => 5,
            Horizon::Ten => 10,
            Horizon::Fifteen => 15,
            Horizon::Twenty => 20,
        }
    }
}

/// Where price series come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Yahoo Finance chart API (network).
    Yahoo,
    /// `<TICKER>.csv` files in `--data-dir`.
    Csv,
    /// Deterministic synthetic prices (offline).
    Synthetic,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub source: DataSource,
    pub data_dir: Option<PathBuf>,
    pub seed: u64,

    pub start: NaiveDate,
    pub end: NaiveDate,

    pub assets: Vec<String>,
    /// Raw percentage edits in asset order; `None` keeps the equal split.
    pub weight_edits: Option<Vec<f64>>,
    pub normalize: bool,

    pub initial_amount: f64,
    pub periodic_amount: f64,
    pub frequency: ContributionFrequency,
    pub horizon: Horizon,

    pub export_trajectory: Option<PathBuf>,
    pub export_portfolio: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn price_series_sorts_and_dedups() {
        let s = PriceSeries::from_pairs([
            (d(2024, 1, 3), 3.0),
            (d(2024, 1, 1), 1.0),
            (d(2024, 1, 3), 30.0),
            (d(2024, 1, 2), 2.0),
        ]);
        assert_eq!(s.len(), 3);
        assert_eq!(s.closes(), vec![1.0, 2.0, 30.0]);
        assert_eq!(s.tail(2).len(), 2);
        assert_eq!(s.tail(10).len(), 3);
    }

    #[test]
    fn ytd_counts_calendar_days() {
        let ytd = PerformanceWindow {
            label: "YTD".into(),
            span: WindowSpan::YearToDate,
        };
        assert_eq!(ytd.resolve_days(d(2024, 3, 1)), 60);
        assert_eq!(ytd.resolve_days(d(2024, 1, 1)), 0);
        assert_eq!(PerformanceWindow::trading_days("1Y", 252).resolve_days(d(2024, 3, 1)), 252);
    }

    #[test]
    fn enumerated_plan_values() {
        assert_eq!(ContributionFrequency::Monthly.per_year(), 12);
        assert_eq!(ContributionFrequency::Semiannual.per_year(), 2);
        assert_eq!(Horizon::Twenty.years(), 20);
        assert_eq!(PerformanceWindow::standard().len(), 8);
    }
}
