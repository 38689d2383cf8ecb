//! Export run results.
//!
//! - yearly trajectories as CSV (`year,with_return,flat`)
//! - the weighted portfolio curve as CSV (`date,value`)
//! - a JSON run summary for downstream scripts
//!
//! The CSV files are meant to be easy to consume in spreadsheets.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{ContributionPlan, PerformanceRow, PortfolioStats, PriceSeries, SimulationResult};
use crate::error::{AppError, EXIT_RUNTIME};
use crate::portfolio::WeightSet;

/// Per-asset section of the run summary.
#[derive(Debug, Clone, Serialize)]
pub struct AssetSummary {
    pub ticker: String,
    pub observations: usize,
    pub performance: Vec<PerformanceRow>,
}

/// Portable JSON representation of one `portfolio` run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub tool: String,
    pub source: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub weights: WeightSet,
    pub weights_balanced: bool,
    pub assets: Vec<AssetSummary>,
    pub portfolio: Option<PortfolioStats>,
    pub plan: Option<ContributionPlan>,
    pub simulation: Option<SimulationResult>,
    pub notes: Vec<String>,
}

fn create(path: &Path, what: &str) -> Result<csv::Writer<File>, AppError> {
    csv::Writer::from_path(path)
        .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to create {what} '{}': {e}", path.display())))
}

/// Write both yearly trajectories, one row per year starting at year 0.
pub fn write_trajectory_csv(path: &Path, result: &SimulationResult) -> Result<(), AppError> {
    let mut writer = create(path, "trajectory CSV")?;
    let write_err = |e: csv::Error| AppError::new(EXIT_RUNTIME, format!("Failed to write trajectory CSV: {e}"));

    writer.write_record(["year", "with_return", "flat"]).map_err(write_err)?;
    for (year, (with_return, flat)) in result.with_return.iter().zip(&result.flat).enumerate() {
        writer
            .write_record([year.to_string(), format!("{with_return:.2}"), format!("{flat:.2}")])
            .map_err(write_err)?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to flush trajectory CSV: {e}")))?;
    Ok(())
}

/// Write the weighted portfolio curve.
pub fn write_portfolio_csv(path: &Path, series: &PriceSeries) -> Result<(), AppError> {
    let mut writer = create(path, "portfolio CSV")?;
    let write_err = |e: csv::Error| AppError::new(EXIT_RUNTIME, format!("Failed to write portfolio CSV: {e}"));

    writer.write_record(["date", "value"]).map_err(write_err)?;
    for p in series.points() {
        writer
            .write_record([p.date.to_string(), format!("{:.6}", p.close)])
            .map_err(write_err)?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to flush portfolio CSV: {e}")))?;
    Ok(())
}

/// Write the run summary as pretty-printed JSON.
pub fn write_summary_json(path: &Path, summary: &RunSummary) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(EXIT_RUNTIME, format!("Failed to create summary JSON '{}': {e}", path.display()))
    })?;
    serde_json::to_writer_pretty(file, summary)
        .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to write summary JSON: {e}")))?;
    Ok(())
}
