//! Portfolio-level expected return and volatility.
//!
//! Given aligned daily returns `R` (rows = dates, columns = assets) and weights
//! `w` as fractions:
//!
//! - `expected_return = mean(R) · w * 252 * 100`
//! - `Σ = cov(R) * 252` (sample covariance, annualized)
//! - `volatility = sqrt(wᵀ Σ w) * 100`

use nalgebra::DVector;
use tracing::debug;

use crate::domain::{AssetSeries, PortfolioStats, TRADING_DAYS_PER_YEAR};
use crate::error::AnalyticsError;
use crate::math::{column_means, quadratic_form, round2, sample_covariance};
use crate::portfolio::align;

pub fn portfolio_stats(series: &[AssetSeries], weights: &[f64]) -> Result<PortfolioStats, AnalyticsError> {
    if weights.len() != series.len() {
        return Err(AnalyticsError::DimensionMismatch {
            expected: series.len(),
            actual: weights.len(),
        });
    }

    let returns = align(series).daily_returns();
    if returns.nrows() < 2 {
        return Err(AnalyticsError::InsufficientData(format!(
            "{} aligned daily returns; at least 2 are needed",
            returns.nrows()
        )));
    }

    let annual = TRADING_DAYS_PER_YEAR as f64;
    let w = DVector::from_row_slice(weights);

    let means = column_means(&returns);
    let expected_return = means.dot(&w) * annual * 100.0;

    let covariance = sample_covariance(&returns)
        .ok_or_else(|| AnalyticsError::InsufficientData("covariance needs 2 rows".into()))?
        * annual;
    // Rounding can push a zero variance slightly negative.
    let variance = quadratic_form(&covariance, &w).max(0.0);
    let volatility = variance.sqrt() * 100.0;

    debug!(rows = returns.nrows(), expected_return, volatility, "portfolio stats");

    if !(expected_return.is_finite() && volatility.is_finite()) {
        return Err(AnalyticsError::InsufficientData("non-finite portfolio statistics".into()));
    }
    Ok(PortfolioStats {
        expected_return_pct: round2(expected_return),
        volatility_pct: round2(volatility),
    })
}
