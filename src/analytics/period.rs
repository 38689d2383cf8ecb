//! Trailing-window return and annualized volatility for a single series.

use chrono::NaiveDate;

use crate::domain::{PerformanceRow, PerformanceWindow, PeriodStats, PriceSeries, TRADING_DAYS_PER_YEAR};
use crate::math::{pct_change, round2, sample_std};

/// Stats over the trailing `window_days` observations.
///
/// The window's first observation is the return base and contributes no daily
/// change to the volatility sample. Returns `None` when the window is empty or
/// longer than the series. Windows of one or two observations keep their
/// return but have no volatility.
pub fn period_stats(series: &PriceSeries, window_days: usize) -> Option<PeriodStats> {
    if window_days == 0 || series.len() < window_days {
        return None;
    }
    let closes: Vec<f64> = series.tail(window_days).iter().map(|p| p.close).collect();
    let first = *closes.first()?;
    let last = *closes.last()?;

    let return_pct = (last / first - 1.0) * 100.0;
    if !return_pct.is_finite() {
        return None;
    }
    let volatility_pct = sample_std(&pct_change(&closes))
        .map(|std| std * (TRADING_DAYS_PER_YEAR as f64).sqrt() * 100.0)
        .filter(|v| v.is_finite())
        .map(round2);

    Some(PeriodStats {
        return_pct: round2(return_pct),
        volatility_pct,
    })
}

/// Evaluate every window in order, keeping only the computable rows.
pub fn performance_table(
    series: &PriceSeries,
    windows: &[PerformanceWindow],
    asof: NaiveDate,
) -> Vec<PerformanceRow> {
    windows
        .iter()
        .filter_map(|w| {
            let days = w.resolve_days(asof);
            period_stats(series, days).map(|stats| PerformanceRow {
                window: w.label.clone(),
                days,
                stats,
            })
        })
        .collect()
}
