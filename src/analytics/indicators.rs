//! Technical overlays for a single ETF chart.
//!
//! The numbers behind the price chart: two simple moving averages and a
//! momentum oscillator. The oscillator is the simplified form
//! `100 - 100 / (1 + mean(r) / std(r))` over a rolling window of daily changes
//! `r`. It is *not* Wilder's RSI and can leave the 0..100 range.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::PriceSeries;
use crate::math::{mean, pct_change, sample_std};

pub const SMA_SHORT: usize = 50;
pub const SMA_LONG: usize = 200;
pub const OSCILLATOR_WINDOW: usize = 14;
pub const OVERBOUGHT: f64 = 70.0;
pub const OVERSOLD: f64 = 30.0;

/// Indicator columns aligned with the input dates.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorSet {
    pub dates: Vec<NaiveDate>,
    pub close: Vec<f64>,
    pub sma_short: Vec<Option<f64>>,
    pub sma_long: Vec<Option<f64>>,
    pub oscillator: Vec<Option<f64>>,
}

/// The most recent value of each column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSnapshot {
    pub date: NaiveDate,
    pub close: f64,
    pub sma_short: Option<f64>,
    pub sma_long: Option<f64>,
    pub oscillator: Option<f64>,
}

impl IndicatorSet {
    pub fn compute(series: &PriceSeries) -> Self {
        let close = series.closes();
        Self {
            dates: series.points().iter().map(|p| p.date).collect(),
            sma_short: sma(&close, SMA_SHORT),
            sma_long: sma(&close, SMA_LONG),
            oscillator: momentum_oscillator(&close, OSCILLATOR_WINDOW),
            close,
        }
    }

    pub fn latest(&self) -> Option<IndicatorSnapshot> {
        let i = self.dates.len().checked_sub(1)?;
        Some(IndicatorSnapshot {
            date: self.dates[i],
            close: self.close[i],
            sma_short: self.sma_short[i],
            sma_long: self.sma_long[i],
            oscillator: self.oscillator[i],
        })
    }
}

/// Simple moving average; `None` until `window` values are available.
pub fn sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                mean(&values[i + 1 - window..=i])
            }
        })
        .collect()
}

/// Rolling `100 - 100 / (1 + mean/std)` of daily changes.
///
/// Index `i` uses the changes ending at `i`, so the first defined value is at
/// `i = window`. Undefined where the std is zero or the result is not finite.
pub fn momentum_oscillator(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let changes = pct_change(values);
    (0..values.len())
        .map(|i| {
            if window < 2 || i < window {
                return None;
            }
            // changes[k] is the move from values[k] to values[k + 1].
            let slice = &changes[i - window..i];
            let m = mean(slice)?;
            let s = sample_std(slice)?;
            if s == 0.0 {
                return None;
            }
            let v = 100.0 - 100.0 / (1.0 + m / s);
            v.is_finite().then_some(v)
        })
        .collect()
}
