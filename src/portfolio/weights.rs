//! Portfolio weights: equal-split initialization, balance checks and
//! proportional normalization.
//!
//! Percentages are exact decimals. Normalization rounds every rescaled value to
//! two decimals (banker's rounding) and then assigns the whole rounding residual
//! to the *last* asset in display order, so the normalized set always sums to
//! exactly `100.00`. Distributing the residual would also satisfy the sum, but
//! it changes which value users see adjusted; the last-element rule is kept.

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::AnalyticsError;

/// Tolerance for treating a weight total as 100.
const BALANCE_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 6);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetWeight {
    pub asset: String,
    pub percent: Decimal,
}

/// Whether a weight set adds up to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightStatus {
    Balanced,
    Unbalanced { total: Decimal },
}

/// Ordered `(asset, percentage)` pairs with unique assets.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeightSet {
    weights: Vec<AssetWeight>,
}

impl WeightSet {
    /// Fresh equal split (`100 / count`, unrounded) for a selection.
    ///
    /// Duplicate tickers keep their first position.
    pub fn for_selection(assets: &[String]) -> Self {
        let mut unique: Vec<&String> = Vec::with_capacity(assets.len());
        for asset in assets {
            if !unique.contains(&asset) {
                unique.push(asset);
            }
        }
        if unique.is_empty() {
            return Self::default();
        }
        let share = Decimal::ONE_HUNDRED / Decimal::from(unique.len());
        Self {
            weights: unique
                .into_iter()
                .map(|asset| AssetWeight {
                    asset: asset.clone(),
                    percent: share,
                })
                .collect(),
        }
    }

    /// Build from explicit pairs (display order is the input order).
    pub fn from_pairs<S: Into<String>>(
        pairs: impl IntoIterator<Item = (S, Decimal)>,
    ) -> Result<Self, AnalyticsError> {
        let mut weights: Vec<AssetWeight> = Vec::new();
        for (asset, percent) in pairs {
            let asset = asset.into();
            if weights.iter().any(|w| w.asset == asset) {
                return Err(AnalyticsError::InvalidInput(format!("duplicate asset {asset}")));
            }
            weights.push(AssetWeight { asset, percent });
        }
        Ok(Self { weights })
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssetWeight> {
        self.weights.iter()
    }

    pub fn assets(&self) -> Vec<String> {
        self.weights.iter().map(|w| w.asset.clone()).collect()
    }

    pub fn percent_of(&self, asset: &str) -> Option<Decimal> {
        self.weights.iter().find(|w| w.asset == asset).map(|w| w.percent)
    }

    fn same_selection(&self, assets: &[String]) -> bool {
        self.weights.len() == assets.len()
            && self.weights.iter().zip(assets).all(|(w, a)| &w.asset == a)
    }

    /// Edit a single asset's percentage. Out-of-range values are allowed.
    pub fn set_weight(&mut self, asset: &str, percent: Decimal) -> Result<(), AnalyticsError> {
        let slot = self
            .weights
            .iter_mut()
            .find(|w| w.asset == asset)
            .ok_or_else(|| AnalyticsError::InvalidInput(format!("{asset} is not in the selection")))?;
        slot.percent = percent;
        Ok(())
    }

    /// Replace every percentage, in display order.
    pub fn apply_edits(&mut self, values: &[f64]) -> Result<(), AnalyticsError> {
        if values.len() != self.weights.len() {
            return Err(AnalyticsError::DimensionMismatch {
                expected: self.weights.len(),
                actual: values.len(),
            });
        }
        let mut parsed = Vec::with_capacity(values.len());
        for &v in values {
            let d = Decimal::from_f64(v)
                .ok_or_else(|| AnalyticsError::InvalidInput(format!("weight {v} is not a finite number")))?;
            parsed.push(d);
        }
        for (w, d) in self.weights.iter_mut().zip(parsed) {
            w.percent = d;
        }
        Ok(())
    }

    pub fn total(&self) -> Decimal {
        self.weights.iter().map(|w| w.percent).sum()
    }

    pub fn status(&self) -> WeightStatus {
        let total = self.total();
        if (total - Decimal::ONE_HUNDRED).abs() <= BALANCE_EPSILON {
            WeightStatus::Balanced
        } else {
            WeightStatus::Unbalanced { total }
        }
    }

    /// Rescale so the set sums to exactly 100.
    ///
    /// Each weight is scaled by `100 / total` in `f64` and rounded to 2 decimals
    /// half-to-even on the binary value, matching how a float array would round.
    /// The rounding residual `100 - sum` is then added to the last weight in
    /// `Decimal`, so the result sums to exactly 100.00.
    ///
    /// Fails with `DivisionByZero` when the total is zero; the caller keeps the
    /// current weights in that case.
    pub fn normalize(&self) -> Result<WeightSet, AnalyticsError> {
        let total = self.total();
        if total.is_zero() {
            return Err(AnalyticsError::DivisionByZero);
        }
        let float_total: f64 = self.weights.iter().map(|w| w.percent.to_f64().unwrap_or(f64::NAN)).sum();
        let scale = 100.0 / float_total;
        if !scale.is_finite() {
            return Err(AnalyticsError::InvalidInput(format!("weight total {total} is out of range")));
        }

        let mut weights = Vec::with_capacity(self.weights.len());
        for w in &self.weights {
            let scaled = round_half_even_2dp(w.percent.to_f64().unwrap_or(f64::NAN) * scale);
            let percent = Decimal::from_f64(scaled)
                .ok_or_else(|| AnalyticsError::InvalidInput(format!("weight {} is out of range", w.percent)))?
                .round_dp(2);
            weights.push(AssetWeight {
                asset: w.asset.clone(),
                percent,
            });
        }

        let rounded_sum: Decimal = weights.iter().map(|w| w.percent).sum();
        let residual = Decimal::ONE_HUNDRED - rounded_sum;
        if let Some(last) = weights.last_mut() {
            last.percent += residual;
        }
        debug!(%total, %residual, "normalized weights");

        Ok(WeightSet { weights })
    }

    /// Weights as fractions (`percent / 100`) in display order.
    pub fn fractions(&self) -> Vec<f64> {
        self.weights
            .iter()
            .map(|w| (w.percent / Decimal::ONE_HUNDRED).to_f64().unwrap_or(f64::NAN))
            .collect()
    }
}

fn round_half_even_2dp(x: f64) -> f64 {
    (x * 100.0).round_ties_even() / 100.0
}

/// Selection-change transition.
///
/// Keeps `previous` when the ordered selection is unchanged; any change
/// (including reordering) yields a fresh equal split and discards edits.
pub fn reconcile_selection(previous: Option<WeightSet>, assets: &[String]) -> WeightSet {
    match previous {
        Some(set) if set.same_selection(assets) => set,
        Some(_) => {
            info!(?assets, "selection changed; weights reset to an equal split");
            WeightSet::for_selection(assets)
        }
        None => WeightSet::for_selection(assets),
    }
}
