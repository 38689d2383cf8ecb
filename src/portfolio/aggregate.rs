//! Weighted portfolio value series.

use tracing::debug;

use crate::domain::{AssetSeries, PricePoint, PriceSeries};
use crate::error::AnalyticsError;
use crate::portfolio::align::align;

/// Combine asset prices into one portfolio value per shared date.
///
/// `weights` are fractions in the same order as `series`. A length mismatch
/// fails before any work is done. Empty inputs produce an empty series.
pub fn aggregate(series: &[AssetSeries], weights: &[f64]) -> Result<PriceSeries, AnalyticsError> {
    if weights.len() != series.len() {
        return Err(AnalyticsError::DimensionMismatch {
            expected: series.len(),
            actual: weights.len(),
        });
    }

    let aligned = align(series);
    let points = aligned
        .dates
        .iter()
        .enumerate()
        .map(|(i, &date)| PricePoint {
            date,
            close: weights
                .iter()
                .enumerate()
                .map(|(j, w)| aligned.prices[(i, j)] * w)
                .sum(),
        })
        .collect();

    let out = PriceSeries::new(points);
    debug!(assets = series.len(), dates = out.len(), "aggregated portfolio series");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, day).unwrap()
    }

    #[test]
    fn three_overlapping_dates_give_three_points() {
        let a = AssetSeries::new(
            "A",
            PriceSeries::from_pairs([(d(1), 10.0), (d(2), 11.0), (d(5), 12.0), (d(6), 13.0), (d(7), 14.0)]),
        );
        let b = AssetSeries::new(
            "B",
            PriceSeries::from_pairs([(d(2), 100.0), (d(3), 101.0), (d(6), 102.0), (d(7), 103.0), (d(8), 104.0)]),
        );
        let out = aggregate(&[a, b], &[0.5, 0.5]).unwrap();
        assert_eq!(out.len(), 3);
        let first = out.first().unwrap();
        assert_eq!(first.date, d(2));
        assert!((first.close - (11.0 * 0.5 + 100.0 * 0.5)).abs() < 1e-12);
        assert_eq!(out.last().unwrap().date, d(7));
    }

    #[test]
    fn dimension_mismatch_produces_no_output() {
        let series: Vec<AssetSeries> = ["A", "B", "C"]
            .iter()
            .map(|t| AssetSeries::new(*t, PriceSeries::from_pairs([(d(1), 1.0)])))
            .collect();
        let err = aggregate(&series, &[0.5, 0.5]).unwrap_err();
        assert_eq!(err, AnalyticsError::DimensionMismatch { expected: 3, actual: 2 });
    }

    #[test]
    fn empty_input_series_is_no_data_not_an_error() {
        let a = AssetSeries::new("A", PriceSeries::from_pairs([(d(1), 1.0)]));
        let b = AssetSeries::new("B", PriceSeries::empty());
        let out = aggregate(&[a, b], &[0.5, 0.5]).unwrap();
        assert!(out.is_empty());
    }
}
