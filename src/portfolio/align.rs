//! Date alignment across several price series.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use nalgebra::DMatrix;

use crate::domain::AssetSeries;

/// Prices restricted to the dates every series shares.
///
/// `prices` has one row per date (ascending) and one column per asset, in the
/// input order.
#[derive(Debug, Clone)]
pub struct AlignedPrices {
    pub dates: Vec<NaiveDate>,
    pub prices: DMatrix<f64>,
}

impl AlignedPrices {
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Daily fractional changes per asset.
    ///
    /// Row `i` is the change from date `i` to date `i + 1`. Rows holding any
    /// non-finite value (e.g. a zero price) are dropped.
    pub fn daily_returns(&self) -> DMatrix<f64> {
        let ncols = self.prices.ncols();
        let mut rows: Vec<f64> = Vec::new();
        let mut nrows = 0usize;
        for i in 1..self.prices.nrows() {
            let row: Vec<f64> = (0..ncols)
                .map(|j| self.prices[(i, j)] / self.prices[(i - 1, j)] - 1.0)
                .collect();
            if row.iter().all(|v| v.is_finite()) {
                rows.extend(row);
                nrows += 1;
            }
        }
        DMatrix::from_row_slice(nrows, ncols, &rows)
    }
}

/// Inner-join the series on date.
pub fn align(series: &[AssetSeries]) -> AlignedPrices {
    let mut common: Option<BTreeSet<NaiveDate>> = None;
    for s in series {
        let dates: BTreeSet<NaiveDate> = s.series.points().iter().map(|p| p.date).collect();
        common = Some(match common {
            None => dates,
            Some(mut set) => {
                set.retain(|d| dates.contains(d));
                set
            }
        });
    }
    let dates: Vec<NaiveDate> = common.unwrap_or_default().into_iter().collect();

    let lookups: Vec<HashMap<NaiveDate, f64>> = series
        .iter()
        .map(|s| s.series.points().iter().map(|p| (p.date, p.close)).collect())
        .collect();

    let prices = DMatrix::from_fn(dates.len(), series.len(), |i, j| {
        lookups[j].get(&dates[i]).copied().unwrap_or(f64::NAN)
    });

    AlignedPrices { dates, prices }
}
