//! Column statistics for return matrices.
//!
//! A return matrix has one row per date and one column per asset. The analyzer
//! needs the column means, the sample covariance and the quadratic form
//! `wᵀ Σ w`; all three are small dense operations, so we use nalgebra's dynamic
//! matrices rather than hand-written loops.

use nalgebra::{DMatrix, DVector};

/// Mean of each column. Returns a zero-length vector for an empty matrix.
pub fn column_means(returns: &DMatrix<f64>) -> DVector<f64> {
    if returns.nrows() == 0 {
        return DVector::zeros(returns.ncols());
    }
    returns.row_mean().transpose()
}

/// Sample covariance matrix (`n - 1` denominator).
///
/// Returns `None` when fewer than two rows are available.
pub fn sample_covariance(returns: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    let n = returns.nrows();
    if n < 2 {
        return None;
    }
    let means = column_means(returns);
    let centered = DMatrix::from_fn(n, returns.ncols(), |i, j| returns[(i, j)] - means[j]);
    Some((centered.transpose() * &centered) / (n as f64 - 1.0))
}

/// `wᵀ · m · w`.
pub fn quadratic_form(m: &DMatrix<f64>, w: &DVector<f64>) -> f64 {
    (w.transpose() * m * w)[(0, 0)]
}
