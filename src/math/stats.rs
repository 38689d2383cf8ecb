//! Descriptive statistics over plain slices.
//!
//! Conventions:
//! - daily change at index `i` is `x[i] / x[i-1] - 1`; the first observation has none
//! - standard deviation and covariance use the sample (`n - 1`) denominator

/// Round to 2 decimals (half away from zero).
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Period-over-period fractional changes. Output length is `len - 1`.
pub fn pct_change(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation. `None` for fewer than two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let n = values.len() as f64;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1.0);
    Some(var.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pct_change_drops_first_observation() {
        let c = pct_change(&[100.0, 110.0, 99.0]);
        assert_eq!(c.len(), 2);
        assert!((c[0] - 0.10).abs() < 1e-12);
        assert!((c[1] + 0.10).abs() < 1e-12);
    }

    #[test]
    fn sample_std_uses_n_minus_one() {
        // Population std of [1,2,3,4] is ~1.118; sample std is ~1.291.
        let s = sample_std(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!((s - 1.290_994_448_7).abs() < 1e-9);
        assert!(sample_std(&[1.0]).is_none());
        assert!(mean(&[]).is_none());
    }

    #[test]
    fn round2_basic() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(-1.236), -1.24);
        assert_eq!(round2(0.0), 0.0);
    }
}
