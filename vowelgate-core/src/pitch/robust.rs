//! Order statistics used by the pitch-range pipeline.
//!
//! All functions expect finite input. Callers filter non-finite values
//! first.

/// Scale factor making MAD a consistent estimator of σ under normality.
pub const MAD_SCALE: f64 = 1.4826;

/// Added to the MAD so a constant pool does not divide by zero.
pub const MAD_EPSILON: f64 = 1e-9;

pub(crate) fn sorted(values: &[f64]) -> Vec<f64> {
    let mut v = values.to_vec();
    v.sort_by(f64::total_cmp);
    v
}

/// Linear-interpolation percentile of already sorted data, `pct` in [0, 100].
pub fn percentile_sorted(sorted: &[f64], pct: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let rank = (pct / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

pub fn percentile(values: &[f64], pct: f64) -> Option<f64> {
    percentile_sorted(&sorted(values), pct)
}

/// Median; the mean of the two middle values for even-sized input.
pub fn median(values: &[f64]) -> Option<f64> {
    percentile(values, 50.0)
}

/// Robust |z| of every value: `|x - median| / (MAD_SCALE * (MAD + ε))`.
pub fn robust_abs_z(values: &[f64]) -> Vec<f64> {
    let Some(center) = median(values) else {
        return Vec::new();
    };
    let deviations: Vec<f64> = values.iter().map(|v| (v - center).abs()).collect();
    let mad = median(&deviations).unwrap_or(0.0) + MAD_EPSILON;
    let scale = MAD_SCALE * mad;
    deviations.iter().map(|d| d / scale).collect()
}

/// Round to two decimal places. Magnitudes too large to scale are returned
/// unchanged.
pub fn round2(x: f64) -> f64 {
    let scaled = x * 100.0;
    if !scaled.is_finite() {
        return x;
    }
    scaled.round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn percentile_interpolates_between_order_statistics() {
        let v: Vec<f64> = (1..=10).map(f64::from).collect();
        // rank = 0.05 * 9 = 0.45
        assert_abs_diff_eq!(percentile(&v, 5.0).unwrap(), 1.45, epsilon = 1e-12);
        // rank = 0.95 * 9 = 8.55
        assert_abs_diff_eq!(percentile(&v, 95.0).unwrap(), 9.55, epsilon = 1e-12);
        assert_eq!(percentile(&v, 0.0), Some(1.0));
        assert_eq!(percentile(&v, 100.0), Some(10.0));
    }

    #[test]
    fn single_value_percentile() {
        assert_eq!(percentile(&[42.0], 5.0), Some(42.0));
        assert_eq!(percentile(&[42.0], 95.0), Some(42.0));
    }

    #[test]
    fn robust_z_flags_outlier() {
        let v = [1.0, 1.1, 0.9, 1.0, 1.05, 0.95, 10.0];
        let z = robust_abs_z(&v);
        assert_eq!(z.len(), v.len());
        assert!(z[6] > 3.5);
        assert!(z[..6].iter().all(|&x| x < 3.5));
    }

    #[test]
    fn robust_z_of_constant_pool_is_finite() {
        let z = robust_abs_z(&[2.0; 5]);
        assert!(z.iter().all(|x| x.is_finite() && *x == 0.0));
    }

    #[test]
    fn round2_rounds_half_away_from_zero() {
        assert_eq!(round2(90.0), 90.0);
        assert_eq!(round2(123.456), 123.46);
        assert_eq!(round2(-1.234), -1.23);
    }

    #[test]
    fn round2_keeps_huge_values_finite() {
        assert_eq!(round2(1e307), 1e307);
        assert_eq!(round2(-f64::MAX), -f64::MAX);
    }
}
