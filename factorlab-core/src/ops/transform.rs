//! Lag, difference, and window-shape transforms.

/// Value at t−k, NaN for the first k points. `delay(x, 0)` is a copy.
pub fn delay(x: &[f64], k: usize) -> Vec<f64> {
    let n = x.len();
    let mut out = vec![f64::NAN; n];
    for i in k..n {
        out[i] = x[i - k];
    }
    out
}

/// Difference x(t) − x(t−k), NaN for the first k points.
pub fn delta(x: &[f64], k: usize) -> Vec<f64> {
    let n = x.len();
    let mut out = vec![f64::NAN; n];
    for i in k..n {
        out[i] = x[i] - x[i - k];
    }
    out
}

/// Sign with zero mapped to zero and NaN preserved.
pub fn sign(v: f64) -> f64 {
    if v.is_nan() {
        f64::NAN
    } else if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Percentile rank in [0, 1] of x(t) among the trailing w observations.
///
/// Ties are averaged: the rank of the last value is the mean 1-based rank
/// of its tie group, divided by w. NaN anywhere in the window yields NaN.
pub fn ts_rank(x: &[f64], w: usize) -> Vec<f64> {
    let n = x.len();
    let mut out = vec![f64::NAN; n];
    if w == 0 || w > n {
        return out;
    }
    for i in (w - 1)..n {
        let window = &x[i + 1 - w..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        let last = x[i];
        let below = window.iter().filter(|&&v| v < last).count();
        let tied = window.iter().filter(|&&v| v == last).count();
        let avg_rank = below as f64 + (tied as f64 + 1.0) / 2.0;
        out[i] = avg_rank / w as f64;
    }
    out
}

/// Linearly decaying weighted average over the trailing w observations.
///
/// Weights 1..w normalized to sum to 1, the newest point heaviest, so the
/// output is a convex combination of the window's values.
pub fn decay_linear(x: &[f64], w: usize) -> Vec<f64> {
    let n = x.len();
    let mut out = vec![f64::NAN; n];
    if w == 0 || w > n {
        return out;
    }
    let total = (w * (w + 1)) as f64 / 2.0;
    for i in (w - 1)..n {
        let window = &x[i + 1 - w..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        out[i] = window
            .iter()
            .enumerate()
            .map(|(j, v)| v * (j + 1) as f64 / total)
            .sum();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn delay_shifts_forward() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let out = delay(&x, 2);
        assert!(out[0].is_nan());
        assert!(out[1].is_nan());
        assert_eq!(out[2], 1.0);
        assert_eq!(out[3], 2.0);
    }

    #[test]
    fn delay_zero_is_identity() {
        let x = [1.0, 2.0];
        assert_eq!(delay(&x, 0), vec![1.0, 2.0]);
    }

    #[test]
    fn delta_basic() {
        let x = [1.0, 4.0, 9.0];
        let out = delta(&x, 1);
        assert!(out[0].is_nan());
        assert_eq!(out[1], 3.0);
        assert_eq!(out[2], 5.0);
    }

    #[test]
    fn delta_propagates_nan_operands() {
        let x = [1.0, f64::NAN, 3.0];
        let out = delta(&x, 1);
        assert!(out[1].is_nan());
        assert!(out[2].is_nan());
    }

    #[test]
    fn sign_maps_zero_to_zero() {
        assert_eq!(sign(3.5), 1.0);
        assert_eq!(sign(-0.1), -1.0);
        assert_eq!(sign(0.0), 0.0);
        assert!(sign(f64::NAN).is_nan());
    }

    #[test]
    fn ts_rank_strictly_increasing_is_one() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let out = ts_rank(&x, 3);
        assert!(out[1].is_nan());
        assert_approx(out[2], 1.0, DEFAULT_EPSILON);
        assert_approx(out[4], 1.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ts_rank_smallest_last() {
        // Window [3, 2, 1]: last value ranks 1 of 3.
        let x = [3.0, 2.0, 1.0];
        let out = ts_rank(&x, 3);
        assert_approx(out[2], 1.0 / 3.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ts_rank_ties_averaged() {
        // Window [2, 1, 2]: last value ties with position 0.
        // Tie group occupies ranks 2 and 3 → average 2.5, pct 2.5/3.
        let x = [2.0, 1.0, 2.0];
        let out = ts_rank(&x, 3);
        assert_approx(out[2], 2.5 / 3.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ts_rank_in_unit_interval() {
        let x = [5.0, 3.0, 8.0, 8.0, 1.0, 4.0, 4.0, 9.0];
        for v in ts_rank(&x, 4).iter().filter(|v| !v.is_nan()) {
            assert!((0.0..=1.0).contains(v), "ts_rank out of range: {v}");
        }
    }

    #[test]
    fn ts_rank_nan_window_propagates() {
        let x = [1.0, f64::NAN, 3.0, 4.0];
        let out = ts_rank(&x, 2);
        assert!(out[1].is_nan());
        assert!(out[2].is_nan());
        assert!(!out[3].is_nan());
    }

    #[test]
    fn decay_linear_weights_sum_to_one() {
        // Constant input: any normalized weighting returns the constant.
        let x = [7.0; 6];
        let out = decay_linear(&x, 4);
        assert_approx(out[3], 7.0, DEFAULT_EPSILON);
        assert_approx(out[5], 7.0, DEFAULT_EPSILON);
    }

    #[test]
    fn decay_linear_known_value() {
        // Window [1, 2, 3], weights [1/6, 2/6, 3/6] → (1 + 4 + 9)/6.
        let x = [1.0, 2.0, 3.0];
        let out = decay_linear(&x, 3);
        assert_approx(out[2], 14.0 / 6.0, DEFAULT_EPSILON);
    }

    #[test]
    fn decay_linear_is_convex_combination() {
        let x = [3.0, 9.0, 5.0, 7.0, 2.0];
        let out = decay_linear(&x, 3);
        for i in 2..x.len() {
            let lo = x[i - 2..=i].iter().copied().fold(f64::INFINITY, f64::min);
            let hi = x[i - 2..=i]
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max);
            assert!(out[i] >= lo && out[i] <= hi);
        }
    }

    #[test]
    fn decay_linear_degenerate_window() {
        let x = [1.0, 2.0];
        assert!(decay_linear(&x, 0).iter().all(|v| v.is_nan()));
        assert!(decay_linear(&x, 3).iter().all(|v| v.is_nan()));
    }
}
