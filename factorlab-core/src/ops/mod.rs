//! Operator library — pure rolling and cross-sectional numeric primitives.
//!
//! Time-series operators are functions of one entity's ordered series
//! (`&[f64] -> Vec<f64>`); cross-sectional operators act on one date's
//! cross-section. None of them look ahead: the value at index i depends only
//! on inputs at indices ≤ i.
//!
//! NaN is the undefined sentinel, not an error channel. Every rolling
//! operator emits NaN for the first w−1 points and for any point whose
//! trailing window contains a NaN; cross-sectional operators treat NaN
//! inputs as absent. A degenerate window (w = 0 or w longer than the
//! series) yields an all-NaN output.

pub mod cross_section;
pub mod rolling;
pub mod transform;

pub use cross_section::{average_ranks, cs_rank, cs_zscore};
pub use rolling::{
    rolling_corr, rolling_cov, rolling_max, rolling_mean, rolling_min, rolling_std, rolling_sum,
};
pub use transform::{decay_linear, delay, delta, sign, ts_rank};

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for operator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
