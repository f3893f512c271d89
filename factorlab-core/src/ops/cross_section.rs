//! Same-date cross-sectional operators.
//!
//! Inputs are one date's values across entities, in a fixed entity order.
//! NaN marks an entity absent that date: it receives NaN output and is
//! excluded from rank denominators and moment estimates — never imputed.

/// 1-based average ranks of the non-NaN values; NaN stays NaN.
///
/// Tied values share the mean of the ranks their block occupies.
pub fn average_ranks(xs: &[f64]) -> Vec<f64> {
    let mut out = vec![f64::NAN; xs.len()];
    let mut order: Vec<usize> = (0..xs.len()).filter(|&i| !xs[i].is_nan()).collect();
    order.sort_by(|&a, &b| xs[a].total_cmp(&xs[b]));

    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && xs[order[j + 1]] == xs[order[i]] {
            j += 1;
        }
        // Tie block occupies 1-based ranks i+1..=j+1.
        let avg = (i + j) as f64 / 2.0 + 1.0;
        for &k in &order[i..=j] {
            out[k] = avg;
        }
        i = j + 1;
    }
    out
}

/// Percentile rank in (0, 1] across the date's present entities.
///
/// Average rank divided by the count of present entities; a lone entity
/// ranks 1.0.
pub fn cs_rank(xs: &[f64]) -> Vec<f64> {
    let present = xs.iter().filter(|v| !v.is_nan()).count();
    if present == 0 {
        return vec![f64::NAN; xs.len()];
    }
    average_ranks(xs)
        .into_iter()
        .map(|r| r / present as f64)
        .collect()
}

/// Z-score across the date's present entities (sample std).
///
/// Fewer than two present entities, or zero dispersion, yields NaN for all.
pub fn cs_zscore(xs: &[f64]) -> Vec<f64> {
    let present: Vec<f64> = xs.iter().copied().filter(|v| !v.is_nan()).collect();
    if present.len() < 2 {
        return vec![f64::NAN; xs.len()];
    }
    let n = present.len() as f64;
    let mean = present.iter().sum::<f64>() / n;
    let std = (present.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt();
    if std == 0.0 {
        return vec![f64::NAN; xs.len()];
    }
    xs.iter().map(|v| (v - mean) / std).collect()
}
