//! Scalar statistics shared by the metric modules.
//!
//! Every function is pure: slice in, scalar out. NaN marks "undefined"
//! (too few points, zero dispersion), never an error.

/// Arithmetic mean; NaN for an empty slice.
pub(crate) fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return f64::NAN;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Sample standard deviation (ddof = 1); NaN below 2 points.
pub(crate) fn sample_std(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return f64::NAN;
    }
    let m = mean(xs);
    let var = xs.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (xs.len() - 1) as f64;
    var.sqrt()
}

/// t-statistic of the mean: mean / (std / √n); NaN below 2 points or when
/// the dispersion is zero.
pub(crate) fn t_stat(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return f64::NAN;
    }
    let sd = sample_std(xs);
    if !(sd > 0.0) {
        return f64::NAN;
    }
    mean(xs) / (sd / (xs.len() as f64).sqrt())
}

/// Pearson correlation of two aligned slices with no NaN entries.
///
/// NaN below 2 points or when either side has zero variance.
pub(crate) fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len();
    if n < 2 || n != y.len() {
        return f64::NAN;
    }
    let mx = mean(x);
    let my = mean(y);
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for i in 0..n {
        let dx = x[i] - mx;
        let dy = y[i] - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    sxy / (sxx.sqrt() * syy.sqrt())
}

/// Spearman correlation: Pearson on tie-averaged ranks.
pub(crate) fn spearman(x: &[f64], y: &[f64]) -> f64 {
    let rx = factorlab_core::ops::average_ranks(x);
    let ry = factorlab_core::ops::average_ranks(y);
    pearson(&rx, &ry)
}

/// Keep only the index positions where both slices are non-NaN.
pub(crate) fn pairwise_complete(x: &[f64], y: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut ox = Vec::new();
    let mut oy = Vec::new();
    for (a, b) in x.iter().zip(y) {
        if !a.is_nan() && !b.is_nan() {
            ox.push(*a);
            oy.push(*b);
        }
    }
    (ox, oy)
}
