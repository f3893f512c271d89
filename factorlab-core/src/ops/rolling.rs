//! Trailing-window statistics over one entity's ordered series.

/// Apply `stat` to each full trailing window of length `w`.
///
/// Output at index i < w−1 is NaN; a window containing any NaN yields NaN
/// without invoking `stat`. Degenerate windows (w = 0 or w > len) produce
/// an all-NaN vector.
fn rolling_apply<F>(x: &[f64], w: usize, stat: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
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
        out[i] = stat(window);
    }
    out
}

/// Rolling sum over a trailing window of length `w`.
pub fn rolling_sum(x: &[f64], w: usize) -> Vec<f64> {
    rolling_apply(x, w, |win| win.iter().sum())
}

/// Rolling minimum over a trailing window of length `w`.
pub fn rolling_min(x: &[f64], w: usize) -> Vec<f64> {
    rolling_apply(x, w, |win| win.iter().copied().fold(f64::INFINITY, f64::min))
}

/// Rolling maximum over a trailing window of length `w`.
pub fn rolling_max(x: &[f64], w: usize) -> Vec<f64> {
    rolling_apply(x, w, |win| {
        win.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    })
}

/// Rolling mean over a trailing window of length `w`.
pub fn rolling_mean(x: &[f64], w: usize) -> Vec<f64> {
    rolling_apply(x, w, |win| win.iter().sum::<f64>() / win.len() as f64)
}

/// Rolling population standard deviation (ddof = 0).
pub fn rolling_std(x: &[f64], w: usize) -> Vec<f64> {
    rolling_apply(x, w, |win| {
        let mean = win.iter().sum::<f64>() / win.len() as f64;
        let var = win.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / win.len() as f64;
        var.sqrt()
    })
}

/// Apply `stat` to each pair of full trailing windows of length `w`.
///
/// Both series must share the entity's date axis. NaN in either window
/// yields NaN for that point.
fn rolling_apply2<F>(x: &[f64], y: &[f64], w: usize, stat: F) -> Vec<f64>
where
    F: Fn(&[f64], &[f64]) -> f64,
{
    assert_eq!(x.len(), y.len(), "paired rolling series must be aligned");
    let n = x.len();
    let mut out = vec![f64::NAN; n];
    if w == 0 || w > n {
        return out;
    }
    for i in (w - 1)..n {
        let wx = &x[i + 1 - w..=i];
        let wy = &y[i + 1 - w..=i];
        if wx.iter().chain(wy.iter()).any(|v| v.is_nan()) {
            continue;
        }
        out[i] = stat(wx, wy);
    }
    out
}

/// Rolling sample covariance (ddof = 1) of two aligned series.
pub fn rolling_cov(x: &[f64], y: &[f64], w: usize) -> Vec<f64> {
    if w < 2 {
        return vec![f64::NAN; x.len()];
    }
    rolling_apply2(x, y, w, |wx, wy| sample_cov(wx, wy))
}

/// Rolling Pearson correlation of two aligned series.
///
/// A window where either series has zero variance yields NaN.
pub fn rolling_corr(x: &[f64], y: &[f64], w: usize) -> Vec<f64> {
    if w < 2 {
        return vec![f64::NAN; x.len()];
    }
    rolling_apply2(x, y, w, |wx, wy| {
        let cov = sample_cov(wx, wy);
        let sx = sample_var(wx).sqrt();
        let sy = sample_var(wy).sqrt();
        if sx == 0.0 || sy == 0.0 {
            f64::NAN
        } else {
            cov / (sx * sy)
        }
    })
}

fn sample_cov(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    let mx = x.iter().sum::<f64>() / n;
    let my = y.iter().sum::<f64>() / n;
    x.iter()
        .zip(y)
        .map(|(a, b)| (a - mx) * (b - my))
        .sum::<f64>()
        / (n - 1.0)
}

fn sample_var(x: &[f64]) -> f64 {
    let n = x.len() as f64;
    let m = x.iter().sum::<f64>() / n;
    x.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1.0)
}
