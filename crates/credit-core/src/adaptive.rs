//! Distribution helpers shared by the scorers and the portfolio screener.
//!
//! Percentile thresholds are derived from the portfolio's own distribution,
//! so the classification boundaries move with the data instead of being fixed.

use statrs::statistics::Statistics;

/// Mean of a data slice; 0 when empty.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.mean()
}

/// Sample standard deviation (n - 1). Returns 0.0 below two values.
pub fn std_dev(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    data.std_dev()
}

/// Population standard deviation (n).
pub fn population_std_dev(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.population_std_dev()
}

/// Population z-score of every value. All zeros when there is no spread
/// or fewer than two values.
pub fn z_scores(data: &[f64]) -> Vec<f64> {
    let sd = population_std_dev(data);
    if data.len() < 2 || sd < f64::EPSILON {
        return vec![0.0; data.len()];
    }
    let m = mean(data);
    data.iter().map(|x| (x - m) / sd).collect()
}

/// Quantile `q` (0.0 to 1.0) with linear interpolation between closest ranks.
///
/// Non-finite values are ignored. Returns `None` when nothing is left.
pub fn quantile(data: &[f64], q: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = data.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let q = q.clamp(0.0, 1.0);
    let h = (sorted.len() - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    let frac = h - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

pub fn median(data: &[f64]) -> Option<f64> {
    quantile(data, 0.5)
}

/// Trailing mean over `window` values, averaging whatever is available at the
/// start of the series.
pub fn rolling_mean(data: &[f64], window: usize) -> Vec<f64> {
    if window == 0 {
        return Vec::new();
    }
    (0..data.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            mean(&data[start..=i])
        })
        .collect()
}
