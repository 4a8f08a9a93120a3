use credit_core::{LifeStage, ScoreResult};

use crate::metrics::{cv_below, CompanyMetrics};

/// Classify maturity from age, balance growth (percent) and volatility.
///
/// Rules are evaluated in order and the first match wins; boundary values
/// depend on that order.
pub fn classify(age_months: usize, growth_pct: f64, cv: Option<f64>) -> (LifeStage, f64) {
    if age_months <= 2 {
        (LifeStage::Starting, 20.0)
    } else if growth_pct > 20.0 && cv_below(cv, 0.3) {
        (LifeStage::Growing, 80.0)
    } else if growth_pct > 0.0 && cv_below(cv, 0.5) {
        (LifeStage::Mature, 60.0)
    } else if growth_pct < -10.0 {
        (LifeStage::Declining, 20.0)
    } else {
        (LifeStage::Mature, 50.0)
    }
}

pub fn assess(metrics: &CompanyMetrics) -> ScoreResult<LifeStage> {
    let (stage, score) = classify(metrics.age_months, metrics.growth_pct, metrics.cv);
    ScoreResult::new(score, stage)
}
