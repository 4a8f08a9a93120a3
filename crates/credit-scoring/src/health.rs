//! Financial health score (0-100).

use credit_core::{ScoreBand, ScoreResult};
use serde::{Deserialize, Serialize};

use crate::metrics::CompanyMetrics;

const GROWTH_WEIGHT: f64 = 0.30;
const STABILITY_WEIGHT: f64 = 0.25;
const POSITION_WEIGHT: f64 = 0.25;
const TREND_WEIGHT: f64 = 0.20;

/// Trend sub-score when there are fewer than two records
const NEUTRAL_TREND: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthBreakdown {
    pub growth: f64,
    pub stability: f64,
    pub balance_position: f64,
    pub trend: f64,
    pub total: f64,
}

fn clip(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

pub fn growth_score(growth_pct: f64) -> f64 {
    clip(50.0 + growth_pct * 2.0)
}

/// 0 when cv is undefined.
pub fn stability_score(cv: Option<f64>) -> f64 {
    cv.map(|c| clip(100.0 - c * 100.0)).unwrap_or(0.0)
}

/// Half of the balance-to-revenue ratio in percent; 0 without revenue.
pub fn balance_position_score(balance: f64, revenue: f64) -> f64 {
    if revenue == 0.0 {
        return 0.0;
    }
    clip((balance / revenue * 100.0) * 0.5)
}

pub fn trend_score(positive_delta_pct: Option<f64>) -> f64 {
    positive_delta_pct.map(clip).unwrap_or(NEUTRAL_TREND)
}

pub fn breakdown(metrics: &CompanyMetrics) -> HealthBreakdown {
    let growth = growth_score(metrics.growth_pct);
    let stability = stability_score(metrics.cv);
    let balance_position = balance_position_score(metrics.current_balance, metrics.revenue);
    let trend = trend_score(metrics.positive_delta_pct);

    let total = clip(
        growth * GROWTH_WEIGHT
            + stability * STABILITY_WEIGHT
            + balance_position * POSITION_WEIGHT
            + trend * TREND_WEIGHT,
    );

    HealthBreakdown {
        growth,
        stability,
        balance_position,
        trend,
        total,
    }
}

pub fn categorize(score: f64) -> ScoreBand {
    ScoreBand::from_score(score, 80.0, 60.0)
}

pub fn score(metrics: &CompanyMetrics) -> ScoreResult<ScoreBand> {
    let total = breakdown(metrics).total;
    ScoreResult::new(total, categorize(total))
}
