//! Named credit cohorts over a period snapshot.
//!
//! Both predicates are plain conjunctions; a row must satisfy every clause.

use chrono::NaiveDate;
use credit_core::SnapshotRow;
use serde::{Deserialize, Serialize};

use crate::snapshot::PeriodSnapshot;
use crate::thresholds::PercentileThresholds;

/// Minimum runway, in months, for the ideal cohort
const IDEAL_MIN_RUNWAY: f64 = 1.0;
/// Runway below this, or undefined, qualifies for the high-risk cohort
const HIGH_RISK_MAX_RUNWAY: f64 = 3.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioCohorts {
    pub period: NaiveDate,
    pub thresholds: Option<PercentileThresholds>,
    /// Best health first
    pub ideal: Vec<SnapshotRow>,
    /// Worst health first
    pub high_risk: Vec<SnapshotRow>,
    /// Matches before truncation
    pub ideal_total: usize,
    pub high_risk_total: usize,
}

pub fn is_ideal(row: &SnapshotRow, t: &PercentileThresholds) -> bool {
    row.health_score >= t.health_q25
        && row.risk_score < t.risk_q75
        && row.runway.is_some_and(|r| r >= IDEAL_MIN_RUNWAY)
        && !row.stress_flag
        && row.volume_growth.is_some_and(|g| g > 0.0)
        && row.life_stage.is_established()
}

pub fn is_high_risk(row: &SnapshotRow, t: &PercentileThresholds) -> bool {
    row.health_score <= t.health_q25
        && row.risk_score >= t.risk_q75
        && row.runway.map_or(true, |r| r < HIGH_RISK_MAX_RUNWAY)
        && row.stress_flag
        && row.volume_growth.is_some_and(|g| g < 0.0)
        && row.life_stage.is_declining()
}

fn rank(mut rows: Vec<SnapshotRow>, best_first: bool, limit: usize) -> Vec<SnapshotRow> {
    rows.sort_by(|a, b| {
        let by_health = if best_first {
            b.health_score.total_cmp(&a.health_score)
        } else {
            a.health_score.total_cmp(&b.health_score)
        };
        by_health.then_with(|| a.company_id.cmp(&b.company_id))
    });
    rows.truncate(limit);
    rows
}

/// Cohorts for a snapshot; both empty when the snapshot has no thresholds.
pub fn select(snapshot: &PeriodSnapshot, limit: usize) -> PortfolioCohorts {
    let Some(t) = snapshot.thresholds else {
        return PortfolioCohorts {
            period: snapshot.period,
            thresholds: None,
            ideal: Vec::new(),
            high_risk: Vec::new(),
            ideal_total: 0,
            high_risk_total: 0,
        };
    };

    let ideal: Vec<SnapshotRow> = snapshot
        .rows
        .iter()
        .filter(|r| is_ideal(r, &t))
        .cloned()
        .collect();
    let high_risk: Vec<SnapshotRow> = snapshot
        .rows
        .iter()
        .filter(|r| is_high_risk(r, &t))
        .cloned()
        .collect();

    let ideal_total = ideal.len();
    let high_risk_total = high_risk.len();

    tracing::info!(
        period = %snapshot.period,
        ideal = ideal_total,
        high_risk = high_risk_total,
        "cohorts selected"
    );

    PortfolioCohorts {
        period: snapshot.period,
        thresholds: Some(t),
        ideal: rank(ideal, true, limit),
        high_risk: rank(high_risk, false, limit),
        ideal_total,
        high_risk_total,
    }
}
