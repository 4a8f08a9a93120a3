use std::collections::BTreeMap;

use chrono::NaiveDate;
use credit_core::adaptive::{mean, median, std_dev};
use credit_core::Categorical;
use serde::{Deserialize, Serialize};

use crate::snapshot::PeriodSnapshot;

/// Portfolio-wide aggregates for one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodStats {
    pub period: NaiveDate,
    pub companies: usize,
    pub health_mean: f64,
    pub health_std: f64,
    pub risk_mean: f64,
    pub risk_std: f64,
    /// Over finite runways only; `None` when every runway is infinite or undefined
    pub runway_mean: Option<f64>,
    pub runway_median: Option<f64>,
    pub stressed: usize,
    pub negative_balance: usize,
    /// Company count per life-stage label
    pub life_stages: BTreeMap<String, usize>,
    pub volume_growth_mean: Option<f64>,
}

pub fn compute(snapshot: &PeriodSnapshot) -> PeriodStats {
    let rows = &snapshot.rows;
    let health: Vec<f64> = rows.iter().map(|r| r.health_score).collect();
    let risk: Vec<f64> = rows.iter().map(|r| r.risk_score).collect();
    let runways: Vec<f64> = rows
        .iter()
        .filter_map(|r| r.runway)
        .filter(|r| r.is_finite())
        .collect();
    let growth: Vec<f64> = rows
        .iter()
        .filter_map(|r| r.volume_growth)
        .filter(|g| g.is_finite())
        .collect();

    let mut life_stages = BTreeMap::new();
    for row in rows {
        *life_stages.entry(row.life_stage.label().to_string()).or_insert(0) += 1;
    }

    PeriodStats {
        period: snapshot.period,
        companies: rows.len(),
        health_mean: mean(&health),
        health_std: std_dev(&health),
        risk_mean: mean(&risk),
        risk_std: std_dev(&risk),
        runway_mean: (!runways.is_empty()).then(|| mean(&runways)),
        runway_median: median(&runways),
        stressed: rows.iter().filter(|r| r.stress_flag).count(),
        negative_balance: rows.iter().filter(|r| r.balance < 0.0).count(),
        life_stages,
        volume_growth_mean: (!growth.is_empty()).then(|| mean(&growth)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::SnapshotOrigin;
    use approx::assert_relative_eq;
    use credit_core::{LifeStage, SnapshotRow};

    fn row(id: &str, health: f64, runway: Option<f64>, stage: LifeStage) -> SnapshotRow {
        SnapshotRow {
            company_id: id.to_string(),
            period: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            health_score: health,
            risk_score: 50.0,
            runway,
            stress_flag: runway.is_some_and(|r| r < 3.0),
            volume_growth: None,
            life_stage: stage,
            balance: if health < 30.0 { -10.0 } else { 10.0 },
            volume: 0.0,
        }
    }

    #[test]
    fn test_period_stats() {
        let snapshot = PeriodSnapshot {
            period: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            version: 1,
            origin: SnapshotOrigin::Derived,
            rows: vec![
                row("A", 20.0, Some(2.0), LifeStage::Declining),
                row("B", 60.0, Some(f64::INFINITY), LifeStage::Mature),
                row("C", 70.0, Some(10.0), LifeStage::Mature),
                row("D", 90.0, None, LifeStage::Growing),
            ],
            thresholds: None,
        };
        let stats = compute(&snapshot);

        assert_eq!(stats.companies, 4);
        assert_relative_eq!(stats.health_mean, 60.0);
        assert_relative_eq!(stats.risk_std, 0.0);
        assert_relative_eq!(stats.runway_mean.unwrap(), 6.0);
        assert_relative_eq!(stats.runway_median.unwrap(), 6.0);
        assert_eq!(stats.stressed, 1);
        assert_eq!(stats.negative_balance, 1);
        assert_eq!(stats.life_stages["Mature"], 2);
        assert_eq!(stats.volume_growth_mean, None);
    }
}
