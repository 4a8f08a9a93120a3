use credit_core::adaptive::quantile;
use credit_core::{ScoreBand, SnapshotRow};
use serde::{Deserialize, Serialize};

/// Quartiles of health and dependency risk across one period's snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileThresholds {
    pub health_q25: f64,
    pub health_q75: f64,
    pub risk_q25: f64,
    pub risk_q75: f64,
}

impl PercentileThresholds {
    /// `None` when no row carries a finite score.
    pub fn from_rows(rows: &[SnapshotRow]) -> Option<Self> {
        let health: Vec<f64> = rows.iter().map(|r| r.health_score).collect();
        let risk: Vec<f64> = rows.iter().map(|r| r.risk_score).collect();

        Some(Self {
            health_q25: quantile(&health, 0.25)?,
            health_q75: quantile(&health, 0.75)?,
            risk_q25: quantile(&risk, 0.25)?,
            risk_q75: quantile(&risk, 0.75)?,
        })
    }

    /// High at or above q75, Medium at or above q25, Low otherwise.
    pub fn health_band(&self, health: f64) -> ScoreBand {
        ScoreBand::from_score(health, self.health_q75, self.health_q25)
    }

    pub fn risk_concentrated(&self, risk: f64) -> bool {
        risk >= self.risk_q75
    }
}
