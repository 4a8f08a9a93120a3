use serde::{Deserialize, Serialize};

use crate::metrics::CompanyMetrics;

/// Why a company was flagged. Declared in reporting priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskAlertKind {
    NegativeBalance,
    LowRunway,
    /// Balance fell by more than 10% of revenue over the series
    SignificantDecline,
}

impl RiskAlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskAlertKind::NegativeBalance => "Negative balance",
            RiskAlertKind::LowRunway => "Low runway",
            RiskAlertKind::SignificantDecline => "Significant decline",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAlert {
    /// Highest-priority reason
    pub kind: RiskAlertKind,
    /// Every triggered reason, in priority order
    pub triggered: Vec<RiskAlertKind>,
    pub balance: f64,
    pub balance_change: f64,
    pub runway: f64,
}

pub fn evaluate(metrics: &CompanyMetrics) -> Option<RiskAlert> {
    let balance = metrics.current_balance;
    let runway = metrics.liquidity.runway;

    let mut triggered = Vec::new();
    if balance < 0.0 {
        triggered.push(RiskAlertKind::NegativeBalance);
    }
    if runway < 3.0 {
        triggered.push(RiskAlertKind::LowRunway);
    }
    if metrics.balance_change < -metrics.revenue * 0.1 {
        triggered.push(RiskAlertKind::SignificantDecline);
    }

    let kind = *triggered.first()?;
    Some(RiskAlert {
        kind,
        triggered,
        balance,
        balance_change: metrics.balance_change,
        runway,
    })
}
