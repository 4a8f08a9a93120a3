//! Five-dimension composite credit score.
//!
//! Each dimension is quantized to one of {0, 5, 10, 15, 20} by a ladder that
//! is walked top-down; the first satisfied tier wins. The total is the plain
//! sum, so it always lands in [0, 100].

use serde::{Deserialize, Serialize};

use crate::metrics::{cv_below, CompanyMetrics};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreditDimension {
    Liquidity,
    Relationships,
    Trend,
    Activity,
    Risk,
}

impl CreditDimension {
    pub const ALL: [CreditDimension; 5] = [
        CreditDimension::Liquidity,
        CreditDimension::Relationships,
        CreditDimension::Trend,
        CreditDimension::Activity,
        CreditDimension::Risk,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CreditScoreBreakdown {
    pub liquidity: u8,
    pub relationships: u8,
    pub trend: u8,
    pub activity: u8,
    pub risk: u8,
}

impl CreditScoreBreakdown {
    pub fn total(&self) -> u8 {
        self.liquidity + self.relationships + self.trend + self.activity + self.risk
    }

    pub fn get(&self, dimension: CreditDimension) -> u8 {
        match dimension {
            CreditDimension::Liquidity => self.liquidity,
            CreditDimension::Relationships => self.relationships,
            CreditDimension::Trend => self.trend,
            CreditDimension::Activity => self.activity,
            CreditDimension::Risk => self.risk,
        }
    }
}

/// Composite score; `breakdown == None` for unknown companies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditScore {
    pub total: u8,
    pub breakdown: Option<CreditScoreBreakdown>,
}

impl CreditScore {
    pub fn not_available() -> Self {
        Self {
            total: 0,
            breakdown: None,
        }
    }
}

pub fn liquidity_tier(balance: f64, runway: f64) -> u8 {
    if balance > 0.0 && runway > 12.0 {
        20
    } else if balance > 0.0 && runway > 6.0 {
        15
    } else if balance > 0.0 && runway > 3.0 {
        10
    } else if balance > 0.0 {
        5
    } else {
        0
    }
}

pub fn relationships_tier(num_partners: usize, average_hhi: f64) -> u8 {
    if num_partners > 20 && average_hhi < 0.3 {
        20
    } else if num_partners > 15 && average_hhi < 0.5 {
        15
    } else if num_partners > 10 && average_hhi < 0.7 {
        10
    } else if num_partners > 5 {
        5
    } else {
        0
    }
}

/// A small decline (under 10% of the current balance) still earns 5.
pub fn trend_tier(balance_change: f64, current_balance: f64, cv: Option<f64>) -> u8 {
    if balance_change > 0.0 && cv_below(cv, 0.2) {
        20
    } else if balance_change > 0.0 && cv_below(cv, 0.4) {
        15
    } else if balance_change > 0.0 {
        10
    } else if balance_change > -current_balance * 0.1 {
        5
    } else {
        0
    }
}

pub fn activity_tier(total_volume: f64, age_months: usize) -> u8 {
    if total_volume > 1_000_000.0 && age_months >= 4 {
        20
    } else if total_volume > 500_000.0 && age_months >= 3 {
        15
    } else if total_volume > 100_000.0 && age_months >= 2 {
        10
    } else if total_volume > 0.0 {
        5
    } else {
        0
    }
}

pub fn risk_tier(balance: f64, burn_rate: f64, cv: Option<f64>) -> u8 {
    if balance > 0.0 && burn_rate < balance * 0.1 && cv_below(cv, 0.3) {
        20
    } else if balance > 0.0 && burn_rate < balance * 0.2 && cv_below(cv, 0.5) {
        15
    } else if balance > 0.0 && burn_rate < balance * 0.3 {
        10
    } else if balance > 0.0 {
        5
    } else {
        0
    }
}

pub fn breakdown(metrics: &CompanyMetrics) -> CreditScoreBreakdown {
    let balance = metrics.current_balance;
    CreditScoreBreakdown {
        liquidity: liquidity_tier(balance, metrics.liquidity.runway),
        relationships: relationships_tier(
            metrics.concentration.num_partners,
            metrics.concentration.average_hhi,
        ),
        trend: trend_tier(metrics.balance_change, balance, metrics.cv),
        activity: activity_tier(metrics.concentration.total_volume, metrics.age_months),
        risk: risk_tier(balance, metrics.liquidity.burn_rate, metrics.cv),
    }
}

pub fn score(metrics: &CompanyMetrics) -> CreditScore {
    let breakdown = breakdown(metrics);
    CreditScore {
        total: breakdown.total(),
        breakdown: Some(breakdown),
    }
}
