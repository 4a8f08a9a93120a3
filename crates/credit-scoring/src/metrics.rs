use credit_core::adaptive::{mean, std_dev};
use credit_core::CompanyProfile;
use serde::{Deserialize, Serialize};

use crate::concentration::{self, ConcentrationProfile};
use crate::liquidity::{self, LiquidityMetrics};

/// Balance growth in percent: `(last - first) / |first| * 100`, 0 when `first == 0`.
pub fn growth_pct(first: f64, last: f64) -> f64 {
    if first != 0.0 {
        (last - first) / first.abs() * 100.0
    } else {
        0.0
    }
}

/// Coefficient of variation of the balance series.
///
/// `None` below two values, where the sample deviation is undefined. A zero
/// mean yields 1.0 so the company is treated as highly volatile.
pub fn coefficient_of_variation(balances: &[f64]) -> Option<f64> {
    if balances.len() < 2 {
        return None;
    }
    let m = mean(balances);
    if m != 0.0 {
        Some(std_dev(balances) / m)
    } else {
        Some(1.0)
    }
}

/// `cv < ceiling`; an undefined cv never meets a ceiling.
pub fn cv_below(cv: Option<f64>, ceiling: f64) -> bool {
    cv.is_some_and(|c| c < ceiling)
}

/// Every derived input the scorers consume, computed once per profile so all
/// scorers see the same numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompanyMetrics {
    pub age_months: usize,
    pub first_balance: f64,
    pub current_balance: f64,
    /// `current - first`
    pub balance_change: f64,
    pub growth_pct: f64,
    /// `None` for a single record
    pub cv: Option<f64>,
    pub revenue: f64,
    /// Share of positive month-over-month deltas in percent, `None` below two records
    pub positive_delta_pct: Option<f64>,
    pub liquidity: LiquidityMetrics,
    pub concentration: ConcentrationProfile,
}

impl CompanyMetrics {
    /// `None` when the profile has no records.
    pub fn from_profile(profile: &CompanyProfile) -> Option<Self> {
        let balances = profile.balances();
        let liquidity = liquidity::analyze(&balances)?;
        let first_balance = profile.first_balance()?;
        let current_balance = liquidity.current_balance;

        let deltas = liquidity::deltas(&balances);
        let positive_delta_pct = if deltas.is_empty() {
            None
        } else {
            let positive = deltas.iter().filter(|d| **d > 0.0).count();
            Some(positive as f64 / deltas.len() as f64 * 100.0)
        };

        Some(Self {
            age_months: profile.age_months(),
            first_balance,
            current_balance,
            balance_change: current_balance - first_balance,
            growth_pct: growth_pct(first_balance, current_balance),
            cv: coefficient_of_variation(&balances),
            revenue: profile.revenue(),
            positive_delta_pct,
            liquidity,
            concentration: concentration::analyze(profile),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_growth_pct() {
        assert_relative_eq!(growth_pct(100_000.0, 121_000.0), 21.0, epsilon = 1e-9);
        assert_relative_eq!(growth_pct(-200.0, -100.0), 50.0);
        assert_eq!(growth_pct(0.0, 500.0), 0.0);
    }

    #[test]
    fn test_cv_zero_mean_sentinel() {
        assert_eq!(coefficient_of_variation(&[-50.0, 50.0]), Some(1.0));
        assert_eq!(coefficient_of_variation(&[0.0, 0.0, 0.0]), Some(1.0));
        let cv = coefficient_of_variation(&[100_000.0, 110_000.0, 121_000.0]).unwrap();
        assert_relative_eq!(cv, 0.0952, epsilon = 1e-4);
    }

    #[test]
    fn test_cv_undefined_below_two_values() {
        assert_eq!(coefficient_of_variation(&[42.0]), None);
        assert_eq!(coefficient_of_variation(&[]), None);
        assert!(!cv_below(None, f64::INFINITY));
        assert!(cv_below(Some(0.29), 0.3));
        assert!(!cv_below(Some(0.3), 0.3));
    }
}
