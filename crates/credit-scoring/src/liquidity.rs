//! Burn rate, runway and cash-stress analysis over a balance series.

use credit_core::adaptive::{mean, rolling_mean, std_dev};
use serde::{Deserialize, Serialize};

/// Runway below this many months counts as cash stress
pub const STRESS_RUNWAY_MONTHS: f64 = 3.0;
/// Burn above this fraction of a positive balance counts as cash stress
pub const STRESS_BURN_FRACTION: f64 = 0.5;

const ROLL3_WINDOW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidityMetrics {
    pub current_balance: f64,
    /// Mean absolute negative month-over-month delta; 0 when none
    pub burn_rate: f64,
    /// Months of cash at the current burn; `+inf` when nothing burns.
    /// Mapping infinity to a display value is the caller's job.
    pub runway: f64,
    pub stress_flag: bool,
}

impl LiquidityMetrics {
    pub fn risk_level(&self) -> LiquidityRisk {
        LiquidityRisk::from_runway(self.runway)
    }
}

/// Month-over-month differences (length n - 1)
pub fn deltas(balances: &[f64]) -> Vec<f64> {
    balances.windows(2).map(|w| w[1] - w[0]).collect()
}

pub fn burn_rate(balances: &[f64]) -> f64 {
    let burns: Vec<f64> = deltas(balances)
        .into_iter()
        .filter(|d| *d < 0.0)
        .map(f64::abs)
        .collect();
    if burns.is_empty() {
        0.0
    } else {
        mean(&burns)
    }
}

pub fn runway(current_balance: f64, burn_rate: f64) -> f64 {
    if burn_rate > 0.0 {
        current_balance / burn_rate
    } else {
        f64::INFINITY
    }
}

pub fn stress_flag(current_balance: f64, burn_rate: f64, runway: f64) -> bool {
    current_balance < 0.0
        || runway < STRESS_RUNWAY_MONTHS
        || (current_balance > 0.0 && burn_rate > STRESS_BURN_FRACTION * current_balance)
}

/// Liquidity metrics for an ordered balance series. `None` when empty.
pub fn analyze(balances: &[f64]) -> Option<LiquidityMetrics> {
    let current_balance = *balances.last()?;
    let burn = burn_rate(balances);
    let runway = runway(current_balance, burn);
    Some(LiquidityMetrics {
        current_balance,
        burn_rate: burn,
        runway,
        stress_flag: stress_flag(current_balance, burn, runway),
    })
}

/// Runway-based liquidity risk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiquidityRisk {
    Low,
    Medium,
    High,
    Critical,
}

impl LiquidityRisk {
    /// An infinite runway lands in Low.
    pub fn from_runway(runway: f64) -> Self {
        match runway {
            r if r >= 12.0 => LiquidityRisk::Low,
            r if r >= 6.0 => LiquidityRisk::Medium,
            r if r >= 3.0 => LiquidityRisk::High,
            _ => LiquidityRisk::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LiquidityRisk::Low => "Low",
            LiquidityRisk::Medium => "Medium",
            LiquidityRisk::High => "High",
            LiquidityRisk::Critical => "Critical",
        }
    }
}

/// Direction of a metric between its first and last observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendDirection {
    Rising,
    Falling,
    Stable,
}

impl TrendDirection {
    /// Compares last vs first. Stable with fewer than two values.
    pub fn of(values: &[f64]) -> Self {
        match (values.first(), values.last()) {
            (Some(first), Some(last)) if values.len() > 1 => {
                let change = last - first;
                if change > 0.0 {
                    TrendDirection::Rising
                } else if change < 0.0 {
                    TrendDirection::Falling
                } else {
                    TrendDirection::Stable
                }
            }
            _ => TrendDirection::Stable,
        }
    }

    /// Wording for burn rate: rising burn is "Increasing"
    pub fn burn_label(&self) -> &'static str {
        match self {
            TrendDirection::Rising => "Increasing",
            TrendDirection::Falling => "Decreasing",
            TrendDirection::Stable => "Stable",
        }
    }

    /// Wording for runway: rising runway is "Improving"
    pub fn runway_label(&self) -> &'static str {
        match self {
            TrendDirection::Rising => "Improving",
            TrendDirection::Falling => "Worsening",
            TrendDirection::Stable => "Stable",
        }
    }
}

/// Month-by-month burn and runway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidityEvolution {
    /// `|delta|` per month, zero deltas skipped
    pub monthly_burn: Vec<f64>,
    /// `balance / |delta|` per month, zero deltas skipped
    pub monthly_runway: Vec<f64>,
    pub burn_trend: TrendDirection,
    pub runway_trend: TrendDirection,
}

pub fn evolution(balances: &[f64]) -> LiquidityEvolution {
    let mut monthly_burn = Vec::new();
    let mut monthly_runway = Vec::new();
    for (i, delta) in deltas(balances).into_iter().enumerate() {
        let burn = delta.abs();
        if burn == 0.0 {
            continue;
        }
        monthly_burn.push(burn);
        // delta i ends at balance i + 1
        let runway = balances[i + 1] / burn;
        if runway.is_finite() {
            monthly_runway.push(runway);
        }
    }

    LiquidityEvolution {
        burn_trend: TrendDirection::of(&monthly_burn),
        runway_trend: TrendDirection::of(&monthly_runway),
        monthly_burn,
        monthly_runway,
    }
}

/// Three-period trailing averages of balance and burn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roll3View {
    pub balance_roll3: Vec<f64>,
    pub burn_roll3: Vec<f64>,
    /// Last minus first balance Roll3
    pub variation: f64,
    /// `1 - std/mean` of the balance Roll3; 0 when the mean is 0
    pub stability: f64,
}

pub fn roll3(balances: &[f64]) -> Roll3View {
    let balance_roll3 = rolling_mean(balances, ROLL3_WINDOW);
    let abs_deltas: Vec<f64> = deltas(balances).into_iter().map(f64::abs).collect();
    let burn_roll3 = rolling_mean(&abs_deltas, ROLL3_WINDOW);

    let variation = match (balance_roll3.first(), balance_roll3.last()) {
        (Some(first), Some(last)) => last - first,
        _ => 0.0,
    };
    let roll_mean = mean(&balance_roll3);
    let stability = if roll_mean != 0.0 {
        1.0 - std_dev(&balance_roll3) / roll_mean
    } else {
        0.0
    };

    Roll3View {
        balance_roll3,
        burn_roll3,
        variation,
        stability,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_no_negative_delta_means_no_burn() {
        let m = analyze(&[100.0, 150.0, 150.0, 200.0]).unwrap();
        assert_eq!(m.burn_rate, 0.0);
        assert!(m.runway.is_infinite());
        assert!(!m.stress_flag);
        assert_eq!(m.risk_level(), LiquidityRisk::Low);
    }

    #[test]
    fn test_burn_rate_averages_negative_deltas() {
        // deltas: -100, +50, -300
        let m = analyze(&[1_000.0, 900.0, 950.0, 650.0]).unwrap();
        assert_relative_eq!(m.burn_rate, 200.0);
        assert_relative_eq!(m.runway, 3.25);
        assert!(!m.stress_flag);
        assert_eq!(m.risk_level(), LiquidityRisk::High);
    }

    #[test]
    fn test_stress_on_short_runway() {
        let m = analyze(&[1_000.0, 500.0]).unwrap();
        assert_relative_eq!(m.runway, 1.0);
        assert!(m.stress_flag);
        assert_eq!(m.risk_level(), LiquidityRisk::Critical);
    }

    #[test]
    fn test_stress_on_burn_above_half_balance() {
        // burn 300 on balance 400 -> runway 1.33, also over half the balance
        assert!(stress_flag(400.0, 300.0, runway(400.0, 300.0)));
        // runway exactly 3 is not stress, burn 1/3 of balance is fine
        assert!(!stress_flag(300.0, 100.0, 3.0));
    }

    #[test]
    fn test_single_record_only_checks_sign() {
        let positive = analyze(&[10.0]).unwrap();
        assert_eq!(positive.burn_rate, 0.0);
        assert!(positive.runway.is_infinite());
        assert!(!positive.stress_flag);

        let negative = analyze(&[-10.0]).unwrap();
        assert!(negative.stress_flag);
        assert!(analyze(&[]).is_none());
    }

    #[test]
    fn test_evolution_trends() {
        // deltas: -100, 0, -300, +100
        let evo = evolution(&[1_000.0, 900.0, 900.0, 600.0, 700.0]);
        assert_eq!(evo.monthly_burn, vec![100.0, 300.0, 100.0]);
        assert_eq!(evo.monthly_runway, vec![9.0, 2.0, 7.0]);
        assert_eq!(evo.burn_trend.burn_label(), "Stable");
        assert_eq!(evo.runway_trend.runway_label(), "Worsening");

        let flat = evolution(&[5.0]);
        assert_eq!(flat.burn_trend, TrendDirection::Stable);
    }

    #[test]
    fn test_roll3_view() {
        let view = roll3(&[300.0, 600.0, 900.0, 1_200.0]);
        assert_eq!(view.balance_roll3, vec![300.0, 450.0, 600.0, 900.0]);
        assert_eq!(view.burn_roll3, vec![300.0, 300.0, 300.0]);
        assert_relative_eq!(view.variation, 600.0);
        assert!(view.stability < 1.0);

        let empty = roll3(&[]);
        assert_eq!(empty.variation, 0.0);
        assert_eq!(empty.stability, 0.0);
    }
}
