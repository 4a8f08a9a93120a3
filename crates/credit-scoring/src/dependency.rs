//! Concentration / dependency risk score (0-100, higher is riskier).

use credit_core::{ScoreBand, ScoreResult};
use serde::{Deserialize, Serialize};

use crate::concentration::ConcentrationProfile;

const CONCENTRATION_WEIGHT: f64 = 0.50;
const PARTNER_WEIGHT: f64 = 0.30;
const VOLUME_WEIGHT: f64 = 0.20;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DependencyRiskBreakdown {
    pub concentration: f64,
    pub partners: f64,
    pub volume: f64,
    pub total: f64,
}

fn clip(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

pub fn breakdown(profile: &ConcentrationProfile) -> DependencyRiskBreakdown {
    let concentration = profile.average_hhi * 100.0;
    // More partners and more volume both lower the risk
    let partners = clip(100.0 - profile.num_partners as f64 * 3.0);
    let volume = clip(100.0 - profile.total_volume / 100_000.0);

    let total = clip(
        concentration * CONCENTRATION_WEIGHT + partners * PARTNER_WEIGHT + volume * VOLUME_WEIGHT,
    );

    DependencyRiskBreakdown {
        concentration,
        partners,
        volume,
        total,
    }
}

pub fn categorize(score: f64) -> ScoreBand {
    ScoreBand::from_score(score, 70.0, 40.0)
}

/// `has_transactions == false` yields the neutral "N/A" result.
pub fn score(profile: &ConcentrationProfile, has_transactions: bool) -> ScoreResult<ScoreBand> {
    if !has_transactions {
        return ScoreResult::not_available();
    }
    let total = breakdown(profile).total;
    ScoreResult::new(total, categorize(total))
}
