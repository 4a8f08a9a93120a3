//! Counterparty concentration (Herfindahl-Hirschman Index).

use std::collections::BTreeMap;

use credit_core::CompanyProfile;
use serde::{Deserialize, Serialize};

/// HHI = sum of squared value shares, in [0, 1].
///
/// Empty input or a zero total yields 0.
pub fn hhi(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let total: f64 = values.iter().sum();
    if total == 0.0 {
        return 0.0;
    }
    values.iter().map(|v| (v / total).powi(2)).sum()
}

/// Sum amounts per counterparty. Sorted keys keep summation order stable.
pub fn totals_by_counterparty<'a, I>(flows: I) -> BTreeMap<&'a str, f64>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut totals: BTreeMap<&'a str, f64> = BTreeMap::new();
    for (counterparty, amount) in flows {
        *totals.entry(counterparty).or_insert(0.0) += amount;
    }
    totals
}

/// Concentration view of a company's transaction graph
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ConcentrationProfile {
    /// HHI over receivers the company paid
    pub payment_hhi: f64,
    /// HHI over payers that paid the company
    pub receipt_hhi: f64,
    /// Mean of the two sides
    pub average_hhi: f64,
    pub payment_partners: usize,
    pub receipt_partners: usize,
    /// Distinct counterparties across both sides
    pub num_partners: usize,
    pub payment_volume: f64,
    pub receipt_volume: f64,
    pub total_volume: f64,
}

pub fn analyze(profile: &CompanyProfile) -> ConcentrationProfile {
    let paid = totals_by_counterparty(profile.payments().map(|t| (t.receiver_id.as_str(), t.amount)));
    let received = totals_by_counterparty(profile.receipts().map(|t| (t.payer_id.as_str(), t.amount)));

    let paid_values: Vec<f64> = paid.values().copied().collect();
    let received_values: Vec<f64> = received.values().copied().collect();

    let payment_hhi = hhi(&paid_values);
    let receipt_hhi = hhi(&received_values);
    let payment_volume: f64 = profile.payments().map(|t| t.amount).sum();
    let receipt_volume: f64 = profile.receipts().map(|t| t.amount).sum();

    ConcentrationProfile {
        payment_hhi,
        receipt_hhi,
        average_hhi: (payment_hhi + receipt_hhi) / 2.0,
        payment_partners: paid.len(),
        receipt_partners: received.len(),
        num_partners: profile.partners().len(),
        payment_volume,
        receipt_volume,
        total_volume: payment_volume + receipt_volume,
    }
}
