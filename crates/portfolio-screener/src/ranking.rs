use std::collections::BTreeMap;

use credit_core::CompanyDataSource;
use credit_scoring::{CompanyReport, CreditScore, ScoringEngine};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditRankEntry {
    /// 1-based
    pub rank: usize,
    pub company_id: String,
    pub sector: Option<String>,
    pub credit: CreditScore,
    pub health_score: f64,
    pub life_stage: String,
}

/// Companies ordered by composite credit score, ties broken by id.
pub fn credit_ranking(reports: &[CompanyReport], limit: usize) -> Vec<CreditRankEntry> {
    let mut ordered: Vec<&CompanyReport> = reports.iter().collect();
    ordered.sort_by(|a, b| {
        b.credit
            .total
            .cmp(&a.credit.total)
            .then_with(|| a.company_id.cmp(&b.company_id))
    });

    ordered
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, r)| CreditRankEntry {
            rank: i + 1,
            company_id: r.company_id.clone(),
            sector: r.sector.clone(),
            credit: r.credit,
            health_score: r.health.score,
            life_stage: r.life_stage.label().to_string(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorSummary {
    pub sector: String,
    pub companies: usize,
    pub mean_revenue: f64,
    /// Each transaction touching the sector counted once
    pub total_volume: f64,
}

#[derive(Default)]
struct SectorAcc {
    companies: usize,
    revenue: f64,
    volume: f64,
}

/// Per-sector totals, sorted by sector name. Companies with rejected data
/// are skipped.
pub fn sector_summary<S>(engine: &ScoringEngine<S>) -> Vec<SectorSummary>
where
    S: CompanyDataSource + ?Sized,
{
    let source = engine.source();
    let sector_of: BTreeMap<String, String> = source
        .company_ids()
        .into_iter()
        .filter_map(|id| {
            let sector = source.company_records(&id).first()?.sector.clone();
            Some((id, sector))
        })
        .collect();

    let mut sectors: BTreeMap<String, SectorAcc> = BTreeMap::new();
    for (id, sector) in &sector_of {
        let profile = match engine.profile(id) {
            Ok(Some(p)) => p,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(company_id = %id, error = %e, "skipping company in sector summary");
                continue;
            }
        };

        let acc = sectors.entry(sector.clone()).or_default();
        acc.companies += 1;
        acc.revenue += profile.revenue();
        // A receipt from a same-sector payer was already counted on the payer's side
        let paid: f64 = profile.payments().map(|t| t.amount).sum();
        let received: f64 = profile
            .receipts()
            .filter(|t| t.payer_id != t.receiver_id && sector_of.get(&t.payer_id) != Some(sector))
            .map(|t| t.amount)
            .sum();
        acc.volume += paid + received;
    }

    sectors
        .into_iter()
        .map(|(sector, acc)| SectorSummary {
            sector,
            companies: acc.companies,
            mean_revenue: if acc.companies > 0 {
                acc.revenue / acc.companies as f64
            } else {
                0.0
            },
            total_volume: acc.volume,
        })
        .collect()
}
