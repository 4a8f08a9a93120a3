//! Per-period portfolio snapshot.
//!
//! Rows are either taken from the data source as-is or derived by scoring
//! every company's profile truncated at the period. Percentile thresholds are
//! only computed once every row exists.

use chrono::NaiveDate;
use credit_core::{
    month_start, previous_month, CompanyDataSource, CompanyProfile, LifeStage, SnapshotRow,
};
use credit_scoring::{dependency, health, life_stage, CompanyMetrics, ScoringEngine};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::thresholds::PercentileThresholds;

/// Volume growth above this fraction is labelled Growing, below its negative Declining
const VOLUME_TREND_BAND: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotOrigin {
    /// Supplied by the data source
    Provided,
    /// Computed by the engine from records and transactions
    Derived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VolumeTrend {
    Growing,
    Stable,
    Declining,
}

impl VolumeTrend {
    /// Stable when growth is undefined.
    pub fn from_growth(growth: Option<f64>) -> Self {
        match growth {
            Some(g) if g > VOLUME_TREND_BAND => VolumeTrend::Growing,
            Some(g) if g < -VOLUME_TREND_BAND => VolumeTrend::Declining,
            _ => VolumeTrend::Stable,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VolumeTrend::Growing => "Growing",
            VolumeTrend::Stable => "Stable",
            VolumeTrend::Declining => "Declining",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSnapshot {
    pub period: NaiveDate,
    pub version: u64,
    pub origin: SnapshotOrigin,
    /// Ordered by company id
    pub rows: Vec<SnapshotRow>,
    pub thresholds: Option<PercentileThresholds>,
}

impl PeriodSnapshot {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, company_id: &str) -> Option<&SnapshotRow> {
        self.rows.iter().find(|r| r.company_id == company_id)
    }
}

/// `(vol(P) - vol(P-1)) / vol(P-1)`; `None` without prior volume.
pub fn volume_growth(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 {
        None
    } else {
        Some((current - previous) / previous)
    }
}

/// Score one company as it stood at the end of `period`.
///
/// `None` when the company has no record in that period.
pub fn derive_row(profile: &CompanyProfile, period: NaiveDate) -> Option<SnapshotRow> {
    if !profile.has_period(period) {
        return None;
    }
    let truncated = profile.as_of(period);
    let metrics = CompanyMetrics::from_profile(&truncated)?;

    let health_score = health::score(&metrics).score;
    // N/A risk counts as 0 in the distribution
    let risk_score = dependency::score(&metrics.concentration, !truncated.transactions.is_empty()).score;
    let life_stage = life_stage::assess(&metrics)
        .category
        .unwrap_or(LifeStage::Starting);

    let volume = profile.volume_in_month(period);
    let previous = profile.volume_in_month(previous_month(period));

    Some(SnapshotRow {
        company_id: profile.company_id.clone(),
        period: month_start(period),
        health_score,
        risk_score,
        runway: Some(metrics.liquidity.runway),
        stress_flag: metrics.liquidity.stress_flag,
        volume_growth: volume_growth(volume, previous),
        life_stage,
        balance: metrics.current_balance,
        volume,
    })
}

fn derive_for<S>(engine: &ScoringEngine<S>, company_id: &str, period: NaiveDate) -> Option<SnapshotRow>
where
    S: CompanyDataSource + ?Sized,
{
    match engine.profile(company_id) {
        Ok(Some(profile)) => derive_row(&profile, period),
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(company_id, error = %e, "excluding company from snapshot");
            None
        }
    }
}

/// Build the snapshot for `period` at the source's current version.
pub fn build<S>(engine: &ScoringEngine<S>, period: NaiveDate, parallel: bool) -> PeriodSnapshot
where
    S: CompanyDataSource + ?Sized,
{
    let period = month_start(period);
    let source = engine.source();
    let version = source.snapshot_version();

    let (origin, mut rows) = match source.portfolio_snapshot(period) {
        Some(rows) => (SnapshotOrigin::Provided, rows),
        None => {
            let ids = source.company_ids();
            let rows: Vec<SnapshotRow> = if parallel {
                ids.par_iter()
                    .filter_map(|id| derive_for(engine, id, period))
                    .collect()
            } else {
                ids.iter()
                    .filter_map(|id| derive_for(engine, id, period))
                    .collect()
            };
            (SnapshotOrigin::Derived, rows)
        }
    };
    rows.sort_by(|a, b| a.company_id.cmp(&b.company_id));

    // every row exists before the distribution is read
    let thresholds = PercentileThresholds::from_rows(&rows);

    tracing::info!(
        period = %period,
        version,
        companies = rows.len(),
        origin = ?origin,
        "portfolio snapshot built"
    );

    PeriodSnapshot {
        period,
        version,
        origin,
        rows,
        thresholds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use credit_core::{CompanyMonthlyRecord, Transaction};

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn profile() -> CompanyProfile {
        let records = [(1, 1_000.0), (2, 1_500.0), (3, 1_200.0)]
            .iter()
            .map(|(m, b)| CompanyMonthlyRecord {
                company_id: "A".to_string(),
                period: date(*m, 1),
                balance: *b,
                revenue: 10_000.0,
                sector: "Retail".to_string(),
            })
            .collect();
        let txs = vec![
            Transaction {
                payer_id: "A".to_string(),
                receiver_id: "B".to_string(),
                amount: 200.0,
                kind: "PIX".to_string(),
                date: date(1, 20),
            },
            Transaction {
                payer_id: "C".to_string(),
                receiver_id: "A".to_string(),
                amount: 300.0,
                kind: "TED".to_string(),
                date: date(2, 5),
            },
        ];
        CompanyProfile::new("A", records, txs).unwrap()
    }

    #[test]
    fn test_volume_trend_labels() {
        assert_eq!(VolumeTrend::from_growth(Some(0.2)), VolumeTrend::Growing);
        assert_eq!(VolumeTrend::from_growth(Some(0.1)), VolumeTrend::Stable);
        assert_eq!(VolumeTrend::from_growth(Some(-0.5)), VolumeTrend::Declining);
        assert_eq!(VolumeTrend::from_growth(None), VolumeTrend::Stable);
    }

    #[test]
    fn test_row_uses_history_up_to_period() {
        let row = derive_row(&profile(), date(2, 14)).unwrap();

        assert_eq!(row.period, date(2, 1));
        assert_eq!(row.balance, 1_500.0);
        assert_eq!(row.volume, 300.0);
        assert_relative_eq!(row.volume_growth.unwrap(), 0.5);
        // two records only
        assert_eq!(row.life_stage, LifeStage::Starting);
        assert!(row.runway.unwrap().is_infinite());
        assert!(row.risk_score > 0.0);
    }

    #[test]
    fn test_row_without_prior_volume_has_no_growth() {
        let p = profile();
        let row = derive_row(&p, date(1, 1)).unwrap();
        assert_eq!(row.volume_growth, None);
        // first month: a single balance earns no stability credit
        assert_relative_eq!(row.health_score, 26.25, epsilon = 1e-9);

        // March has no transactions after February's 300
        let march = derive_row(&p, date(3, 1)).unwrap();
        assert_relative_eq!(march.volume_growth.unwrap(), -1.0);
        assert_relative_eq!(march.runway.unwrap(), 4.0);
    }

    #[test]
    fn test_company_absent_in_period_is_skipped() {
        assert!(derive_row(&profile(), date(6, 1)).is_none());
    }
}
