use std::sync::{Arc, RwLock};

use approx::assert_relative_eq;
use chrono::NaiveDate;
use credit_core::{
    CompanyDataSource, CompanyMonthlyRecord, Dataset, InMemorySource, LifeStage, ScoreBand,
    SnapshotRow, Transaction,
};
use credit_scoring::ScoringEngine;

use crate::{PortfolioAggregator, ScreenerConfig, SnapshotOrigin};

/// Reloadable source so tests can bump the data version under a live aggregator.
struct SharedSource(RwLock<InMemorySource>);

impl SharedSource {
    fn reload(&self, dataset: Dataset) {
        self.0.write().unwrap().replace(dataset);
    }
}

impl CompanyDataSource for SharedSource {
    fn company_records(&self, company_id: &str) -> Vec<CompanyMonthlyRecord> {
        self.0.read().unwrap().company_records(company_id)
    }

    fn transactions_for(&self, company_id: &str) -> Vec<Transaction> {
        self.0.read().unwrap().transactions_for(company_id)
    }

    fn company_ids(&self) -> Vec<String> {
        self.0.read().unwrap().company_ids()
    }

    fn snapshot_version(&self) -> u64 {
        self.0.read().unwrap().snapshot_version()
    }

    fn portfolio_snapshot(&self, period: NaiveDate) -> Option<Vec<SnapshotRow>> {
        self.0.read().unwrap().portfolio_snapshot(period)
    }
}

fn month(m: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, 1).unwrap()
}

fn series(id: &str, sector: &str, revenue: f64, balances: [f64; 3]) -> Vec<CompanyMonthlyRecord> {
    balances
        .iter()
        .enumerate()
        .map(|(i, b)| CompanyMonthlyRecord {
            company_id: id.to_string(),
            period: month(i as u32 + 1),
            balance: *b,
            revenue,
            sector: sector.to_string(),
        })
        .collect()
}

fn tx(payer: &str, receiver: &str, amount: f64, m: u32) -> Transaction {
    Transaction {
        payer_id: payer.to_string(),
        receiver_id: receiver.to_string(),
        amount,
        kind: "PIX".to_string(),
        date: NaiveDate::from_ymd_opt(2025, m, 10).unwrap(),
    }
}

/// G grows with diversified, rising volume; D burns cash through one partner;
/// F1 and F2 are flat and have no transactions.
fn portfolio() -> Dataset {
    let mut records = Vec::new();
    records.extend(series("G", "Retail", 500_000.0, [100_000.0, 110_000.0, 121_000.0]));
    records.extend(series("D", "Retail", 100_000.0, [50_000.0, 20_000.0, 5_000.0]));
    records.extend(series("F1", "Services", 100_000.0, [10_000.0; 3]));
    records.extend(series("F2", "Services", 100_000.0, [10_000.0; 3]));

    let mut transactions = Vec::new();
    for p in ["P1", "P2", "P3", "P4"] {
        transactions.push(tx("G", p, 1_000.0, 2));
    }
    for r in ["R1", "R2", "R3", "R4"] {
        transactions.push(tx(r, "G", 2_000.0, 3));
    }
    transactions.push(tx("D", "X", 10_000.0, 2));
    transactions.push(tx("D", "X", 5_000.0, 3));

    Dataset {
        records,
        transactions,
        snapshots: vec![],
    }
}

fn aggregator(dataset: Dataset, config: ScreenerConfig) -> (Arc<SharedSource>, PortfolioAggregator<SharedSource>) {
    let source = Arc::new(SharedSource(RwLock::new(InMemorySource::new(dataset))));
    let engine = ScoringEngine::new(Arc::clone(&source));
    (source, PortfolioAggregator::new(engine, config))
}

#[test]
fn test_periods_are_sorted_months() {
    let (_, agg) = aggregator(portfolio(), ScreenerConfig::default());
    assert_eq!(agg.periods(), vec![month(1), month(2), month(3)]);
    assert_eq!(agg.latest_period(), Some(month(3)));
}

#[test]
fn test_derived_cohorts() {
    let (_, agg) = aggregator(portfolio(), ScreenerConfig::default());

    let snapshot = agg.snapshot(month(3));
    assert_eq!(snapshot.origin, SnapshotOrigin::Derived);
    assert_eq!(snapshot.rows.len(), 4);

    let g = snapshot.row("G").unwrap();
    assert_eq!(g.life_stage, LifeStage::Growing);
    assert_relative_eq!(g.volume_growth.unwrap(), 1.0);
    assert_relative_eq!(g.risk_score, 55.276, epsilon = 1e-9);

    let d = snapshot.row("D").unwrap();
    assert_eq!(d.life_stage, LifeStage::Declining);
    assert!(d.stress_flag);
    assert_relative_eq!(d.volume_growth.unwrap(), -0.5);

    // flat companies without transactions carry a zero risk score
    assert_eq!(snapshot.row("F1").unwrap().risk_score, 0.0);

    let cohorts = agg.compute_portfolio_cohorts(month(3));
    let ideal: Vec<&str> = cohorts.ideal.iter().map(|r| r.company_id.as_str()).collect();
    let risky: Vec<&str> = cohorts.high_risk.iter().map(|r| r.company_id.as_str()).collect();
    assert_eq!(ideal, vec!["G"]);
    assert_eq!(risky, vec!["D"]);
}

#[test]
fn test_snapshot_is_cached_until_data_changes() {
    let (source, agg) = aggregator(portfolio(), ScreenerConfig {
        parallel_snapshot: false,
        ..Default::default()
    });

    let first = agg.snapshot(month(3));
    let again = agg.snapshot(NaiveDate::from_ymd_opt(2025, 3, 17).unwrap());
    assert!(Arc::ptr_eq(&first, &again));

    let mut reduced = portfolio();
    reduced.records.retain(|r| r.company_id != "F2");
    source.reload(reduced);

    let fresh = agg.snapshot(month(3));
    assert!(!Arc::ptr_eq(&first, &fresh));
    assert_eq!(fresh.version, first.version + 1);
    assert_eq!(fresh.rows.len(), 3);
}

#[test]
fn test_parallel_and_sequential_snapshots_match() {
    let (_, parallel) = aggregator(portfolio(), ScreenerConfig::default());
    let (_, sequential) = aggregator(portfolio(), ScreenerConfig {
        parallel_snapshot: false,
        ..Default::default()
    });
    assert_eq!(parallel.snapshot(month(3)).rows, sequential.snapshot(month(3)).rows);
}

#[test]
fn test_provided_snapshot_is_used_as_is() {
    let row = |id: &str, health: f64, risk: f64| SnapshotRow {
        company_id: id.to_string(),
        period: month(3),
        health_score: health,
        risk_score: risk,
        runway: Some(12.0),
        stress_flag: false,
        volume_growth: Some(0.3),
        life_stage: LifeStage::Mature,
        balance: 1_000.0,
        volume: 1_000.0,
    };
    let mut dataset = portfolio();
    dataset.snapshots = vec![
        row("A", 80.0, 10.0),
        row("B", 60.0, 20.0),
        row("C", 50.0, 30.0),
        SnapshotRow {
            runway: None,
            stress_flag: true,
            volume_growth: Some(-0.2),
            life_stage: LifeStage::PersistentDecline,
            ..row("Z", 5.0, 95.0)
        },
    ];
    let (_, agg) = aggregator(dataset, ScreenerConfig::default());

    let snapshot = agg.snapshot(month(3));
    assert_eq!(snapshot.origin, SnapshotOrigin::Provided);
    assert_eq!(snapshot.rows.len(), 4);

    let cohorts = agg.compute_portfolio_cohorts(month(3));
    assert_eq!(cohorts.high_risk.len(), 1);
    assert_eq!(cohorts.high_risk[0].company_id, "Z");
    // A's risk sits below q75 and its health above q25
    assert!(cohorts.ideal.iter().any(|r| r.company_id == "A"));

    // other periods fall back to derivation
    assert_eq!(agg.snapshot(month(2)).origin, SnapshotOrigin::Derived);
}

#[test]
fn test_empty_period_yields_empty_cohorts() {
    let (_, agg) = aggregator(portfolio(), ScreenerConfig::default());
    let cohorts = agg.compute_portfolio_cohorts(month(9));
    assert!(cohorts.thresholds.is_none());
    assert!(cohorts.ideal.is_empty() && cohorts.high_risk.is_empty());
    assert_eq!(agg.health_band(month(9), 50.0), None);
}

#[test]
fn test_health_band_applies_configured_scale() {
    let (_, plain) = aggregator(portfolio(), ScreenerConfig::default());
    assert_eq!(plain.health_band(month(3), 6.0), Some(ScoreBand::Low));
    assert_eq!(plain.risk_concentrated(month(3), 74.0), Some(true));

    let (_, scaled) = aggregator(portfolio(), ScreenerConfig {
        health_percentile_scale: 10.0,
        ..Default::default()
    });
    assert_eq!(scaled.health_band(month(3), 6.0), Some(ScoreBand::High));
}

#[test]
fn test_period_stats() {
    let (_, agg) = aggregator(portfolio(), ScreenerConfig::default());
    let stats = agg.period_stats(month(3));

    assert_eq!(stats.companies, 4);
    assert_eq!(stats.stressed, 1);
    assert_eq!(stats.negative_balance, 0);
    assert_eq!(stats.life_stages["Mature"], 2);
    // only D burns cash
    assert_relative_eq!(stats.runway_mean.unwrap(), 5_000.0 / 22_500.0, epsilon = 1e-9);
    assert_relative_eq!(stats.volume_growth_mean.unwrap(), 0.25);
}

#[test]
fn test_credit_ranking_and_sectors() {
    let (_, agg) = aggregator(portfolio(), ScreenerConfig::default());

    let ranking = agg.credit_ranking(3);
    let order: Vec<(&str, u8)> = ranking
        .iter()
        .map(|e| (e.company_id.as_str(), e.credit.total))
        .collect();
    assert_eq!(order, vec![("G", 70), ("F1", 45), ("F2", 45)]);
    assert_eq!(ranking[0].rank, 1);

    let sectors = agg.sector_summary();
    assert_eq!(sectors.len(), 2);
    assert_eq!(sectors[0].sector, "Retail");
    assert_eq!(sectors[0].companies, 2);
    assert_relative_eq!(sectors[0].mean_revenue, 300_000.0);
    assert_relative_eq!(sectors[0].total_volume, 27_000.0);
    assert_relative_eq!(sectors[1].total_volume, 0.0);
}
