//! Portfolio-level screening on top of the scoring engine.
//!
//! Builds one snapshot per reporting period, derives percentile thresholds
//! from it, and answers cohort, statistics and ranking queries against the
//! cached snapshot.

use std::sync::Arc;

use chrono::NaiveDate;
use credit_core::{month_start, CompanyDataSource, ScoreBand};
use credit_scoring::ScoringEngine;

pub mod cache;
pub mod cohorts;
pub mod config;
pub mod ranking;
pub mod snapshot;
pub mod stats;
pub mod thresholds;

#[cfg(test)]
mod tests;

pub use cache::SnapshotCache;
pub use cohorts::PortfolioCohorts;
pub use config::ScreenerConfig;
pub use ranking::{CreditRankEntry, SectorSummary};
pub use snapshot::{PeriodSnapshot, SnapshotOrigin, VolumeTrend};
pub use stats::PeriodStats;
pub use thresholds::PercentileThresholds;

pub struct PortfolioAggregator<S: ?Sized> {
    engine: ScoringEngine<S>,
    config: ScreenerConfig,
    /// Snapshots per (period, data version)
    snapshots: SnapshotCache,
}

impl<S: CompanyDataSource + ?Sized> PortfolioAggregator<S> {
    pub fn new(engine: ScoringEngine<S>, config: ScreenerConfig) -> Self {
        Self {
            engine,
            config,
            snapshots: SnapshotCache::new(),
        }
    }

    pub fn engine(&self) -> &ScoringEngine<S> {
        &self.engine
    }

    pub fn config(&self) -> &ScreenerConfig {
        &self.config
    }

    /// Every reporting month present in the data, ascending
    pub fn periods(&self) -> Vec<NaiveDate> {
        let source = self.engine.source();
        let mut periods: Vec<NaiveDate> = source
            .company_ids()
            .iter()
            .flat_map(|id| source.company_records(id))
            .map(|r| month_start(r.period))
            .collect();
        periods.sort();
        periods.dedup();
        periods
    }

    pub fn latest_period(&self) -> Option<NaiveDate> {
        self.periods().last().copied()
    }

    /// Snapshot for the month containing `period`, built at most once per data version.
    pub fn snapshot(&self, period: NaiveDate) -> Arc<PeriodSnapshot> {
        let period = month_start(period);
        let version = self.engine.source().snapshot_version();
        self.snapshots.get_or_build(period, version, || {
            snapshot::build(&self.engine, period, self.config.parallel_snapshot)
        })
    }

    pub fn thresholds(&self, period: NaiveDate) -> Option<PercentileThresholds> {
        self.snapshot(period).thresholds
    }

    pub fn compute_portfolio_cohorts(&self, period: NaiveDate) -> PortfolioCohorts {
        cohorts::select(&self.snapshot(period), self.config.cohort_limit)
    }

    pub fn period_stats(&self, period: NaiveDate) -> PeriodStats {
        stats::compute(&self.snapshot(period))
    }

    /// Companies ranked by composite credit score over their full history.
    pub fn credit_ranking(&self, limit: usize) -> Vec<CreditRankEntry> {
        ranking::credit_ranking(&self.engine.all_reports(), limit)
    }

    pub fn sector_summary(&self) -> Vec<SectorSummary> {
        ranking::sector_summary(&self.engine)
    }

    /// Band a health score against the period's health quartiles.
    ///
    /// The score is multiplied by `health_percentile_scale` first.
    pub fn health_band(&self, period: NaiveDate, health: f64) -> Option<ScoreBand> {
        let scaled = health * self.config.health_percentile_scale;
        self.thresholds(period).map(|t| t.health_band(scaled))
    }

    pub fn risk_concentrated(&self, period: NaiveDate, risk: f64) -> Option<bool> {
        self.thresholds(period).map(|t| t.risk_concentrated(risk))
    }

    /// Drop every cached snapshot.
    pub fn invalidate(&self) {
        self.snapshots.clear();
    }
}
