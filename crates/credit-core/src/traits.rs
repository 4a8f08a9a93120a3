use chrono::NaiveDate;

use crate::{CompanyMonthlyRecord, SnapshotRow, Transaction};

/// Anything that renders as a categorical label
pub trait Categorical {
    fn label(&self) -> &'static str;
}

/// Read-only access to the portfolio data the engine scores.
///
/// Implementations own loading and versioning; the engine only reads.
pub trait CompanyDataSource: Send + Sync {
    /// All records of one company, in any order. Empty when unknown.
    fn company_records(&self, company_id: &str) -> Vec<CompanyMonthlyRecord>;

    /// Every transaction where the company is payer or receiver.
    fn transactions_for(&self, company_id: &str) -> Vec<Transaction>;

    /// Every company that has at least one record
    fn company_ids(&self) -> Vec<String>;

    /// Identifies the current data snapshot; must change whenever data changes.
    fn snapshot_version(&self) -> u64;

    /// Precomputed per-company scores for a period, if the source has them.
    fn portfolio_snapshot(&self, _period: NaiveDate) -> Option<Vec<SnapshotRow>> {
        None
    }
}
