//! In-memory data source.
//!
//! Holds a loaded [`Dataset`] indexed by company. Used by the CLI and by tests;
//! production loaders implement [`CompanyDataSource`] directly.

use std::collections::BTreeMap;
use std::io::Read;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::same_month;
use crate::{CompanyDataSource, CompanyMonthlyRecord, SnapshotRow, Transaction};

/// Raw portfolio data as handed over by the loading layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub records: Vec<CompanyMonthlyRecord>,
    pub transactions: Vec<Transaction>,
    /// Optional precomputed per-period scores
    #[serde(default)]
    pub snapshots: Vec<SnapshotRow>,
}

impl Dataset {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    records: BTreeMap<String, Vec<CompanyMonthlyRecord>>,
    transactions: Vec<Transaction>,
    by_company: BTreeMap<String, Vec<usize>>,
    snapshots: Vec<SnapshotRow>,
    version: u64,
}

impl InMemorySource {
    pub fn new(dataset: Dataset) -> Self {
        let mut source = Self::default();
        source.replace(dataset);
        source
    }

    /// Swap in a fresh dataset and bump the snapshot version.
    pub fn replace(&mut self, dataset: Dataset) {
        let mut records: BTreeMap<String, Vec<CompanyMonthlyRecord>> = BTreeMap::new();
        for record in dataset.records {
            records.entry(record.company_id.clone()).or_default().push(record);
        }

        let mut by_company: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (idx, tx) in dataset.transactions.iter().enumerate() {
            by_company.entry(tx.payer_id.clone()).or_default().push(idx);
            if tx.receiver_id != tx.payer_id {
                by_company.entry(tx.receiver_id.clone()).or_default().push(idx);
            }
        }

        self.records = records;
        self.transactions = dataset.transactions;
        self.by_company = by_company;
        self.snapshots = dataset.snapshots;
        self.version += 1;

        tracing::debug!(
            companies = self.records.len(),
            transactions = self.transactions.len(),
            version = self.version,
            "dataset loaded"
        );
    }

    /// Distinct reporting months, ascending
    pub fn periods(&self) -> Vec<NaiveDate> {
        let mut periods: Vec<NaiveDate> = self
            .records
            .values()
            .flatten()
            .map(|r| crate::types::month_start(r.period))
            .collect();
        periods.sort();
        periods.dedup();
        periods
    }
}

impl CompanyDataSource for InMemorySource {
    fn company_records(&self, company_id: &str) -> Vec<CompanyMonthlyRecord> {
        self.records.get(company_id).cloned().unwrap_or_default()
    }

    fn transactions_for(&self, company_id: &str) -> Vec<Transaction> {
        self.by_company
            .get(company_id)
            .map(|idxs| idxs.iter().map(|&i| self.transactions[i].clone()).collect())
            .unwrap_or_default()
    }

    fn company_ids(&self) -> Vec<String> {
        self.records.keys().cloned().collect()
    }

    fn snapshot_version(&self) -> u64 {
        self.version
    }

    fn portfolio_snapshot(&self, period: NaiveDate) -> Option<Vec<SnapshotRow>> {
        let rows: Vec<SnapshotRow> = self
            .snapshots
            .iter()
            .filter(|row| same_month(row.period, period))
            .cloned()
            .collect();
        if rows.is_empty() {
            None
        } else {
            Some(rows)
        }
    }
}
