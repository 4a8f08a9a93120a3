use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;

use crate::snapshot::PeriodSnapshot;

/// Built snapshots keyed by `(period, snapshot_version)`.
///
/// Inserting a snapshot at a newer version evicts every entry from older
/// versions, so a data reload never serves stale rows.
#[derive(Default)]
pub struct SnapshotCache {
    entries: DashMap<(NaiveDate, u64), Arc<PeriodSnapshot>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, period: NaiveDate, version: u64) -> Option<Arc<PeriodSnapshot>> {
        self.entries
            .get(&(period, version))
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Return the cached snapshot or build, store and return a new one.
    pub fn get_or_build<F>(&self, period: NaiveDate, version: u64, build: F) -> Arc<PeriodSnapshot>
    where
        F: FnOnce() -> PeriodSnapshot,
    {
        if let Some(hit) = self.get(period, version) {
            tracing::debug!(period = %period, version, "snapshot cache hit");
            return hit;
        }

        let stale = self.entries.iter().filter(|e| e.key().1 != version).count();
        if stale > 0 {
            self.entries.retain(|(_, v), _| *v == version);
            tracing::debug!(evicted = stale, version, "dropped snapshots from older versions");
        }

        let snapshot = Arc::new(build());
        self.entries
            .entry((period, version))
            .or_insert_with(|| Arc::clone(&snapshot))
            .value()
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
