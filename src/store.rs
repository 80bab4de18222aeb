//! Session-scoped, append-only store of call records.
//!
//! The store keeps records in insertion order, which is also the display
//! order. Reads hand out snapshots, so a dashboard can iterate while the
//! session keeps appending. Aggregates are also exposed as free functions
//! over record slices for data loaded from a [`CallJournal`].

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use tracing::warn;

use crate::journal::CallJournal;
use crate::types::CallRecord;

/// In-memory metrics for one session.
#[derive(Debug, Default)]
pub struct MetricsStore {
    records: RwLock<Vec<CallRecord>>,
    journal: Option<CallJournal>,
}

impl MetricsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that mirrors every appended record to `journal`.
    pub fn with_journal(journal: CallJournal) -> Self {
        Self {
            records: RwLock::default(),
            journal: Some(journal),
        }
    }

    pub fn journal(&self) -> Option<&CallJournal> {
        self.journal.as_ref()
    }

    /// Append a record. Journal write failures are logged and otherwise
    /// ignored; the in-memory append always happens.
    pub fn append(&self, record: CallRecord) {
        if let Some(journal) = &self.journal {
            if let Err(e) = journal.append(&record) {
                warn!(
                    path = %journal.path().display(),
                    operation = record.operation(),
                    error = %e,
                    "failed to write call record to journal"
                );
            }
        }
        self.write().push(record);
    }

    /// Snapshot of every record in insertion order.
    pub fn all(&self) -> Vec<CallRecord> {
        self.read().clone()
    }

    /// The last `n` records, oldest first.
    pub fn recent(&self, n: usize) -> Vec<CallRecord> {
        let records = self.read();
        let start = records.len().saturating_sub(n);
        records[start..].to_vec()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Fraction of successful calls; `0.0` for an empty store.
    pub fn success_rate(&self) -> f64 {
        success_rate(&self.read())
    }

    /// Mean duration in milliseconds over records matching `operation`
    /// (all records when `None`); `0.0` when nothing matches.
    pub fn mean_duration(&self, operation: Option<&str>) -> f64 {
        mean_duration(&self.read(), operation)
    }

    /// Longest duration in milliseconds; `0.0` when nothing matches.
    pub fn max_duration(&self, operation: Option<&str>) -> f64 {
        max_duration(&self.read(), operation)
    }

    pub fn counts_by_operation(&self) -> BTreeMap<String, usize> {
        counts_by_operation(&self.read())
    }

    pub fn success_rate_by_operation(&self) -> BTreeMap<String, f64> {
        success_rate_by_operation(&self.read())
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary::from_records(&self.read())
    }

    /// Drop every in-memory record. The journal, if any, is kept.
    pub fn clear(&self) {
        self.write().clear();
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<CallRecord>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<CallRecord>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Headline numbers for a set of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub total_calls: usize,
    pub successes: usize,
    pub failures: usize,
    pub success_rate: f64,
    pub mean_duration_ms: f64,
    pub max_duration_ms: f64,
}

impl MetricsSummary {
    pub fn from_records(records: &[CallRecord]) -> Self {
        let successes = records.iter().filter(|r| r.is_success()).count();
        Self {
            total_calls: records.len(),
            successes,
            failures: records.len() - successes,
            success_rate: success_rate(records),
            mean_duration_ms: mean_duration(records, None),
            max_duration_ms: max_duration(records, None),
        }
    }
}

// ============================================================================
// Aggregates over record slices
// ============================================================================

pub fn success_rate(records: &[CallRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let successes = records.iter().filter(|r| r.is_success()).count();
    successes as f64 / records.len() as f64
}

pub fn mean_duration(records: &[CallRecord], operation: Option<&str>) -> f64 {
    let (sum, count) = matching(records, operation)
        .fold((0.0, 0usize), |(sum, count), r| (sum + r.duration_ms(), count + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

pub fn max_duration(records: &[CallRecord], operation: Option<&str>) -> f64 {
    matching(records, operation)
        .map(CallRecord::duration_ms)
        .fold(0.0, f64::max)
}

pub fn counts_by_operation(records: &[CallRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.operation().to_string()).or_insert(0) += 1;
    }
    counts
}

pub fn success_rate_by_operation(records: &[CallRecord]) -> BTreeMap<String, f64> {
    let mut tallies: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for record in records {
        let entry = tallies.entry(record.operation().to_string()).or_default();
        entry.0 += 1;
        if record.is_success() {
            entry.1 += 1;
        }
    }
    tallies
        .into_iter()
        .map(|(op, (total, ok))| (op, ok as f64 / total as f64))
        .collect()
}

fn matching<'a>(
    records: &'a [CallRecord],
    operation: Option<&'a str>,
) -> impl Iterator<Item = &'a CallRecord> {
    records
        .iter()
        .filter(move |r| operation.is_none_or(|op| r.operation() == op))
}
