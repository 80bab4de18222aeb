//! Read-only dashboard over call records.
//!
//! A [`DashboardReport`] is a snapshot: building one never writes to the
//! store, and later appends do not change it. Render it with `Display`
//! for a terminal or serialize it for JSON consumers.

use std::fmt;

use serde::Serialize;
use time::format_description::well_known::Rfc3339;

use crate::store::{self, MetricsStore, MetricsSummary};
use crate::types::CallRecord;

/// Number of records shown in the "recent calls" section.
pub const RECENT_LIMIT: usize = 10;

/// Aggregated view of one session's (or one journal's) calls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub summary: MetricsSummary,
    /// One row per operation, sorted by name.
    pub operations: Vec<OperationRow>,
    /// Up to [`RECENT_LIMIT`] most recent records, newest first.
    pub recent: Vec<CallRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationRow {
    pub operation: String,
    pub calls: usize,
    pub success_rate: f64,
    pub mean_duration_ms: f64,
}

impl DashboardReport {
    pub fn from_store(store: &MetricsStore) -> Self {
        Self::from_records(&store.all())
    }

    pub fn from_records(records: &[CallRecord]) -> Self {
        let rates = store::success_rate_by_operation(records);
        let operations = store::counts_by_operation(records)
            .into_iter()
            .map(|(operation, calls)| OperationRow {
                success_rate: rates.get(&operation).copied().unwrap_or(0.0),
                mean_duration_ms: store::mean_duration(records, Some(operation.as_str())),
                operation,
                calls,
            })
            .collect();

        let recent = records.iter().rev().take(RECENT_LIMIT).cloned().collect();

        Self {
            summary: MetricsSummary::from_records(records),
            operations,
            recent,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.summary.total_calls == 0
    }
}

impl fmt::Display for DashboardReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "No API calls recorded yet.");
        }

        let s = &self.summary;
        writeln!(f, "API calls")?;
        writeln!(f, "  total         {}", s.total_calls)?;
        writeln!(f, "  succeeded     {}", s.successes)?;
        writeln!(f, "  failed        {}", s.failures)?;
        writeln!(f, "  success rate  {:.1}%", s.success_rate * 100.0)?;
        writeln!(f, "  mean duration {:.0} ms", s.mean_duration_ms)?;
        writeln!(f, "  max duration  {:.0} ms", s.max_duration_ms)?;

        writeln!(f)?;
        writeln!(
            f,
            "{:<20} {:>6} {:>9} {:>12}",
            "operation", "calls", "success", "mean (ms)"
        )?;
        for row in &self.operations {
            writeln!(
                f,
                "{:<20} {:>6} {:>8.1}% {:>12.0}",
                row.operation,
                row.calls,
                row.success_rate * 100.0,
                row.mean_duration_ms
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Recent calls")?;
        for record in &self.recent {
            let when = record
                .started_at()
                .format(&Rfc3339)
                .unwrap_or_else(|_| "-".to_string());
            let status = match record.error_message() {
                None => "ok".to_string(),
                Some(message) => format!("error: {message}"),
            };
            writeln!(
                f,
                "  {when}  {:<20} {:>8.0} ms  {status}",
                record.operation(),
                record.duration_ms()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use std::time::Duration;
    use time::OffsetDateTime;

    fn ok(op: &str, ms: u64) -> CallRecord {
        CallRecord::success(op, OffsetDateTime::UNIX_EPOCH, Duration::from_millis(ms))
    }

    fn failed(op: &str, ms: u64) -> CallRecord {
        CallRecord::failure(
            op,
            OffsetDateTime::UNIX_EPOCH,
            Duration::from_millis(ms),
            ErrorKind::RemoteError,
            "API Error: 500 - boom",
        )
    }

    #[test]
    fn empty_report() {
        let report = DashboardReport::from_records(&[]);
        assert!(report.is_empty());
        assert!(report.operations.is_empty());
        assert_eq!(report.to_string(), "No API calls recorded yet.\n");
    }

    #[test]
    fn rows_per_operation() {
        let records = vec![
            ok("generate_image", 100),
            failed("generate_image", 300),
            ok("add_shadow", 50),
        ];
        let report = DashboardReport::from_records(&records);

        assert_eq!(report.operations.len(), 2);
        let add_shadow = &report.operations[0];
        assert_eq!(add_shadow.operation, "add_shadow");
        assert_eq!(add_shadow.calls, 1);
        assert_eq!(add_shadow.success_rate, 1.0);

        let generate = &report.operations[1];
        assert_eq!(generate.calls, 2);
        assert_eq!(generate.success_rate, 0.5);
        assert_eq!(generate.mean_duration_ms, 200.0);
    }

    #[test]
    fn recent_is_newest_first_and_capped() {
        let records: Vec<_> = (0..15).map(|i| ok("generate_image", i)).collect();
        let report = DashboardReport::from_records(&records);
        assert_eq!(report.recent.len(), RECENT_LIMIT);
        assert_eq!(report.recent[0].duration_ms(), 14.0);
    }

    #[test]
    fn renders_failures_with_message() {
        let report = DashboardReport::from_records(&[failed("erase_foreground", 12)]);
        let text = report.to_string();
        assert!(text.contains("erase_foreground"));
        assert!(text.contains("error: API Error: 500 - boom"));
        assert!(text.contains("success rate  0.0%"));
    }
}
