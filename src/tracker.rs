//! Call tracking: time one remote call, classify it, record it.
//!
//! # Guarantees
//!
//! - the wrapped call runs exactly once; there is no retry
//! - exactly one [`CallRecord`] is appended per tracked call, on every exit
//!   path: normal return, error, timeout, or the tracking future being
//!   dropped before completion
//! - the caller never sees a result without the matching record already
//!   being in the store
//!
//! # Flow
//!
//! ```text
//! CallTracker::track("generate_image", || gateway.generate_image(&req))
//!         │
//!         ▼
//!   CallTimer::start ──► started_at, Instant
//!         │
//!         ▼
//!   call() [under optional timeout]
//!         │
//!    ┌────┴─────────────┬───────────────┐
//!    ▼                  ▼               ▼
//!  Ok(T)             Err(e)         dropped
//!    │                  │               │
//! finish(None)     finish(Some(e))   Drop: Cancelled
//!    └────────► MetricsStore::append ◄──┘
//! ```

use std::future::Future;
use std::time::Duration;

use time::OffsetDateTime;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::store::MetricsStore;
use crate::telemetry;
use crate::types::CallRecord;
use crate::{AdsnapError, ErrorKind, Result};

/// Wraps remote calls and records their outcome into a [`MetricsStore`].
#[derive(Debug, Clone, Copy)]
pub struct CallTracker<'a> {
    store: &'a MetricsStore,
    timeout: Option<Duration>,
}

impl<'a> CallTracker<'a> {
    /// Create a tracker with no timeout.
    pub fn new(store: &'a MetricsStore) -> Self {
        Self {
            store,
            timeout: None,
        }
    }

    /// Fail calls that run longer than `timeout` with a `Timeout` record.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Invoke `call` once, time it, and append one record to the store.
    ///
    /// The error message of a failed call is recorded verbatim (its
    /// `Display` output). The returned record is a copy of the one appended.
    pub async fn track<T, F, Fut>(&self, operation: &str, call: F) -> (Result<T>, CallRecord)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let timer = CallTimer::start(self.store, operation);
        let result = match self.timeout {
            Some(after) => match tokio::time::timeout(after, call()).await {
                Ok(result) => result,
                Err(_) => Err(AdsnapError::Timeout { after }),
            },
            None => call().await,
        };
        let record = timer.finish(result.as_ref().err());
        (result, record)
    }
}

/// Scoped timer for one call.
///
/// Acquired immediately before the call starts. [`CallTimer::finish`]
/// commits the outcome; a timer dropped without finishing commits a
/// `Cancelled` failure instead, so no exit path skips the record.
#[derive(Debug)]
pub struct CallTimer<'a> {
    store: &'a MetricsStore,
    operation: String,
    started_at: OffsetDateTime,
    start: Instant,
    finished: bool,
}

impl<'a> CallTimer<'a> {
    pub fn start(store: &'a MetricsStore, operation: impl Into<String>) -> Self {
        Self {
            store,
            operation: operation.into(),
            started_at: OffsetDateTime::now_utc(),
            start: Instant::now(),
            finished: false,
        }
    }

    /// Commit the outcome: `None` for success, `Some(err)` for failure.
    pub fn finish(mut self, error: Option<&AdsnapError>) -> CallRecord {
        self.finished = true;
        let elapsed = self.start.elapsed();
        let record = match error {
            None => CallRecord::success(self.operation.as_str(), self.started_at, elapsed),
            Some(e) => CallRecord::failure(
                self.operation.as_str(),
                self.started_at,
                elapsed,
                e.kind(),
                e.to_string(),
            ),
        };
        commit(self.store, record.clone());
        record
    }
}

impl Drop for CallTimer<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let record = CallRecord::failure(
            self.operation.as_str(),
            self.started_at,
            self.start.elapsed(),
            ErrorKind::Cancelled,
            AdsnapError::Cancelled.to_string(),
        );
        commit(self.store, record);
    }
}

/// Log, emit metrics, and append.
fn commit(store: &MetricsStore, record: CallRecord) {
    let operation = record.operation().to_owned();
    let duration_ms = record.duration_ms();

    match (record.error_kind(), record.error_message()) {
        (Some(kind), Some(message)) => {
            warn!(
                operation = %operation,
                duration_ms,
                kind = kind.as_str(),
                error = message,
                "remote call failed"
            );
            metrics::counter!(telemetry::CALL_ERRORS_TOTAL,
                "operation" => operation.clone(),
                "kind" => kind.as_str(),
            )
            .increment(1);
        }
        _ => info!(operation = %operation, duration_ms, "remote call succeeded"),
    }

    let status = if record.is_success() { "ok" } else { "error" };
    metrics::counter!(telemetry::CALLS_TOTAL,
        "operation" => operation.clone(),
        "status" => status,
    )
    .increment(1);
    metrics::histogram!(telemetry::CALL_DURATION_SECONDS,
        "operation" => operation,
    )
    .record(duration_ms / 1000.0);

    store.append(record);
}
