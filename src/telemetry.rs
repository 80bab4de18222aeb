//! Telemetry metric name constants.
//!
//! Consumers install their own `metrics` recorder (prometheus, statsd, ...);
//! without one, every metric call is a no-op. The session-scoped
//! [`MetricsStore`](crate::MetricsStore) is recorded independently and does
//! not depend on a recorder.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `adsnap_`. Counters end in `_total`,
//! histograms carry their unit (`_seconds`).
//!
//! # Common labels
//!
//! - `operation`: feature invoked (e.g. "generate_image", "add_shadow")
//! - `status`: outcome: "ok" or "error"
//! - `kind`: error classification (see [`ErrorKind`](crate::ErrorKind))

/// Total tracked remote calls.
///
/// Labels: `operation`, `status` ("ok" | "error").
pub const CALLS_TOTAL: &str = "adsnap_calls_total";

/// Tracked call duration in seconds.
///
/// Labels: `operation`.
pub const CALL_DURATION_SECONDS: &str = "adsnap_call_duration_seconds";

/// Total failed calls by error kind.
///
/// Labels: `operation`, `kind`.
pub const CALL_ERRORS_TOTAL: &str = "adsnap_call_errors_total";

/// Total requests rejected by the validator before any remote call.
///
/// Labels: `operation`, `kind`.
pub const VALIDATION_FAILURES_TOTAL: &str = "adsnap_validation_failures_total";

/// Total response cache hits.
///
/// Labels: `operation`.
pub const CACHE_HITS_TOTAL: &str = "adsnap_cache_hits_total";

/// Total response cache misses.
///
/// Labels: `operation`.
pub const CACHE_MISSES_TOTAL: &str = "adsnap_cache_misses_total";
