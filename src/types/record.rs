//! Per-call bookkeeping records.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::ErrorKind;

/// Immutable record of one attempted remote call.
///
/// Created exactly once per call by the [`CallTracker`](crate::CallTracker),
/// after the call returned, failed, timed out or was dropped. Fields are only
/// readable; a failure always carries a non-empty message and a success never
/// carries one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCallRecord")]
pub struct CallRecord {
    operation: String,
    #[serde(with = "time::serde::rfc3339")]
    started_at: OffsetDateTime,
    duration_ms: f64,
    outcome: Outcome,
}

/// How a tracked call ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure { kind: ErrorKind, message: String },
}

impl CallRecord {
    /// Record a call that returned normally.
    pub fn success(
        operation: impl Into<String>,
        started_at: OffsetDateTime,
        duration: Duration,
    ) -> Self {
        Self {
            operation: operation.into(),
            started_at,
            duration_ms: duration_to_ms(duration),
            outcome: Outcome::Success,
        }
    }

    /// Record a failed call. An empty message is replaced by a description
    /// of `kind`.
    pub fn failure(
        operation: impl Into<String>,
        started_at: OffsetDateTime,
        duration: Duration,
        kind: ErrorKind,
        message: impl Into<String>,
    ) -> Self {
        let mut message = message.into();
        if message.trim().is_empty() {
            message = kind.describe().to_string();
        }
        Self {
            operation: operation.into(),
            started_at,
            duration_ms: duration_to_ms(duration),
            outcome: Outcome::Failure { kind, message },
        }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn started_at(&self) -> OffsetDateTime {
        self.started_at
    }

    /// Elapsed wall-clock time in milliseconds; never negative.
    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_ms / 1000.0)
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success)
    }

    /// Error message, present iff the call failed.
    pub fn error_message(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Success => None,
            Outcome::Failure { message, .. } => Some(message),
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match &self.outcome {
            Outcome::Success => None,
            Outcome::Failure { kind, .. } => Some(*kind),
        }
    }
}

fn duration_to_ms(duration: Duration) -> f64 {
    duration.as_nanos() as f64 / 1_000_000.0
}

/// Wire form, checked on the way in so journals cannot smuggle in records
/// that break the invariants.
#[derive(Deserialize)]
struct RawCallRecord {
    operation: String,
    #[serde(with = "time::serde::rfc3339")]
    started_at: OffsetDateTime,
    duration_ms: f64,
    outcome: Outcome,
}

impl TryFrom<RawCallRecord> for CallRecord {
    type Error = String;

    fn try_from(raw: RawCallRecord) -> std::result::Result<Self, Self::Error> {
        if !raw.duration_ms.is_finite() || raw.duration_ms < 0.0 {
            return Err(format!("invalid duration_ms: {}", raw.duration_ms));
        }
        if let Outcome::Failure { message, .. } = &raw.outcome {
            if message.trim().is_empty() {
                return Err("failure record without an error message".to_string());
            }
        }
        Ok(Self {
            operation: raw.operation,
            started_at: raw.started_at,
            duration_ms: raw.duration_ms,
            outcome: raw.outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_with_empty_message_gets_description() {
        let record = CallRecord::failure(
            "generate_image",
            OffsetDateTime::now_utc(),
            Duration::ZERO,
            ErrorKind::NetworkError,
            "  ",
        );
        assert_eq!(record.error_message(), Some("network failure"));
    }

    #[test]
    fn success_has_no_error() {
        let record = CallRecord::success(
            "generate_image",
            OffsetDateTime::now_utc(),
            Duration::from_millis(12),
        );
        assert!(record.is_success());
        assert!(record.error_message().is_none());
        assert!(record.error_kind().is_none());
        assert!((record.duration_ms() - 12.0).abs() < 1e-9);
    }

    #[test]
    fn serde_preserves_record() {
        let record = CallRecord::failure(
            "add_shadow",
            OffsetDateTime::now_utc(),
            Duration::from_millis(30),
            ErrorKind::RemoteError,
            "API Error: 500 - boom",
        );
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"status\":\"failure\""));
        let back: CallRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.operation(), "add_shadow");
        assert_eq!(back.error_kind(), Some(ErrorKind::RemoteError));
        assert_eq!(back.error_message(), Some("API Error: 500 - boom"));
    }

    #[test]
    fn rejects_negative_duration() {
        let json = r#"{"operation":"x","started_at":"2026-01-01T00:00:00Z","duration_ms":-1.0,"outcome":{"status":"success"}}"#;
        assert!(serde_json::from_str::<CallRecord>(json).is_err());
    }

    #[test]
    fn rejects_failure_without_message() {
        let json = r#"{"operation":"x","started_at":"2026-01-01T00:00:00Z","duration_ms":1.0,"outcome":{"status":"failure","kind":"timeout","message":""}}"#;
        assert!(serde_json::from_str::<CallRecord>(json).is_err());
    }
}
