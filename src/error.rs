//! adsnap error types

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

/// adsnap error types
#[derive(Debug, thiserror::Error)]
pub enum AdsnapError {
    // Input errors, raised before any remote call
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("API key not configured (set BRIA_API_KEY)")]
    MissingApiKey,

    // Remote call errors
    #[error("request timed out after {after:?}")]
    Timeout { after: Duration },

    /// Non-2xx status, or an application-level error in a 2xx body.
    ///
    /// The message is shown to the user and recorded verbatim, so it is the
    /// whole display text.
    #[error("{message}")]
    Remote {
        status: Option<u16>,
        message: String,
    },

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("call cancelled before completion")]
    Cancelled,

    #[error("operation not implemented: {0}")]
    NotImplemented(&'static str),

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl AdsnapError {
    /// Classify this error for call records and metrics labels.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(e) => e.kind(),
            Self::MissingApiKey => ErrorKind::MissingApiKey,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Remote { .. } => ErrorKind::RemoteError,
            Self::Network(_) => ErrorKind::NetworkError,
            Self::InvalidResponse(_) | Self::Json(_) => ErrorKind::InvalidResponse,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::NotImplemented(_) => ErrorKind::Unsupported,
            Self::Io(_) | Self::Configuration(_) => ErrorKind::Internal,
        }
    }

    /// Whether the error was raised by input validation.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// HTTP status carried by a remote error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => *status,
            _ => None,
        }
    }
}

/// Coarse error classification stored in failure records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingInput,
    TooLarge,
    UnsupportedType,
    ParameterOutOfRange,
    MissingApiKey,
    Timeout,
    RemoteError,
    NetworkError,
    InvalidResponse,
    Cancelled,
    Unsupported,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingInput => "missing_input",
            Self::TooLarge => "too_large",
            Self::UnsupportedType => "unsupported_type",
            Self::ParameterOutOfRange => "parameter_out_of_range",
            Self::MissingApiKey => "missing_api_key",
            Self::Timeout => "timeout",
            Self::RemoteError => "remote_error",
            Self::NetworkError => "network_error",
            Self::InvalidResponse => "invalid_response",
            Self::Cancelled => "cancelled",
            Self::Unsupported => "unsupported",
            Self::Internal => "internal",
        }
    }

    /// Fallback message for failures whose error rendered to an empty string.
    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Self::MissingInput => "required input missing",
            Self::TooLarge => "input file too large",
            Self::UnsupportedType => "unsupported media type",
            Self::ParameterOutOfRange => "parameter out of range",
            Self::MissingApiKey => "API key not configured",
            Self::Timeout => "request timed out",
            Self::RemoteError => "remote API returned an error",
            Self::NetworkError => "network failure",
            Self::InvalidResponse => "invalid response from remote API",
            Self::Cancelled => "call cancelled before completion",
            Self::Unsupported => "operation not supported",
            Self::Internal => "internal error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result type alias for adsnap operations
pub type Result<T> = std::result::Result<T, AdsnapError>;
