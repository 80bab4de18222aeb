//! Error classification and display.

use std::time::Duration;

use adsnap::{AdsnapError, ErrorKind, ValidationError};

#[test]
fn test_validation_errors_convert() {
    let err: AdsnapError = ValidationError::MissingInput("image").into();
    assert!(err.is_validation());
    assert_eq!(err.kind(), ErrorKind::MissingInput);
    assert_eq!(err.to_string(), "missing input: image");
}

#[test]
fn test_remote_error_displays_message_only() {
    let err = AdsnapError::Remote {
        status: Some(503),
        message: "API Error: 503 - maintenance".to_string(),
    };
    assert_eq!(err.to_string(), "API Error: 503 - maintenance");
    assert_eq!(err.status(), Some(503));
    assert_eq!(err.kind(), ErrorKind::RemoteError);
}

#[test]
fn test_kinds() {
    let cases = [
        (AdsnapError::MissingApiKey, ErrorKind::MissingApiKey),
        (
            AdsnapError::Timeout {
                after: Duration::from_secs(60),
            },
            ErrorKind::Timeout,
        ),
        (AdsnapError::Network("dns".into()), ErrorKind::NetworkError),
        (
            AdsnapError::InvalidResponse("empty".into()),
            ErrorKind::InvalidResponse,
        ),
        (AdsnapError::Cancelled, ErrorKind::Cancelled),
        (
            AdsnapError::NotImplemented("download"),
            ErrorKind::Unsupported,
        ),
        (
            AdsnapError::Configuration("bad".into()),
            ErrorKind::Internal,
        ),
    ];
    for (err, kind) in cases {
        assert_eq!(err.kind(), kind, "{err}");
        assert!(!err.to_string().is_empty());
        assert_eq!(err.status(), None);
    }
}

#[test]
fn test_json_error_is_invalid_response() {
    let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err = AdsnapError::from(parse);
    assert_eq!(err.kind(), ErrorKind::InvalidResponse);
}

#[test]
fn test_kind_serializes_snake_case() {
    assert_eq!(
        serde_json::to_string(&ErrorKind::ParameterOutOfRange).unwrap(),
        "\"parameter_out_of_range\""
    );
    assert_eq!(ErrorKind::RemoteError.to_string(), "remote_error");
}

#[test]
fn test_timeout_message() {
    let err = AdsnapError::Timeout {
        after: Duration::from_secs(60),
    };
    assert_eq!(err.to_string(), "request timed out after 60s");
}
