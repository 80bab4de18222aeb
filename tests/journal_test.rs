//! Journal persistence across sessions.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use time::OffsetDateTime;

use adsnap::{
    AdsnapError, CallJournal, CallRecord, DashboardReport, EnhancePromptRequest, ErrorKind,
    ImageGateway, MetricsStore, Result, Session,
};

struct FlakyGateway;

#[async_trait]
impl ImageGateway for FlakyGateway {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn enhance_prompt(&self, request: &EnhancePromptRequest) -> Result<String> {
        if request.prompt.contains("fail") {
            return Err(AdsnapError::Remote {
                status: Some(502),
                message: "API Error: 502 - bad gateway".into(),
            });
        }
        Ok(format!("{} at dusk", request.prompt))
    }
}

#[test]
fn test_missing_journal_reads_empty() {
    let dir = TempDir::new().unwrap();
    let records = CallJournal::read_all(dir.path().join("absent.jsonl")).unwrap();
    assert!(records.is_empty());
}

#[test]
fn test_journal_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("calls.jsonl");

    let journal = CallJournal::open(&path).unwrap();
    let store = MetricsStore::with_journal(journal);
    assert_eq!(store.journal().map(|j| j.path()), Some(path.as_path()));
    assert!(MetricsStore::new().journal().is_none());
    store.append(CallRecord::success(
        "generate_image",
        OffsetDateTime::now_utc(),
        Duration::from_millis(420),
    ));
    store.append(CallRecord::failure(
        "add_shadow",
        OffsetDateTime::now_utc(),
        Duration::from_millis(35),
        ErrorKind::Timeout,
        "request timed out after 30s",
    ));

    let loaded = CallJournal::read_all(&path).unwrap();
    assert_eq!(loaded, store.all());
}

#[test]
fn test_clear_keeps_journal() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("calls.jsonl");

    let store = MetricsStore::with_journal(CallJournal::open(&path).unwrap());
    store.append(CallRecord::success(
        "erase_foreground",
        OffsetDateTime::now_utc(),
        Duration::from_millis(1),
    ));
    store.clear();

    assert!(store.is_empty());
    assert_eq!(CallJournal::read_all(&path).unwrap().len(), 1);
}

#[test]
fn test_malformed_lines_skipped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("calls.jsonl");

    let journal = CallJournal::open(&path).unwrap();
    journal
        .append(&CallRecord::success(
            "generate_image",
            OffsetDateTime::now_utc(),
            Duration::from_millis(10),
        ))
        .unwrap();

    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .open(&path)
        .unwrap();
    writeln!(file, "not json").unwrap();
    writeln!(
        file,
        r#"{{"operation":"x","started_at":"2024-01-01T00:00:00Z","duration_ms":-5.0,"outcome":{{"status":"success"}}}}"#
    )
    .unwrap();
    writeln!(file).unwrap();

    let records = CallJournal::read_all(&path).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].operation(), "generate_image");
}

#[tokio::test]
async fn test_sessions_append_to_shared_journal() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("calls.jsonl");

    for prompt in ["mug", "please fail", "lamp"] {
        let session = Session::builder()
            .gateway(Arc::new(FlakyGateway))
            .journal(CallJournal::open(&path).unwrap())
            .build()
            .unwrap();
        let _ = session
            .enhance_prompt(&EnhancePromptRequest::new(prompt))
            .await;
    }

    let records = CallJournal::read_all(&path).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(
        records[1].error_message(),
        Some("API Error: 502 - bad gateway")
    );

    let report = DashboardReport::from_records(&records);
    assert_eq!(report.summary.failures, 1);
    assert!((report.summary.success_rate - 2.0 / 3.0).abs() < 1e-9);
}
