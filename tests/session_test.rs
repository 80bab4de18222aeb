//! Session behaviour over a mock gateway: validation, key checks,
//! caching, gallery, and the one-record-per-call invariant.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use adsnap::{
    AddShadowRequest, AdsnapError, CacheConfig, EnhancePromptRequest, ErrorKind,
    GenerateImageRequest, GeneratedImages, ImageGateway, ImageOutput, ImageUpload,
    LifestyleShotRequest, Operation, PackshotRequest, Result, Session,
};

// ============================================================================
// Mock gateway
// ============================================================================

#[derive(Default)]
struct MockGateway {
    calls: AtomicUsize,
    unconfigured: bool,
    fail_with_status: Option<u16>,
    delay: Option<Duration>,
}

impl MockGateway {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn images(&self, name: &str) -> GeneratedImages {
        GeneratedImages::new(vec![ImageOutput::Url(format!("https://cdn.test/{name}.png"))])
    }

    async fn respond<T>(&self, ok: T) -> Result<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.fail_with_status {
            Some(status) => Err(AdsnapError::Remote {
                status: Some(status),
                message: format!("API Error: {status} - upstream failure"),
            }),
            None => Ok(ok),
        }
    }
}

#[async_trait]
impl ImageGateway for MockGateway {
    fn name(&self) -> &str {
        "mock"
    }

    fn is_configured(&self) -> bool {
        !self.unconfigured
    }

    async fn generate_image(&self, request: &GenerateImageRequest) -> Result<GeneratedImages> {
        self.respond(self.images(&request.prompt.replace(' ', "-")))
            .await
    }

    async fn enhance_prompt(&self, request: &EnhancePromptRequest) -> Result<String> {
        self.respond(format!("{}, studio lighting", request.prompt))
            .await
    }

    async fn lifestyle_shot(&self, _request: &LifestyleShotRequest) -> Result<GeneratedImages> {
        self.respond(self.images("lifestyle")).await
    }

    async fn add_shadow(&self, _request: &AddShadowRequest) -> Result<GeneratedImages> {
        self.respond(self.images("shadow")).await
    }

    async fn download(&self, _url: &str) -> Result<Vec<u8>> {
        self.respond(vec![1, 2, 3]).await
    }
}

fn session_with(gateway: Arc<MockGateway>) -> Session {
    Session::builder().gateway(gateway).build().unwrap()
}

fn png() -> ImageUpload {
    ImageUpload::new("product.png", "image/png", vec![7u8; 2048])
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_builder_requires_gateway() {
    let err = Session::builder().build().err().unwrap();
    assert!(matches!(err, AdsnapError::Configuration(_)));
}

#[tokio::test]
async fn test_successful_call_records_and_keeps_gallery() {
    let gateway = Arc::new(MockGateway::default());
    let session = session_with(gateway.clone());

    let images = session
        .generate_image(&GenerateImageRequest::new("red bicycle"))
        .await
        .unwrap();

    assert_eq!(images.urls().next(), Some("https://cdn.test/red-bicycle.png"));
    assert_eq!(gateway.calls(), 1);

    let records = session.metrics().all();
    assert_eq!(records.len(), 1);
    assert!(records[0].is_success());
    assert_eq!(records[0].operation(), "generate_image");

    let gallery = session.gallery();
    assert_eq!(gallery.len(), 1);
    assert_eq!(gallery[0].operation, Operation::GenerateImage);
    assert_eq!(gallery[0].prompt.as_deref(), Some("red bicycle"));
}

#[tokio::test]
async fn test_validation_failure_creates_no_record() {
    let gateway = Arc::new(MockGateway::default());
    let session = session_with(gateway.clone());

    let err = session
        .generate_image(&GenerateImageRequest::new("red bicycle").width(-1))
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(err.kind(), ErrorKind::ParameterOutOfRange);
    assert_eq!(gateway.calls(), 0);
    assert!(session.metrics().is_empty());
}

#[tokio::test]
async fn test_oversized_upload_rejected_before_call() {
    let gateway = Arc::new(MockGateway::default());
    let session = session_with(gateway.clone());

    let big = ImageUpload::new("huge.png", "image/png", vec![0u8; 15_000_000]);
    let err = session
        .add_shadow(&AddShadowRequest::new(big))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TooLarge);
    assert_eq!(gateway.calls(), 0);
    assert!(session.metrics().is_empty());
}

#[tokio::test]
async fn test_missing_key_creates_no_record() {
    let gateway = Arc::new(MockGateway {
        unconfigured: true,
        ..Default::default()
    });
    let session = session_with(gateway.clone());

    let err = session
        .lifestyle_shot(&LifestyleShotRequest::new(png(), "on a beach"))
        .await
        .unwrap_err();

    assert!(matches!(err, AdsnapError::MissingApiKey));
    assert_eq!(gateway.calls(), 0);
    assert!(session.metrics().is_empty());
}

#[tokio::test]
async fn test_remote_failure_recorded_verbatim() {
    let gateway = Arc::new(MockGateway {
        fail_with_status: Some(500),
        ..Default::default()
    });
    let session = session_with(gateway);

    let err = session
        .add_shadow(&AddShadowRequest::new(png()))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));

    let records = session.metrics().all();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].error_kind(), Some(ErrorKind::RemoteError));
    assert_eq!(
        records[0].error_message(),
        Some("API Error: 500 - upstream failure")
    );
    assert!(session.gallery().is_empty());
}

#[tokio::test]
async fn test_unimplemented_operation_is_recorded() {
    let session = session_with(Arc::new(MockGateway::default()));

    let err = session
        .create_packshot(&PackshotRequest::new(png()))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unsupported);
    assert_eq!(
        session.metrics().all()[0].error_kind(),
        Some(ErrorKind::Unsupported)
    );
}

#[tokio::test]
async fn test_cache_hit_skips_call_and_record() {
    let gateway = Arc::new(MockGateway::default());
    let session = Session::builder()
        .gateway(gateway.clone())
        .response_cache(CacheConfig::new())
        .build()
        .unwrap();

    let request = GenerateImageRequest::new("red bicycle").seed(7);
    let first = session.generate_image(&request).await.unwrap();
    let second = session.generate_image(&request).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(gateway.calls(), 1);
    assert_eq!(session.metrics().len(), 1);

    // A different seed is a different request.
    session
        .generate_image(&request.clone().seed(8))
        .await
        .unwrap();
    assert_eq!(gateway.calls(), 2);
}

#[tokio::test]
async fn test_enhance_prompt_cached_and_cleared() {
    let gateway = Arc::new(MockGateway::default());
    let session = Session::builder()
        .gateway(gateway.clone())
        .response_cache(CacheConfig::new())
        .build()
        .unwrap();

    let request = EnhancePromptRequest::new("a mug");
    assert_eq!(
        session.enhance_prompt(&request).await.unwrap(),
        "a mug, studio lighting"
    );
    session.enhance_prompt(&request).await.unwrap();
    assert_eq!(gateway.calls(), 1);

    session.clear_cache();
    session.enhance_prompt(&request).await.unwrap();
    assert_eq!(gateway.calls(), 2);
    assert_eq!(session.metrics().len(), 2);
}

#[tokio::test]
async fn test_without_cache_every_call_is_remote() {
    let gateway = Arc::new(MockGateway::default());
    let session = session_with(gateway.clone());

    let request = GenerateImageRequest::new("red bicycle");
    session.generate_image(&request).await.unwrap();
    session.generate_image(&request).await.unwrap();
    assert_eq!(gateway.calls(), 2);
    assert_eq!(session.metrics().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_session_timeout() {
    let gateway = Arc::new(MockGateway {
        delay: Some(Duration::from_secs(120)),
        ..Default::default()
    });
    let session = Session::builder()
        .gateway(gateway)
        .request_timeout(Duration::from_secs(60))
        .build()
        .unwrap();

    let err = session
        .enhance_prompt(&EnhancePromptRequest::new("a mug"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout);
    let record = &session.metrics().all()[0];
    assert_eq!(record.error_kind(), Some(ErrorKind::Timeout));
    assert!((60_000.0..60_100.0).contains(&record.duration_ms()));
}

#[tokio::test]
async fn test_download_is_tracked() {
    let gateway = Arc::new(MockGateway::default());
    let session = session_with(gateway);

    let bytes = session.download("https://cdn.test/a.png").await.unwrap();
    assert_eq!(bytes, vec![1, 2, 3]);
    assert_eq!(session.metrics().all()[0].operation(), "download_image");

    let err = session.download("  ").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingInput);
    assert_eq!(session.metrics().len(), 1);
}

#[tokio::test]
async fn test_clear_history() {
    let session = session_with(Arc::new(MockGateway::default()));
    session
        .generate_image(&GenerateImageRequest::new("red bicycle"))
        .await
        .unwrap();

    session.clear_history();
    assert!(session.metrics().all().is_empty());
    assert!(session.gallery().is_empty());
    assert_eq!(session.metrics().success_rate(), 0.0);
}

#[tokio::test]
async fn test_dashboard_reflects_session() {
    let session = session_with(Arc::new(MockGateway::default()));
    session
        .generate_image(&GenerateImageRequest::new("red bicycle"))
        .await
        .unwrap();
    let _ = session.create_packshot(&PackshotRequest::new(png())).await;

    let report = session.dashboard();
    assert_eq!(report.summary.total_calls, 2);
    assert_eq!(report.summary.success_rate, 0.5);
    assert_eq!(report.operations.len(), 2);
    assert_eq!(report.recent[0].operation(), "create_packshot");
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let gateway = Arc::new(MockGateway::default());
    let a = session_with(gateway.clone());
    let b = session_with(gateway);

    a.generate_image(&GenerateImageRequest::new("one"))
        .await
        .unwrap();
    assert_eq!(a.metrics().len(), 1);
    assert!(b.metrics().is_empty());
}
