//! Sessions: validated, tracked, cached access to an [`ImageGateway`].
//!
//! Every remote operation follows the same path:
//!
//! ```text
//! request ──► validate ──► cache? ──► api key? ──► CallTracker ──► gateway
//!                │            │            │             │
//!             Err(...)    Ok(cached)  MissingApiKey   CallRecord appended
//!          (no record)  (no record)   (no record)
//! ```
//!
//! Successful image results are also kept in the session gallery.

mod builder;

pub use builder::SessionBuilder;

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::cache::ResponseCache;
use crate::config::Config;
use crate::dashboard::DashboardReport;
use crate::store::MetricsStore;
use crate::telemetry;
use crate::tracker::CallTracker;
use crate::traits::ImageGateway;
use crate::types::{
    AddShadowRequest, EnhancePromptRequest, EraseForegroundRequest, GalleryItem,
    GenerateImageRequest, GenerativeFillRequest, GeneratedImages, LifestyleShotRequest, Operation,
    PackshotRequest,
};
use crate::validation::{Constraints, Validate, require_text};
use crate::{AdsnapError, Result};

/// One user's working context: gateway, call history, and gallery.
///
/// Sessions share nothing with each other; create one per user.
pub struct Session {
    gateway: Arc<dyn ImageGateway>,
    store: MetricsStore,
    gallery: RwLock<Vec<GalleryItem>>,
    constraints: Constraints,
    request_timeout: Option<Duration>,
    cache: Option<ResponseCache>,
}

impl Session {
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// Build a session talking to the Bria API as described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        SessionBuilder::new().from_config(config)?.build()
    }

    pub fn gateway_name(&self) -> &str {
        self.gateway.name()
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// Read access to this session's call records.
    pub fn metrics(&self) -> &MetricsStore {
        &self.store
    }

    /// Tracker bound to this session's store and timeout.
    pub fn tracker(&self) -> CallTracker<'_> {
        let tracker = CallTracker::new(&self.store);
        match self.request_timeout {
            Some(timeout) => tracker.timeout(timeout),
            None => tracker,
        }
    }

    pub fn dashboard(&self) -> DashboardReport {
        DashboardReport::from_store(&self.store)
    }

    /// Snapshot of successful results, oldest first.
    pub fn gallery(&self) -> Vec<GalleryItem> {
        self.gallery
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Forget every call record and gallery item.
    pub fn clear_history(&self) {
        self.store.clear();
        self.gallery
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
        }
    }

    // ========================================================================
    // Operations
    // ========================================================================

    pub async fn generate_image(&self, request: &GenerateImageRequest) -> Result<GeneratedImages> {
        let op = Operation::GenerateImage;
        self.validate(op, request)?;

        if let Some(images) = self.cached_images(request).await {
            self.remember(op, Some(&request.prompt), &images);
            return Ok(images);
        }

        let images = self
            .run(op, || self.gateway.generate_image(request))
            .await?;

        if let Some(cache) = &self.cache {
            cache.insert_images(request, images.clone()).await;
        }
        self.remember(op, Some(&request.prompt), &images);
        Ok(images)
    }

    /// Rewrite a prompt into a more detailed one.
    pub async fn enhance_prompt(&self, request: &EnhancePromptRequest) -> Result<String> {
        let op = Operation::EnhancePrompt;
        self.validate(op, request)?;

        if let Some(cache) = &self.cache {
            if let Some(prompt) = cache.get_prompt(request).await {
                return Ok(prompt);
            }
        }

        let prompt = self
            .run(op, || self.gateway.enhance_prompt(request))
            .await?;

        if let Some(cache) = &self.cache {
            cache.insert_prompt(request, prompt.clone()).await;
        }
        Ok(prompt)
    }

    pub async fn lifestyle_shot(&self, request: &LifestyleShotRequest) -> Result<GeneratedImages> {
        let op = Operation::LifestyleShot;
        self.validate(op, request)?;
        let images = self
            .run(op, || self.gateway.lifestyle_shot(request))
            .await?;
        self.remember(op, Some(&request.scene_description), &images);
        Ok(images)
    }

    pub async fn generative_fill(&self, request: &GenerativeFillRequest) -> Result<GeneratedImages> {
        let op = Operation::GenerativeFill;
        self.validate(op, request)?;
        let images = self
            .run(op, || self.gateway.generative_fill(request))
            .await?;
        self.remember(op, Some(&request.prompt), &images);
        Ok(images)
    }

    pub async fn erase_foreground(
        &self,
        request: &EraseForegroundRequest,
    ) -> Result<GeneratedImages> {
        let op = Operation::EraseForeground;
        self.validate(op, request)?;
        let images = self
            .run(op, || self.gateway.erase_foreground(request))
            .await?;
        self.remember(op, None, &images);
        Ok(images)
    }

    pub async fn add_shadow(&self, request: &AddShadowRequest) -> Result<GeneratedImages> {
        let op = Operation::AddShadow;
        self.validate(op, request)?;
        let images = self.run(op, || self.gateway.add_shadow(request)).await?;
        self.remember(op, None, &images);
        Ok(images)
    }

    pub async fn create_packshot(&self, request: &PackshotRequest) -> Result<GeneratedImages> {
        let op = Operation::CreatePackshot;
        self.validate(op, request)?;
        let images = self
            .run(op, || self.gateway.create_packshot(request))
            .await?;
        self.remember(op, None, &images);
        Ok(images)
    }

    /// Fetch the bytes behind a result URL. Tracked, but needs no API key.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let op = Operation::DownloadImage;
        require_text("url", url).inspect_err(|e| record_rejection(op, e.kind().as_str()))?;
        let (result, _) = self
            .tracker()
            .track(op.as_str(), || self.gateway.download(url))
            .await;
        result
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn validate<R: Validate>(&self, op: Operation, request: &R) -> Result<()> {
        request.validate(&self.constraints).map_err(|e| {
            debug!(operation = %op, error = %e, "request rejected by validator");
            record_rejection(op, e.kind().as_str());
            AdsnapError::from(e)
        })
    }

    async fn cached_images(&self, request: &GenerateImageRequest) -> Option<GeneratedImages> {
        self.cache.as_ref()?.get_images(request).await
    }

    /// Refuse unconfigured gateways, then run one tracked call.
    async fn run<T, F, Fut>(&self, op: Operation, call: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if !self.gateway.is_configured() {
            warn!(operation = %op, gateway = self.gateway.name(), "API key not configured");
            return Err(AdsnapError::MissingApiKey);
        }
        let (result, _) = self.tracker().track(op.as_str(), call).await;
        result
    }

    fn remember(&self, operation: Operation, prompt: Option<&str>, images: &GeneratedImages) {
        let item = GalleryItem {
            operation,
            created_at: OffsetDateTime::now_utc(),
            prompt: prompt.map(|p| p.trim().to_string()),
            images: images.clone(),
        };
        self.gallery
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(item);
    }
}

fn record_rejection(op: Operation, kind: &'static str) {
    metrics::counter!(telemetry::VALIDATION_FAILURES_TOTAL,
        "operation" => op.as_str(),
        "kind" => kind,
    )
    .increment(1);
}
