//! Core ImageGateway trait

use async_trait::async_trait;

use crate::types::{
    AddShadowRequest, EnhancePromptRequest, EraseForegroundRequest, GenerateImageRequest,
    GenerativeFillRequest, GeneratedImages, LifestyleShotRequest, PackshotRequest,
};
use crate::{AdsnapError, Result};

/// Boundary to the remote image-generation service.
///
/// A [`Session`](crate::Session) talks to the service only through this
/// trait. Each method performs exactly one remote invocation and reports
/// any failure (non-2xx status, transport error, malformed body) as an
/// error; tracking and validation happen above this layer.
#[async_trait]
pub trait ImageGateway: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Whether credentials are present. Sessions refuse to dispatch calls
    /// to an unconfigured gateway.
    fn is_configured(&self) -> bool {
        true
    }

    async fn generate_image(&self, _request: &GenerateImageRequest) -> Result<GeneratedImages> {
        Err(AdsnapError::NotImplemented("generate_image"))
    }

    async fn enhance_prompt(&self, _request: &EnhancePromptRequest) -> Result<String> {
        Err(AdsnapError::NotImplemented("enhance_prompt"))
    }

    async fn lifestyle_shot(&self, _request: &LifestyleShotRequest) -> Result<GeneratedImages> {
        Err(AdsnapError::NotImplemented("lifestyle_shot"))
    }

    async fn generative_fill(&self, _request: &GenerativeFillRequest) -> Result<GeneratedImages> {
        Err(AdsnapError::NotImplemented("generative_fill"))
    }

    async fn erase_foreground(
        &self,
        _request: &EraseForegroundRequest,
    ) -> Result<GeneratedImages> {
        Err(AdsnapError::NotImplemented("erase_foreground"))
    }

    async fn add_shadow(&self, _request: &AddShadowRequest) -> Result<GeneratedImages> {
        Err(AdsnapError::NotImplemented("add_shadow"))
    }

    async fn create_packshot(&self, _request: &PackshotRequest) -> Result<GeneratedImages> {
        Err(AdsnapError::NotImplemented("create_packshot"))
    }

    /// Fetch the bytes behind a result URL.
    async fn download(&self, _url: &str) -> Result<Vec<u8>> {
        Err(AdsnapError::NotImplemented("download"))
    }
}
