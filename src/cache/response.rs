//! Opt-in response cache for prompt-driven operations.
//!
//! A hit short-circuits the whole call: no remote request is made and no
//! [`CallRecord`](crate::types::CallRecord) is appended. Hit/miss counters
//! are emitted separately.
//!
//! Keys hash the operation name together with the serialized request, so
//! any field change (seed, size, aspect ratio) is a different entry.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use tracing::debug;

use crate::telemetry;
use crate::types::{EnhancePromptRequest, GenerateImageRequest, GeneratedImages, Operation};

/// Configuration for the response cache.
///
/// ```rust
/// # use adsnap::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .max_entries(500)
///     .ttl(Duration::from_secs(600));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached entries. Default: 1,000.
    pub max_entries: u64,
    /// Time-to-live for cached entries. Default: 1 hour.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1_000,
            ttl: Duration::from_secs(3600),
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = n;
        self
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

#[derive(Clone, Debug)]
enum CachedResponse {
    Images(GeneratedImages),
    Prompt(String),
}

/// In-memory response cache backed by moka.
pub struct ResponseCache {
    cache: Cache<u64, CachedResponse>,
}

impl ResponseCache {
    pub fn new(config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(config.ttl)
            .build();
        Self { cache }
    }

    /// Look up generated images. Emits hit/miss metrics.
    pub async fn get_images(&self, request: &GenerateImageRequest) -> Option<GeneratedImages> {
        let op = Operation::GenerateImage;
        match self.lookup(op, request).await {
            Some(CachedResponse::Images(images)) => {
                record_hit(op);
                Some(images)
            }
            _ => {
                record_miss(op);
                None
            }
        }
    }

    pub async fn insert_images(&self, request: &GenerateImageRequest, images: GeneratedImages) {
        if let Some(key) = cache_key(Operation::GenerateImage, request) {
            self.cache.insert(key, CachedResponse::Images(images)).await;
        }
    }

    /// Look up an enhanced prompt. Emits hit/miss metrics.
    pub async fn get_prompt(&self, request: &EnhancePromptRequest) -> Option<String> {
        let op = Operation::EnhancePrompt;
        match self.lookup(op, request).await {
            Some(CachedResponse::Prompt(prompt)) => {
                record_hit(op);
                Some(prompt)
            }
            _ => {
                record_miss(op);
                None
            }
        }
    }

    pub async fn insert_prompt(&self, request: &EnhancePromptRequest, prompt: String) {
        if let Some(key) = cache_key(Operation::EnhancePrompt, request) {
            self.cache.insert(key, CachedResponse::Prompt(prompt)).await;
        }
    }

    /// Evict all entries.
    pub fn clear(&self) {
        self.cache.invalidate_all();
    }

    /// Approximate number of live entries.
    pub fn len(&self) -> u64 {
        self.cache.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn lookup<R: Serialize>(&self, op: Operation, request: &R) -> Option<CachedResponse> {
        let key = cache_key(op, request)?;
        self.cache.get(&key).await
    }
}

fn record_hit(op: Operation) {
    debug!(operation = %op, "response cache hit");
    metrics::counter!(telemetry::CACHE_HITS_TOTAL, "operation" => op.as_str()).increment(1);
}

fn record_miss(op: Operation) {
    metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "operation" => op.as_str()).increment(1);
}

/// Hash of operation + serialized request. `None` if the request does
/// not serialize, which leaves the call uncached.
fn cache_key<R: Serialize>(op: Operation, request: &R) -> Option<u64> {
    let body = serde_json::to_string(request).ok()?;
    let mut hasher = DefaultHasher::new();
    op.as_str().hash(&mut hasher);
    body.hash(&mut hasher);
    Some(hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ImageOutput;

    #[test]
    fn key_is_deterministic() {
        let req = GenerateImageRequest::new("a red bicycle");
        assert_eq!(
            cache_key(Operation::GenerateImage, &req),
            cache_key(Operation::GenerateImage, &req.clone())
        );
    }

    #[test]
    fn key_differs_on_any_field() {
        let a = GenerateImageRequest::new("a red bicycle");
        let b = a.clone().seed(42);
        assert_ne!(
            cache_key(Operation::GenerateImage, &a),
            cache_key(Operation::GenerateImage, &b)
        );
    }

    #[test]
    fn key_differs_on_operation() {
        let req = EnhancePromptRequest::new("sunset");
        assert_ne!(
            cache_key(Operation::EnhancePrompt, &req),
            cache_key(Operation::GenerateImage, &req)
        );
    }

    #[tokio::test]
    async fn stores_and_returns_images() {
        let cache = ResponseCache::new(&CacheConfig::default());
        let req = GenerateImageRequest::new("a red bicycle");
        assert!(cache.get_images(&req).await.is_none());

        let images = GeneratedImages::new(vec![ImageOutput::Url("https://cdn/a.png".into())]);
        cache.insert_images(&req, images.clone()).await;
        assert_eq!(cache.get_images(&req).await, Some(images));
    }

    #[tokio::test]
    async fn clear_evicts_entries() {
        let cache = ResponseCache::new(&CacheConfig::default());
        let req = EnhancePromptRequest::new("sunset");
        cache.insert_prompt(&req, "golden hour sunset".into()).await;
        cache.clear();
        assert!(cache.get_prompt(&req).await.is_none());
    }
}
