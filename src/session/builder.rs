//! Builder for configuring sessions

use std::sync::{Arc, RwLock};
use std::time::Duration;

use tracing::{info, warn};

use super::Session;
use crate::cache::{CacheConfig, ResponseCache};
use crate::config::Config;
use crate::journal::CallJournal;
use crate::providers::BriaClient;
use crate::store::MetricsStore;
use crate::traits::ImageGateway;
use crate::validation::Constraints;
use crate::{AdsnapError, Result};

/// Builder for [`Session`].
///
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use adsnap::{BriaClient, CacheConfig, Session};
/// # fn main() -> adsnap::Result<()> {
/// let client = BriaClient::new(std::env::var("BRIA_API_KEY").ok())?;
/// let session = Session::builder()
///     .gateway(Arc::new(client))
///     .response_cache(CacheConfig::new())
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct SessionBuilder {
    gateway: Option<Arc<dyn ImageGateway>>,
    constraints: Constraints,
    request_timeout: Option<Duration>,
    cache: Option<CacheConfig>,
    journal: Option<CallJournal>,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remote service the session calls through.
    pub fn gateway(mut self, gateway: Arc<dyn ImageGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Upload limits (default: 10 MiB, JPEG/PNG/WebP).
    pub fn constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Fail tracked calls that run longer than `timeout`.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Cache `generate_image` and `enhance_prompt` results.
    pub fn response_cache(mut self, config: CacheConfig) -> Self {
        self.cache = Some(config);
        self
    }

    /// Mirror every call record to an append-only journal.
    pub fn journal(mut self, journal: CallJournal) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Apply everything `config` describes: a [`BriaClient`] gateway,
    /// limits, timeout, cache, and journal.
    pub fn from_config(mut self, config: &Config) -> Result<Self> {
        self.gateway = Some(Arc::new(BriaClient::from_config(config)?));
        self.constraints = config.constraints();
        self.request_timeout = Some(config.request_timeout());
        self.cache = config.cache_config();
        if let Some(path) = &config.journal {
            self.journal = Some(CallJournal::open(path)?);
        }
        Ok(self)
    }

    /// Build the session.
    ///
    /// A gateway without credentials is accepted with a warning; its
    /// remote operations then fail with `MissingApiKey`.
    pub fn build(self) -> Result<Session> {
        let gateway = self.gateway.ok_or_else(|| {
            AdsnapError::Configuration("no gateway configured for session".to_string())
        })?;

        if !gateway.is_configured() {
            warn!(
                gateway = gateway.name(),
                "API key not configured; remote operations will be rejected"
            );
        }

        let store = match self.journal {
            Some(journal) => {
                info!(path = %journal.path().display(), "journaling call records");
                MetricsStore::with_journal(journal)
            }
            None => MetricsStore::new(),
        };

        Ok(Session {
            gateway,
            store,
            gallery: RwLock::default(),
            constraints: self.constraints,
            request_timeout: self.request_timeout,
            cache: self.cache.as_ref().map(ResponseCache::new),
        })
    }
}
