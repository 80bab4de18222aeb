//! adsnap - Tracked client for the Bria image-generation API
//!
//! Every remote call made through a [`Session`] is validated first, then
//! timed and classified by a [`CallTracker`], which appends exactly one
//! [`CallRecord`] to the session's [`MetricsStore`]. A [`DashboardReport`]
//! summarises those records.
//!
//! # Example
//!
//! ```rust,no_run
//! use adsnap::{Config, DashboardReport, GenerateImageRequest, Session};
//!
//! #[tokio::main]
//! async fn main() -> adsnap::Result<()> {
//!     let config = Config::load(None)?;
//!     let session = Session::from_config(&config)?;
//!
//!     let request = GenerateImageRequest::new("a red bicycle against a white wall")
//!         .width(768)
//!         .height(512);
//!
//!     match session.generate_image(&request).await {
//!         Ok(images) => images.urls().for_each(|url| println!("{url}")),
//!         Err(e) => eprintln!("{e}"),
//!     }
//!
//!     print!("{}", DashboardReport::from_store(session.metrics()));
//!     Ok(())
//! }
//! ```
//!
//! # Tracking a custom call
//!
//! ```rust
//! use adsnap::{AdsnapError, CallTracker, MetricsStore};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = MetricsStore::new();
//! let tracker = CallTracker::new(&store);
//!
//! let (result, record) = tracker
//!     .track("generate_image", || async {
//!         Err::<(), _>(AdsnapError::Remote { status: Some(429), message: "rate limited".into() })
//!     })
//!     .await;
//!
//! assert!(result.is_err());
//! assert_eq!(record.error_message(), Some("rate limited"));
//! assert_eq!(store.len(), 1);
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod journal;
pub mod providers;
pub mod session;
pub mod store;
pub mod telemetry;
pub mod tracker;
pub mod traits;
pub mod types;
pub mod validation;
pub mod version;

// Re-export main types at crate root
pub use cache::{CacheConfig, ResponseCache};
pub use config::Config;
pub use dashboard::{DashboardReport, OperationRow};
pub use error::{AdsnapError, ErrorKind, Result};
pub use journal::CallJournal;
pub use providers::BriaClient;
pub use session::{Session, SessionBuilder};
pub use store::{MetricsStore, MetricsSummary};
pub use tracker::{CallTimer, CallTracker};
pub use traits::ImageGateway;
pub use validation::{Constraints, ParameterRange, Validate, ValidationError, validate};
pub use version::{user_agent, version_string};

// Re-export all types
pub use types::{
    AddShadowRequest, AspectRatio, CallRecord, EnhancePromptRequest, EraseForegroundRequest,
    GalleryItem, GenerateImageRequest, GenerativeFillRequest, GeneratedImages, ImageOutput,
    ImageUpload, LifestyleShotRequest, MediaType, Operation, Outcome, PackshotRequest, Placement,
};
