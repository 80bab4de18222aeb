//! Response caching.
//!
//! [`ResponseCache`] is an opt-in LRU + TTL cache in front of the
//! prompt-driven operations (`generate_image`, `enhance_prompt`). Image
//! editing operations take uploads and are never cached. Enable it with
//! [`SessionBuilder::response_cache()`](crate::SessionBuilder::response_cache).

pub mod response;

pub use response::{CacheConfig, ResponseCache};
