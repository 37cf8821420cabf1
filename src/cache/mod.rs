//! Image and subtitle caching.
//!
//! # Data Flow
//! ```text
//! ImageCache / SubtitleCache request
//!     → policy.rs (key derivation, lookup)
//!     → Hit: stored response
//!     → Miss: proxy fallback → policy.rs (capture) → store.rs
//! ```

pub mod policy;
pub mod store;

pub use policy::{cache_key, CacheOutcome, CachePolicy};
pub use store::{CacheStore, CachedResponse, MemoryCacheStore};
