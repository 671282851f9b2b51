//! Cache Module
//!
//! Provides durable on-disk caching of transformed images with TTL expiration.

mod entry;
mod key;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry, CacheMetadata};
pub use key::CacheKey;
pub use store::CacheStore;

// == Public Constants ==
/// Cache format version; bumping it orphans every existing entry
pub const CACHE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Suffix of the metadata artifact next to each payload
pub const META_SUFFIX: &str = ".meta";
