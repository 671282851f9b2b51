//! Cache Entry Module
//!
//! Defines a cached transformation result and its persisted metadata.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// A cached image together with the headers it is served with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Transformed image bytes
    pub payload: Bytes,
    /// Whitelisted response headers, keyed by lowercase name
    pub headers: BTreeMap<String, String>,
    /// Write timestamp (Unix milliseconds)
    pub cached_at: i64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry stamped with the current time.
    pub fn new(payload: Bytes, headers: BTreeMap<String, String>) -> Self {
        Self {
            payload,
            headers,
            cached_at: current_timestamp_ms(),
        }
    }

    // == Is Fresh ==
    /// Checks whether the entry is still within `ttl_secs` at `now_ms`.
    ///
    /// Boundary condition: an entry exactly `ttl_secs` old is still fresh;
    /// it becomes stale once its age exceeds the TTL.
    pub fn is_fresh_at(&self, now_ms: i64, ttl_secs: u64) -> bool {
        let ttl_ms = i64::try_from(ttl_secs.saturating_mul(1000)).unwrap_or(i64::MAX);
        now_ms.saturating_sub(self.cached_at) <= ttl_ms
    }

    /// Splits the entry into its persisted metadata.
    pub fn metadata(&self) -> CacheMetadata {
        CacheMetadata {
            headers: self.headers.clone(),
            cached_at: self.cached_at,
        }
    }
}

// == Cache Metadata ==
/// JSON document stored next to each payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheMetadata {
    pub headers: BTreeMap<String, String>,
    pub cached_at: i64,
}

impl CacheMetadata {
    /// Joins metadata with its payload.
    pub fn into_entry(self, payload: Bytes) -> CacheEntry {
        CacheEntry {
            payload,
            headers: self.headers,
            cached_at: self.cached_at,
        }
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
