//! Cache Store Module
//!
//! Disk-backed cache engine. Each entry is a payload file plus a JSON metadata
//! file sharing the same key; freshness is checked at lookup time.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use tokio::fs;
use tracing::{debug, trace, warn};

use crate::cache::{current_timestamp_ms, CacheEntry, CacheKey, CacheMetadata, META_SUFFIX};
use crate::error::{GatewayError, Result};

/// Distinguishes temporary files written concurrently by this process.
static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Longest file name most filesystems accept, in bytes
pub const MAX_FILE_NAME_LEN: usize = 255;

// == Cache Store ==
/// TTL-bounded storage of transformed images under a single directory.
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// Root directory holding all artifacts
    dir: PathBuf,
    /// TTL in seconds, 0 disables caching
    ttl: u64,
    /// Source of the current time in Unix milliseconds
    clock: fn() -> i64,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Arguments
    /// * `dir` - Cache root directory
    /// * `ttl` - Entry lifetime in seconds
    pub fn new(dir: impl Into<PathBuf>, ttl: u64) -> Result<Self> {
        Self::with_clock(dir, ttl, current_timestamp_ms)
    }

    /// Creates a store that stamps and ages entries with `clock`.
    pub fn with_clock(dir: impl Into<PathBuf>, ttl: u64, clock: fn() -> i64) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            GatewayError::Store(format!(
                "Failed to create cache dir {}: {}",
                dir.display(),
                e
            ))
        })?;

        Ok(Self { dir, ttl, clock })
    }

    /// Returns true when entries are kept at all.
    pub fn is_enabled(&self) -> bool {
        self.ttl > 0
    }

    fn payload_path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.as_str())
    }

    fn meta_path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(format!("{}{}", key.as_str(), META_SUFFIX))
    }

    // == Lookup ==
    /// Returns the fresh entry stored under `key`, if any.
    ///
    /// Missing artifacts, unreadable files, corrupt metadata and stale entries
    /// all count as absent.
    pub async fn lookup(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.lookup_at(key, (self.clock)()).await
    }

    /// Same as [`lookup`](Self::lookup) with an explicit clock.
    pub async fn lookup_at(&self, key: &CacheKey, now_ms: i64) -> Option<CacheEntry> {
        if !self.is_enabled() {
            return None;
        }

        let meta_bytes = read_artifact(&self.meta_path(key), key).await?;
        let metadata: CacheMetadata = match serde_json::from_slice(&meta_bytes) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(key = %key, error = %e, "Discarding unparsable cache metadata");
                return None;
            }
        };

        let payload = read_artifact(&self.payload_path(key), key).await?;
        let entry = metadata.into_entry(Bytes::from(payload));

        // Metadata and payload from different writes
        if let Some(expected) = entry.headers.get("content-length") {
            if expected.parse::<usize>().ok() != Some(entry.payload.len()) {
                debug!(key = %key, expected = %expected, actual = entry.payload.len(), "Cache payload does not match its metadata");
                return None;
            }
        }

        if !entry.is_fresh_at(now_ms, self.ttl) {
            debug!(key = %key, cached_at = entry.cached_at, "Cache entry is stale");
            return None;
        }

        trace!(key = %key, size = entry.payload.len(), "Cache entry found");
        Some(entry)
    }

    // == Store ==
    /// Writes `payload` and `headers` under `key`, stamped with the current time.
    ///
    /// The payload is written before the metadata; each artifact is renamed
    /// into place so readers never see a partial file.
    pub async fn store(
        &self,
        key: &CacheKey,
        payload: Bytes,
        headers: BTreeMap<String, String>,
    ) -> Result<()> {
        let entry = CacheEntry {
            payload,
            headers,
            cached_at: (self.clock)(),
        };
        self.store_entry(key, &entry).await
    }

    /// Writes an already stamped entry.
    pub(crate) async fn store_entry(&self, key: &CacheKey, entry: &CacheEntry) -> Result<()> {
        let name_len = key.as_str().len() + META_SUFFIX.len();
        if name_len > MAX_FILE_NAME_LEN {
            warn!(key = %key, name_len, limit = MAX_FILE_NAME_LEN, "Cache key too long for a file name, entry not cached");
            return Err(GatewayError::Store(format!(
                "cache key is {} bytes, file names are limited to {}",
                name_len, MAX_FILE_NAME_LEN
            )));
        }

        let meta = serde_json::to_vec(&entry.metadata())
            .map_err(|e| GatewayError::Store(format!("Failed to encode metadata: {}", e)))?;

        self.write_atomic(&self.payload_path(key), &entry.payload)
            .await?;
        self.write_atomic(&self.meta_path(key), &meta).await?;

        debug!(key = %key, size = entry.payload.len(), "Stored cache entry");
        Ok(())
    }

    async fn write_atomic(&self, target: &Path, data: &[u8]) -> Result<()> {
        let tmp = self.dir.join(format!(
            ".tmp-{}-{}",
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        let written = match fs::write(&tmp, data).await {
            Ok(()) => fs::rename(&tmp, target).await,
            Err(e) => Err(e),
        };

        if let Err(e) = written {
            let _ = fs::remove_file(&tmp).await;
            return Err(GatewayError::Store(format!(
                "Failed to write {}: {}",
                target.display(),
                e
            )));
        }

        Ok(())
    }
}

/// Reads one artifact; anything but success is reported as absence.
async fn read_artifact(path: &Path, key: &CacheKey) -> Option<Vec<u8>> {
    match fs::read(path).await {
        Ok(bytes) => Some(bytes),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => {
            warn!(key = %key, path = %path.display(), error = %e, "Failed to read cache artifact");
            None
        }
    }
}
