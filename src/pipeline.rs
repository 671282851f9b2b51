//! Request Pipeline
//!
//! Orchestrates one `/image/...` request:
//! cache lookup, then on a miss validation, backend fetch, cache write and a
//! read-back so every image is served from a stored entry.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::backend::{FetchedImage, TransformBackend};
use crate::cache::{CacheEntry, CacheKey, CacheStore, CACHE_VERSION};
use crate::error::Result;
use crate::models::ImageQuery;
use crate::policy::{validate_request, DomainPolicy};

// == Image Request ==
/// The parts of an inbound request the pipeline needs.
#[derive(Debug, Clone)]
pub struct ImageRequest {
    /// Raw request path, as received
    pub path: String,
    /// Raw query string without the leading `?`
    pub raw_query: Option<String>,
    /// Decoded source URL (path tail after `/image/`)
    pub source: String,
    /// Transformation parameters
    pub query: ImageQuery,
}

// == Outcome ==
/// How a served entry was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Fresh entry found in the cache
    Hit,
    /// Fetched from the backend, stored and read back
    Filled,
    /// Fetched from the backend and served without a cache round trip
    PassThrough,
}

impl Outcome {
    /// Value of the `x-cache` diagnostics header.
    pub fn as_header_value(&self) -> &'static str {
        match self {
            Outcome::Hit => "HIT",
            Outcome::Filled => "MISS",
            Outcome::PassThrough => "BYPASS",
        }
    }
}

/// An entry ready to be turned into a response.
#[derive(Debug, Clone)]
pub struct Served {
    pub entry: CacheEntry,
    pub outcome: Outcome,
}

impl Served {
    fn pass_through(fetched: FetchedImage) -> Self {
        Self {
            entry: CacheEntry::new(fetched.body, fetched.headers),
            outcome: Outcome::PassThrough,
        }
    }
}

// == Image Pipeline ==
/// Composes policy, cache and backend for image requests.
pub struct ImagePipeline {
    policy: DomainPolicy,
    cache: CacheStore,
    backend: Arc<dyn TransformBackend>,
    version: String,
}

impl ImagePipeline {
    /// Creates a pipeline keyed with the current cache format version.
    pub fn new(policy: DomainPolicy, cache: CacheStore, backend: Arc<dyn TransformBackend>) -> Self {
        Self {
            policy,
            cache,
            backend,
            version: CACHE_VERSION.to_string(),
        }
    }

    /// Derives the cache key for a request.
    pub fn key_for(&self, request: &ImageRequest) -> CacheKey {
        CacheKey::new(&request.path, request.raw_query.as_deref(), &self.version)
    }

    // == Handle ==
    /// Runs the pipeline for one request.
    ///
    /// A cache hit returns before validation and never reaches the backend.
    /// Backend failures leave the cache untouched.
    pub async fn handle(&self, request: &ImageRequest) -> Result<Served> {
        let key = self.key_for(request);

        if let Some(entry) = self.cache.lookup(&key).await {
            debug!(key = %key, "Cache hit");
            return Ok(Served {
                entry,
                outcome: Outcome::Hit,
            });
        }
        debug!(key = %key, "Cache miss");

        let params = validate_request(&self.policy, &request.source, &request.query)
            .inspect_err(|e| info!(key = %key, error = %e, "Rejected image request"))?;

        let fetched = self
            .backend
            .fetch(&params)
            .await
            .inspect_err(|e| warn!(key = %key, origin = %params.origin, error = %e, "Transformation failed"))?;

        if !self.cache.is_enabled() {
            return Ok(Served::pass_through(fetched));
        }

        if let Err(e) = self
            .cache
            .store(&key, fetched.body.clone(), fetched.headers.clone())
            .await
        {
            error!(key = %key, origin = %params.origin, error = %e, "Cache write failed, serving fetched image directly");
            return Ok(Served::pass_through(fetched));
        }

        match self.cache.lookup(&key).await {
            Some(entry) => Ok(Served {
                entry,
                outcome: Outcome::Filled,
            }),
            None => {
                warn!(key = %key, origin = %params.origin, "Cache read-back missed, serving fetched image directly");
                Ok(Served::pass_through(fetched))
            }
        }
    }
}
