//! API Handlers
//!
//! HTTP request handlers for each gateway endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{rejection::PathRejection, Path, Query, Request, State},
    http::{header, HeaderName, HeaderValue, Method, StatusCode, Uri},
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use tracing::warn;

use crate::backend::{ImgproxyClient, TransformBackend};
use crate::cache::{CacheStore, CACHE_VERSION};
use crate::config::Config;
use crate::error::{GatewayError, Result};
use crate::models::{index_page, ImageQuery, HOMEPAGE_URL};
use crate::pipeline::{ImagePipeline, ImageRequest, Served};
use crate::policy::DomainPolicy;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Image request pipeline
    pub pipeline: Arc<ImagePipeline>,
}

impl AppState {
    /// Creates a new AppState around a pipeline.
    pub fn new(pipeline: ImagePipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Builds the domain policy, the disk cache and the imgproxy client.
    pub fn from_config(config: &Config) -> Result<Self> {
        let policy = DomainPolicy::new(&config.allowed_domains);
        let cache = CacheStore::new(&config.cache_dir, config.cache_ttl)?;
        let backend: Arc<dyn TransformBackend> = Arc::new(ImgproxyClient::new(
            config.backend_url.clone(),
            Duration::from_secs(config.backend_timeout),
        )?);

        Ok(Self::new(ImagePipeline::new(policy, cache, backend)))
    }
}

/// Handler for GET /
pub async fn index_handler() -> Html<String> {
    Html(index_page(CACHE_VERSION))
}

/// Handler for GET /health
pub async fn health_handler() -> &'static str {
    "OK"
}

/// Handler for GET /image/*source
///
/// Serves the transformed image from the cache, filling it on a miss.
pub async fn image_handler(
    State(state): State<AppState>,
    source: std::result::Result<Path<String>, PathRejection>,
    uri: Uri,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response> {
    // Undecodable tails like `%FF` are bad source URLs, not routing errors
    let Path(source) =
        source.map_err(|rejection| GatewayError::InvalidSourceUrl(rejection.body_text()))?;
    serve_image(&state, source, &uri, pairs).await
}

/// Handler for GET /image/ with nothing after the prefix.
pub async fn empty_image_handler(
    State(state): State<AppState>,
    uri: Uri,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response> {
    serve_image(&state, String::new(), &uri, pairs).await
}

async fn serve_image(
    state: &AppState,
    source: String,
    uri: &Uri,
    pairs: Vec<(String, String)>,
) -> Result<Response> {
    let request = ImageRequest {
        path: uri.path().to_string(),
        raw_query: uri.query().map(str::to_string),
        source,
        query: ImageQuery::from_pairs(pairs),
    };

    let served = state.pipeline.handle(&request).await?;
    Ok(image_response(served))
}

/// Fallback for every unknown path or method: redirect to the homepage.
pub async fn fallback_handler() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, HOMEPAGE_URL)]).into_response()
}

/// Answers every OPTIONS request as a CORS preflight.
pub async fn preflight(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        return StatusCode::NO_CONTENT.into_response();
    }
    next.run(request).await
}

/// Builds the response for a served entry.
///
/// Cache hits, fresh fills and pass-through responses all go through here.
pub fn image_response(served: Served) -> Response {
    let mut response = Response::new(Body::from(served.entry.payload));
    let headers = response.headers_mut();

    for (name, value) in &served.entry.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => warn!(header = %name, "Skipping invalid cached header"),
        }
    }
    headers.insert(
        HeaderName::from_static("x-cache"),
        HeaderValue::from_static(served.outcome.as_header_value()),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use bytes::Bytes;

    use crate::cache::CacheEntry;
    use crate::pipeline::Outcome;

    #[tokio::test]
    async fn test_health_handler() {
        assert_eq!(health_handler().await, "OK");
    }

    #[tokio::test]
    async fn test_index_handler_mentions_version() {
        let Html(page) = index_handler().await;
        assert!(page.contains(CACHE_VERSION));
    }

    #[tokio::test]
    async fn test_fallback_redirects() {
        let response = fallback_handler().await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], HOMEPAGE_URL);
    }

    #[test]
    fn test_image_response_copies_entry_headers() {
        let mut entry_headers = BTreeMap::new();
        entry_headers.insert("content-type".to_string(), "image/webp".to_string());
        entry_headers.insert("server".to_string(), "NextImageTransformation".to_string());
        entry_headers.insert("bad header".to_string(), "x".to_string());

        let served = Served {
            entry: CacheEntry::new(Bytes::from_static(b"img"), entry_headers),
            outcome: Outcome::Hit,
        };
        let response = image_response(served);

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "image/webp");
        assert_eq!(response.headers()["server"], "NextImageTransformation");
        assert_eq!(response.headers()["x-cache"], "HIT");
        assert!(response.headers().get("bad header").is_none());
    }
}
