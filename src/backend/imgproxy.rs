//! imgproxy client
//!
//! Issues one GET per transformation against an imgproxy-compatible service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::{debug, warn};

use crate::backend::{filter_headers, FetchedImage, TransformBackend};
use crate::error::{GatewayError, Result};
use crate::policy::TransformParams;

/// Processing preset prepended to every transformation path
const PRESET: &str = "pr:sharp/f:webp";

/// Formats offered to the backend
const ACCEPT_IMAGES: &str = "image/avif,image/webp,image/apng,*/*";

/// HTTP client for the transformation backend.
#[derive(Debug, Clone)]
pub struct ImgproxyClient {
    base_url: String,
    http: reqwest::Client,
}

impl ImgproxyClient {
    /// Creates a client for `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Builds the backend URL for a transformation.
    pub fn transform_url(&self, params: &TransformParams) -> String {
        format!(
            "{}/{}/resize:fill:{}:{}/q:{}/plain/{}",
            self.base_url, PRESET, params.width, params.height, params.quality, params.source
        )
    }
}

#[async_trait]
impl TransformBackend for ImgproxyClient {
    async fn fetch(&self, params: &TransformParams) -> Result<FetchedImage> {
        let url = self.transform_url(params);
        debug!(origin = %params.origin, url = %url, "Requesting transformation");

        let response = self
            .http
            .get(&url)
            .header(ACCEPT, ACCEPT_IMAGES)
            .send()
            .await
            .map_err(|e| {
                warn!(origin = %params.origin, error = %e, timeout = e.is_timeout(), "Backend request failed");
                GatewayError::Backend {
                    status: None,
                    message: e.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(origin = %params.origin, status = status.as_u16(), "Backend returned an error status");
            return Err(GatewayError::Backend {
                status: Some(status.as_u16()),
                message: format!("backend responded with {}", status),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.starts_with("image/") {
            warn!(origin = %params.origin, content_type = %content_type, "Backend returned a non-image body");
            return Err(GatewayError::UnsupportedMediaType(content_type));
        }

        let headers = filter_headers(response.headers());
        let body = response.bytes().await.map_err(|e| GatewayError::Backend {
            status: Some(status.as_u16()),
            message: format!("failed to read backend body: {}", e),
        })?;

        Ok(FetchedImage { body, headers })
    }
}
