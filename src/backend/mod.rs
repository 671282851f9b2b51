//! Backend Module
//!
//! Client side of the external transformation service. The pipeline only
//! sees the [`TransformBackend`] trait so tests can count and script calls.

mod imgproxy;

use std::collections::BTreeMap;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;

use crate::error::Result;
use crate::policy::TransformParams;

pub use imgproxy::ImgproxyClient;

// == Public Constants ==
/// Headers copied from the backend response; everything else is dropped
pub const HEADER_WHITELIST: [&str; 5] = [
    "content-type",
    "cache-control",
    "content-length",
    "etag",
    "last-modified",
];

/// Value of the `server` header on image responses
pub const SERVER_IDENTITY: &str = "NextImageTransformation";

// == Fetched Image ==
/// A successful backend response, fully buffered.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    /// Image bytes
    pub body: Bytes,
    /// Whitelisted headers plus the server identity
    pub headers: BTreeMap<String, String>,
}

// == Transform Backend ==
/// Something that can turn validated parameters into image bytes.
#[async_trait]
pub trait TransformBackend: Send + Sync {
    /// Performs one transformation.
    ///
    /// Fails with `Backend` on transport errors, timeouts and non-success
    /// statuses, and with `UnsupportedMediaType` when the body is not an image.
    async fn fetch(&self, params: &TransformParams) -> Result<FetchedImage>;
}

/// Keeps the whitelisted headers and stamps the server identity.
pub fn filter_headers(source: &HeaderMap) -> BTreeMap<String, String> {
    let mut headers: BTreeMap<String, String> = HEADER_WHITELIST
        .iter()
        .filter_map(|name| {
            source
                .get(*name)
                .and_then(|v| v.to_str().ok())
                .map(|v| (name.to_string(), v.to_string()))
        })
        .collect();

    headers.insert("server".to_string(), SERVER_IDENTITY.to_string());
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_filter_headers_keeps_whitelist_only() {
        let mut source = HeaderMap::new();
        source.insert("content-type", HeaderValue::from_static("image/webp"));
        source.insert("etag", HeaderValue::from_static("\"abc\""));
        source.insert("x-imgproxy-internal", HeaderValue::from_static("secret"));
        source.insert("set-cookie", HeaderValue::from_static("a=b"));
        source.insert("server", HeaderValue::from_static("imgproxy"));

        let headers = filter_headers(&source);
        assert_eq!(headers.len(), 3);
        assert_eq!(headers["content-type"], "image/webp");
        assert_eq!(headers["etag"], "\"abc\"");
        assert_eq!(headers["server"], SERVER_IDENTITY);
    }

    #[test]
    fn test_filter_headers_on_empty_map() {
        let headers = filter_headers(&HeaderMap::new());
        assert_eq!(headers.len(), 1);
        assert_eq!(headers["server"], SERVER_IDENTITY);
    }
}
