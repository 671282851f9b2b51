//! Response DTOs for the image gateway
//!
//! Defines the bodies of non-image responses.

use serde::Serialize;

/// Where unknown paths are redirected
pub const HOMEPAGE_URL: &str = "https://github.com/coollabsio/next-image-transformation";

/// Renders the informational page served at `/`.
pub fn index_page(version: &str) -> String {
    format!(
        "<h3>Next Image Transformation v{}</h3>More info <a href=\"{}\">{}</a>.",
        version, HOMEPAGE_URL, HOMEPAGE_URL
    )
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_page_interpolates_version() {
        let page = index_page("1.2.3");
        assert!(page.contains("v1.2.3"));
        assert!(page.contains(HOMEPAGE_URL));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Domain (evil.com) not allowed");
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"error":"Domain (evil.com) not allowed"}"#);
    }
}
