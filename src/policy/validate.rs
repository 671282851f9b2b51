//! Request Validation Module
//!
//! Turns a raw source string and query into validated transformation
//! parameters, or the first policy violation found.

use reqwest::Url;

use crate::error::{GatewayError, Result};
use crate::models::ImageQuery;
use crate::policy::{DomainPolicy, DEFAULT_QUALITY, MAX_DIMENSION};

// == Transform Params ==
/// A request that passed every policy check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformParams {
    /// Absolute http(s) URL of the source image
    pub source: Url,
    /// Lowercase source hostname
    pub origin: String,
    /// Target width, 0 means inferred
    pub width: u32,
    /// Target height, 0 means inferred
    pub height: u32,
    /// Output quality in `[1, 100]`
    pub quality: u8,
}

// == Validate Request ==
/// Validates a request against the policy.
///
/// Checks run in a fixed order so the reported failure is stable:
/// URL syntax, scheme, port, domain, width, height, quality.
pub fn validate_request(
    policy: &DomainPolicy,
    source: &str,
    query: &ImageQuery,
) -> Result<TransformParams> {
    let url = Url::parse(source).map_err(|e| GatewayError::InvalidSourceUrl(e.to_string()))?;

    let default_port = match url.scheme() {
        "http" => 80,
        "https" => 443,
        other => return Err(GatewayError::UnsupportedProtocol(other.to_string())),
    };

    if let Some(port) = url.port() {
        if port != default_port {
            return Err(GatewayError::UnsupportedPort(port));
        }
    }

    let origin = url
        .host_str()
        .ok_or_else(|| GatewayError::InvalidSourceUrl("missing host".to_string()))?
        .to_ascii_lowercase();

    if !policy.allows(&origin) {
        return Err(GatewayError::DomainNotAllowed(origin));
    }

    let width = parse_dimension("width", query.width.as_deref())?;
    let height = parse_dimension("height", query.height.as_deref())?;
    let quality = parse_quality(query.quality.as_deref())?;

    Ok(TransformParams {
        source: url,
        origin,
        width,
        height,
        quality,
    })
}

fn parse_dimension(name: &str, raw: Option<&str>) -> Result<u32> {
    let Some(raw) = raw.filter(|r| !r.is_empty()) else {
        return Ok(0);
    };

    match raw.parse::<u32>() {
        Ok(value) if value <= MAX_DIMENSION => Ok(value),
        _ => Err(GatewayError::InvalidParameters(format!(
            "{} must be an integer between 0 and {}",
            name, MAX_DIMENSION
        ))),
    }
}

fn parse_quality(raw: Option<&str>) -> Result<u8> {
    let Some(raw) = raw.filter(|r| !r.is_empty()) else {
        return Ok(DEFAULT_QUALITY);
    };

    match raw.parse::<u8>() {
        Ok(value) if (1..=100).contains(&value) => Ok(value),
        _ => Err(GatewayError::InvalidParameters(
            "quality must be an integer between 1 and 100".to_string(),
        )),
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn allow_all() -> DomainPolicy {
        DomainPolicy::new(["*"])
    }

    fn query(width: Option<&str>, height: Option<&str>, quality: Option<&str>) -> ImageQuery {
        ImageQuery {
            width: width.map(str::to_string),
            height: height.map(str::to_string),
            quality: quality.map(str::to_string),
        }
    }

    #[test]
    fn test_defaults_applied() {
        let params =
            validate_request(&allow_all(), "https://example.com/a.jpg", &ImageQuery::default())
                .unwrap();
        assert_eq!(params.width, 0);
        assert_eq!(params.height, 0);
        assert_eq!(params.quality, DEFAULT_QUALITY);
        assert_eq!(params.origin, "example.com");
    }

    #[test]
    fn test_explicit_params() {
        let q = query(Some("100"), Some("4096"), Some("1"));
        let params = validate_request(&allow_all(), "http://example.com/a.png", &q).unwrap();
        assert_eq!((params.width, params.height, params.quality), (100, 4096, 1));
    }

    #[test]
    fn test_empty_values_use_defaults() {
        let q = ImageQuery::from_pairs([
            ("width", ""),
            ("height", ""),
            ("height", "30"),
            ("quality", ""),
        ]);
        let params = validate_request(&allow_all(), "https://example.com/a.jpg", &q).unwrap();
        assert_eq!((params.width, params.height, params.quality), (0, 0, DEFAULT_QUALITY));
    }

    #[test]
    fn test_empty_source_rejected() {
        let result = validate_request(&allow_all(), "", &ImageQuery::default());
        assert!(matches!(result, Err(GatewayError::InvalidSourceUrl(_))));
    }

    #[test]
    fn test_relative_url_rejected() {
        let result = validate_request(&allow_all(), "a.jpg", &ImageQuery::default());
        assert!(matches!(result, Err(GatewayError::InvalidSourceUrl(_))));
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        for source in ["ftp://example.com/a.jpg", "file:///etc/passwd", "data:image/png,abc"] {
            let result = validate_request(&allow_all(), source, &ImageQuery::default());
            assert!(
                matches!(result, Err(GatewayError::UnsupportedProtocol(_))),
                "{} should be rejected",
                source
            );
        }
    }

    #[test]
    fn test_default_ports_accepted() {
        for source in ["http://example.com:80/a.jpg", "https://example.com:443/a.jpg"] {
            assert!(validate_request(&allow_all(), source, &ImageQuery::default()).is_ok());
        }
    }

    #[test]
    fn test_non_default_ports_rejected() {
        let result = validate_request(
            &allow_all(),
            "http://example.com:8080/a.jpg",
            &ImageQuery::default(),
        );
        assert!(matches!(result, Err(GatewayError::UnsupportedPort(8080))));

        let result = validate_request(
            &allow_all(),
            "http://example.com:443/a.jpg",
            &ImageQuery::default(),
        );
        assert!(matches!(result, Err(GatewayError::UnsupportedPort(443))));
    }

    #[test]
    fn test_domain_not_allowed_carries_origin() {
        let policy = DomainPolicy::new(["example.com"]);
        let result = validate_request(&policy, "https://Evil.com/a.jpg", &ImageQuery::default());
        match result {
            Err(GatewayError::DomainNotAllowed(origin)) => assert_eq!(origin, "evil.com"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range_params_rejected() {
        let cases = [
            query(Some("4097"), None, None),
            query(None, Some("-1"), None),
            query(Some("abc"), None, None),
            query(None, None, Some("0")),
            query(None, None, Some("101")),
            query(None, None, Some("7.5")),
        ];
        for q in cases {
            let result = validate_request(&allow_all(), "https://example.com/a.jpg", &q);
            assert!(
                matches!(result, Err(GatewayError::InvalidParameters(_))),
                "{:?} should be rejected",
                q
            );
        }
    }

    #[test]
    fn test_first_failure_is_reported() {
        // Bad port and bad domain and bad quality: the port is checked first
        let policy = DomainPolicy::new(["example.com"]);
        let q = query(None, None, Some("500"));
        let result = validate_request(&policy, "http://evil.com:81/a.jpg", &q);
        assert!(matches!(result, Err(GatewayError::UnsupportedPort(81))));

        // Bad domain and bad quality: the domain wins
        let result = validate_request(&policy, "http://evil.com/a.jpg", &q);
        assert!(matches!(result, Err(GatewayError::DomainNotAllowed(_))));
    }
}
