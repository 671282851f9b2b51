//! API Routes
//!
//! Configures the Axum router with all gateway endpoints.

use axum::{
    http::{header, HeaderValue},
    middleware,
    routing::get,
    Router,
};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use super::handlers::{
    empty_image_handler, fallback_handler, health_handler, image_handler, index_handler,
    preflight, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /` - Informational page
/// - `GET /health` - Health check endpoint
/// - `GET /image/*source` - Transformed, cached image
/// - `GET /image/` - Same pipeline with an empty source, always a 400
/// - `OPTIONS *` - CORS preflight (204)
/// - anything else - 302 to the project homepage
///
/// # Middleware
/// - CORS: fixed header set on every response
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler).fallback(fallback_handler))
        .route("/health", get(health_handler).fallback(fallback_handler))
        .route(
            "/image/*source",
            get(image_handler).fallback(fallback_handler),
        )
        .route(
            "/image/",
            get(empty_image_handler).fallback(fallback_handler),
        )
        .fallback(fallback_handler)
        .layer(middleware::from_fn(preflight))
        .layer(cors_header(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(cors_header(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, OPTIONS"),
        ))
        .layer(cors_header(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("*"),
        ))
        .layer(cors_header(
            header::ACCESS_CONTROL_MAX_AGE,
            HeaderValue::from_static("86400"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_header(
    name: header::HeaderName,
    value: HeaderValue,
) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(name, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ImgproxyClient;
    use crate::cache::CacheStore;
    use crate::pipeline::ImagePipeline;
    use crate::policy::DomainPolicy;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;
    use tower::util::ServiceExt;

    fn create_test_app(dir: &TempDir) -> Router {
        let backend = ImgproxyClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let pipeline = ImagePipeline::new(
            DomainPolicy::new(["example.com"]),
            CacheStore::new(dir.path(), 60).unwrap(),
            Arc::new(backend),
        );
        create_router(AppState::new(pipeline))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let dir = TempDir::new().unwrap();
        let app = create_test_app(&dir);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn test_preflight_returns_no_content() {
        let dir = TempDir::new().unwrap();
        let app = create_test_app(&dir);

        let response = app
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/image/https%3A%2F%2Fexample.com%2Fa.jpg")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()["access-control-allow-methods"], "GET, OPTIONS");
        assert_eq!(response.headers()["access-control-max-age"], "86400");
    }

    #[tokio::test]
    async fn test_unknown_path_redirects() {
        let dir = TempDir::new().unwrap();
        let app = create_test_app(&dir);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
    }

    #[tokio::test]
    async fn test_wrong_method_redirects() {
        let dir = TempDir::new().unwrap();
        let app = create_test_app(&dir);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
    }

    #[tokio::test]
    async fn test_disallowed_domain_is_forbidden() {
        let dir = TempDir::new().unwrap();
        let app = create_test_app(&dir);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/image/https%3A%2F%2Fevil.com%2Fa.jpg?width=10")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
