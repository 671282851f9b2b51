//! Image Gateway - A caching front for an image transformation service
//!
//! Validates `/image/{source}` requests against a domain and parameter policy,
//! delegates resizing to an imgproxy-style backend and keeps the results in a
//! TTL-bounded disk cache.

pub mod api;
pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod policy;

pub use api::AppState;
pub use config::Config;
pub use error::{GatewayError, Result};
pub use pipeline::ImagePipeline;
