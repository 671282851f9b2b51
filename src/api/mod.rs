//! API Module
//!
//! HTTP handlers and routing for the image gateway.
//!
//! # Endpoints
//! - `GET /` - Informational page
//! - `GET /health` - Health check endpoint
//! - `GET /image/*source` - Transformed image, served through the cache
//! - `OPTIONS *` - CORS preflight

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
