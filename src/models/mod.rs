//! Request and Response models for the image gateway
//!
//! This module defines the DTOs used for parsing query strings and
//! serializing HTTP response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::ImageQuery;
pub use responses::{index_page, ErrorResponse, HOMEPAGE_URL};
