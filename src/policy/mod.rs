//! Policy Module
//!
//! Decides, before any outbound call, whether an image request is safe and
//! well-formed. Everything here is pure: no I/O, no clocks.

mod domain;
mod validate;


// Re-export public types
pub use domain::DomainPolicy;
pub use validate::{validate_request, TransformParams};

// == Public Constants ==
/// Largest accepted width or height in pixels
pub const MAX_DIMENSION: u32 = 4096;

/// Quality used when the request does not specify one
pub const DEFAULT_QUALITY: u8 = 75;
