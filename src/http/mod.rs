//! Transport surface for the multiplexer.
//!
//! # Data Flow
//! ```text
//! physical call (any method, any body)
//!     → endpoint.rs (POST + application/json checks, body read, parse)
//!     → dispatch subsystem
//!     → 200 {"responses": [...]} or bodyless 400
//! ```

pub mod endpoint;

pub use endpoint::BatchEndpoint;
