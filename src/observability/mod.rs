//! Observability subsystem.
//!
//! Every dispatch emits structured `tracing` events carrying the batch's
//! correlation id; fallback, timeout, and rejection paths log at warn.

pub mod logging;

pub use logging::init_tracing;
