//! In-process HTTP batch multiplexer.
//!
//! A caller submits several logical HTTP requests in one physical POST and
//! receives all their responses aggregated in one JSON reply. Each
//! sub-request is replayed through an existing request-handling pipeline
//! without touching the network.
//!
//! # Architecture Overview
//!
//! ```text
//! physical POST {requests: [...]}
//!     → http::endpoint   (validate method/content-type, parse envelope)
//!     → dispatch::dispatcher
//!         → headers      (merge outer call headers with per-request ones)
//!         → synthetic    (fabricate buffered request + capturing sink)
//!         → pipeline     (replay through the application, in process)
//!         → dispatch::coordinator (barrier over N completions)
//!     → {responses: [...]} positionally aligned with the envelope
//! ```
//!
//! Sub-request failures (no matching route, panicking handler, timeout) are
//! absorbed into that sub-request's own result record; only envelope-level
//! validation failures reject the whole batch.

// Core subsystems
pub mod config;
pub mod dispatch;
pub mod envelope;
pub mod http;
pub mod pipeline;
pub mod synthetic;

// Cross-cutting concerns
pub mod error;
pub mod headers;
pub mod observability;

pub use config::BatchOptions;
pub use dispatch::{BatchDispatcher, CompletionCoordinator, CompletionHandle};
pub use envelope::{BatchEnvelope, BatchResult, ResultRecord, SubRequestSpec};
pub use error::EnvelopeError;
pub use headers::merge_headers;
pub use http::BatchEndpoint;
pub use pipeline::{Fallback, Pipeline, RouterPipeline};
pub use synthetic::{SyntheticRequest, SyntheticResponse};
