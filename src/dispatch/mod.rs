//! Batch dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! BatchEnvelope
//!     → dispatcher.rs (merge headers, build synthetic pair per index,
//!                      spawn pipeline invocations without waiting)
//!     → coordinator.rs (barrier counting completions per batch)
//!     → BatchResult in original index order
//! ```
//!
//! # Design Decisions
//! - Result slots are addressed by index, so completion order never affects
//!   final ordering
//! - One coordinator instance per batch call; no shared global counters
//! - First completion per index wins; a timeout racing the real completion
//!   cannot double-count

pub mod coordinator;
pub mod dispatcher;

pub use coordinator::{CompletionCoordinator, CompletionHandle};
pub use dispatcher::BatchDispatcher;
