//! Synthetic request/response pair.
//!
//! # Data Flow
//! ```text
//! SubRequestSpec + merged headers
//!     → request.rs (fully-buffered stand-in for an inbound request)
//!     → [pipeline handles it in process]
//!     → response.rs (sink capturing status, body, headers)
//!     → ResultRecord handed to the completion coordinator
//! ```
//!
//! # Design Decisions
//! - Request bodies are loaded in full before dispatch; pipeline reads
//!   never block
//! - The sink is cheaply clonable so the pipeline and its fallback can
//!   share it; completion fires exactly once regardless

pub mod request;
pub mod response;

pub use request::SyntheticRequest;
pub use response::SyntheticResponse;
