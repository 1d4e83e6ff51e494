//! Configuration schema definitions.
//!
//! All types derive Serde traits so options can be deserialized from config
//! files as well as built in code.

use serde::{Deserialize, Serialize};

/// Setup-time options for one batch endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BatchOptions {
    /// Fold each sub-response's headers into its result record.
    pub return_headers: bool,

    /// Reserved option carried for wire compatibility; unused by the core
    /// dispatch logic.
    pub separator: String,

    /// Maximum sub-requests in flight at once. 0 means unlimited, which is
    /// the reference behavior.
    pub max_in_flight: usize,

    /// Per-sub-request timeout in seconds. A stalled handler is forced to
    /// complete with a 504 record. 0 disables the timeout.
    pub sub_request_timeout_secs: u64,

    /// Maximum physical call body size in bytes.
    pub max_body_size: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            return_headers: false,
            separator: ";".to_string(),
            max_in_flight: 0,
            sub_request_timeout_secs: 30,
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}
