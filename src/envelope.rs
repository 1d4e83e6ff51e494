//! Batch envelope wire types.
//!
//! This module defines the JSON shapes exchanged with the caller.
//! All types derive Serde traits; optional result fields are omitted from
//! serialization rather than emitted as null.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EnvelopeError;

/// The physical call body: every sub-request for one batch.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BatchEnvelope {
    /// Ordered sub-request descriptions. May be empty.
    pub requests: Vec<SubRequestSpec>,
}

/// One logical request embedded in the batch envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubRequestSpec {
    /// HTTP method name ("GET", "POST", ...).
    pub method: String,

    /// Path with optional query string. A missing leading slash is accepted.
    pub uri: String,

    /// Per-request headers, overriding the outer call's headers per key.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,

    /// Request body for methods that carry one. A JSON string is loaded as
    /// its raw text; any other value as its JSON encoding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

/// Captured outcome of one sub-request.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ResultRecord {
    /// Response status. Defaults to 200 when the handler never set one.
    pub status: u16,

    /// Response body, present only if one was written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Response headers, present only when the batch was configured with
    /// `return_headers`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
}

impl ResultRecord {
    /// Record carrying a status and nothing else.
    pub fn status_only(status: StatusCode) -> Self {
        Self {
            status: status.as_u16(),
            result: None,
            headers: None,
        }
    }

    /// Record carrying a status plus its canonical reason phrase as the
    /// result (404 → "Not Found", 403 → "Forbidden").
    pub fn with_reason(status: StatusCode) -> Self {
        Self {
            status: status.as_u16(),
            result: Some(reason_phrase(status)),
            headers: None,
        }
    }

    /// Record carrying a status and an explicit result value.
    pub fn with_result(status: StatusCode, result: Value) -> Self {
        Self {
            status: status.as_u16(),
            result: Some(result),
            headers: None,
        }
    }
}

/// Reason phrase for a status code; codes without a registered phrase fall
/// back to their numeric form.
pub(crate) fn reason_phrase(status: StatusCode) -> Value {
    match status.canonical_reason() {
        Some(reason) => Value::String(reason.to_string()),
        None => Value::String(status.as_u16().to_string()),
    }
}

/// The aggregate reply, positionally aligned with `BatchEnvelope::requests`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BatchResult {
    pub responses: Vec<ResultRecord>,
}

/// Parse the physical call body into an envelope.
///
/// Distinguishes a body that is not JSON at all from a JSON document missing
/// the `requests` field; both reject the batch, but the logs differ.
pub fn parse_envelope(bytes: &[u8]) -> Result<BatchEnvelope, EnvelopeError> {
    let value: Value = serde_json::from_slice(bytes).map_err(EnvelopeError::MalformedBody)?;
    if value.get("requests").is_none() {
        return Err(EnvelopeError::MissingRequests);
    }
    serde_json::from_value(value).map_err(EnvelopeError::MalformedBody)
}
