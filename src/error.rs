//! Envelope-level error taxonomy.
//!
//! These errors reject the whole physical call before anything is
//! dispatched. Per sub-request failures never appear here; they are absorbed
//! into that sub-request's own result record.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Reasons a physical batch call is rejected outright.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("batch calls must use POST")]
    MethodNotAllowed,

    #[error("batch calls must carry content-type application/json")]
    UnsupportedContentType,

    #[error("physical call body unreadable or over the size limit")]
    BodyTooLarge(#[source] axum::Error),

    #[error("physical call body is not a valid batch envelope")]
    MalformedBody(#[source] serde_json::Error),

    #[error("envelope is missing the requests field")]
    MissingRequests,
}

impl IntoResponse for EnvelopeError {
    /// Every envelope error surfaces as a generic bad request with no body.
    fn into_response(self) -> Response {
        StatusCode::BAD_REQUEST.into_response()
    }
}
