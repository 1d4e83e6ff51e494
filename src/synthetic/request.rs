//! Fabricated inbound request.
//!
//! Impersonates a fully-buffered request so the pipeline cannot distinguish
//! it from one that arrived over the wire. Created once per sub-request,
//! never reused.

use axum::body::{Body, Bytes};
use axum::http::header;
use axum::http::{HeaderMap, Method, Request};
use serde_json::Value;

/// In-memory stand-in for a real network request.
#[derive(Debug)]
pub struct SyntheticRequest {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl SyntheticRequest {
    /// Build a synthetic request from a sub-request description and the
    /// already-merged header set.
    ///
    /// A missing leading slash on `uri` is prepended. For bodyless methods,
    /// `Content-Length`/`Content-Type` inherited from the outer call are
    /// stripped since no body follows; for body-carrying methods the
    /// `Content-Length` is rewritten to match the loaded payload.
    pub fn new(method: Method, uri: &str, mut headers: HeaderMap, body: Option<&Value>) -> Self {
        let path = if uri.starts_with('/') {
            uri.to_string()
        } else {
            format!("/{uri}")
        };

        let body = if carries_body(&method) {
            body.map(encode_body)
        } else {
            None
        };

        match &body {
            Some(bytes) => {
                headers.insert(header::CONTENT_LENGTH, bytes.len().into());
            }
            None => {
                headers.remove(header::CONTENT_LENGTH);
                headers.remove(header::CONTENT_TYPE);
            }
        }

        Self {
            method,
            path,
            headers,
            body,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Normalized path, query string included.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Convert into an `http::Request` the pipeline can consume. The body is
    /// complete before the pipeline runs, so reads never block.
    pub fn into_http(self) -> Result<Request<Body>, axum::http::Error> {
        let mut request = Request::builder()
            .method(self.method)
            .uri(self.path)
            .body(match self.body {
                Some(bytes) => Body::from(bytes),
                None => Body::empty(),
            })?;
        *request.headers_mut() = self.headers;
        Ok(request)
    }
}

/// Methods whose sub-request body is loaded before dispatch.
fn carries_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

/// A JSON string loads as its raw text; any other value as its JSON
/// encoding.
fn encode_body(value: &Value) -> Bytes {
    match value {
        Value::String(text) => Bytes::from(text.clone().into_bytes()),
        other => Bytes::from(serde_json::to_vec(other).unwrap_or_default()),
    }
}
