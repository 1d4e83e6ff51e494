//! Capturing response sink.
//!
//! Intercepts every response-producing operation a pipeline might perform
//! and accumulates them into one [`ResultRecord`]. Covers the full surface a
//! handler may finish with: status only, JSON body, raw value, status with
//! reason phrase, file send (unsupported), explicit end.
//!
//! The sink is a cheap clone over shared state so the pipeline and its
//! fallback can both hold it; whichever terminal operation runs first wins
//! and the completion signal fires exactly once.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::http::header::{HeaderName, HeaderValue};
use axum::http::{HeaderMap, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::dispatch::CompletionHandle;
use crate::envelope::{reason_phrase, ResultRecord};

/// Identification header every sink attaches by default.
pub const POWERED_BY: &str = "batch-mux";

/// In-memory stand-in for a real network response.
#[derive(Clone)]
pub struct SyntheticResponse {
    inner: Arc<Mutex<SinkState>>,
}

struct SinkState {
    status: Option<StatusCode>,
    result: Option<Value>,
    headers: HeaderMap,
    return_headers: bool,
    completion: Option<CompletionHandle>,
}

impl SyntheticResponse {
    pub fn new(completion: CompletionHandle, return_headers: bool) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-powered-by"),
            HeaderValue::from_static(POWERED_BY),
        );
        Self {
            inner: Arc::new(Mutex::new(SinkState {
                status: None,
                result: None,
                headers,
                return_headers,
                completion: Some(completion),
            })),
        }
    }

    /// Record a status without finishing the response.
    pub fn status(&self, status: StatusCode) {
        self.lock().status = Some(status);
    }

    /// Record a header in the local header map.
    pub fn header(&self, name: HeaderName, value: HeaderValue) {
        self.lock().headers.insert(name, value);
    }

    /// Record a JSON body as the result and finish. Status defaults to 200
    /// unless previously set.
    pub fn json<T: Serialize>(&self, body: &T) {
        let mut state = self.lock();
        match serde_json::to_value(body) {
            Ok(value) => {
                state.result = Some(value);
            }
            Err(error) => {
                tracing::warn!(%error, "response body failed to serialize");
                state.status = Some(StatusCode::INTERNAL_SERVER_ERROR);
                state.result = Some(reason_phrase(StatusCode::INTERNAL_SERVER_ERROR));
            }
        }
        state.finish();
    }

    /// Record an already-structured value as the result and finish.
    pub fn send_value(&self, body: Value) {
        let mut state = self.lock();
        state.result = Some(body);
        state.finish();
    }

    /// Record a plain-text result and finish.
    pub fn send_text(&self, body: impl Into<String>) {
        self.send_value(Value::String(body.into()));
    }

    /// Record a status together with its canonical reason phrase as the
    /// result, then finish.
    pub fn send_status(&self, status: StatusCode) {
        let mut state = self.lock();
        state.status = Some(status);
        state.result = Some(reason_phrase(status));
        state.finish();
    }

    /// File sends are unsupported: the sink has no filesystem access.
    /// Always records 501 regardless of the path.
    pub fn send_file(&self, path: &Path) {
        tracing::warn!(path = %path.display(), "file send requested through a synthetic response");
        self.send_status(StatusCode::NOT_IMPLEMENTED);
    }

    /// Finish with whatever was recorded so far. Status defaults to 200; no
    /// result unless one was set.
    pub fn end(&self) {
        self.lock().finish();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SinkState> {
        // A panicking handler cannot hold this lock: sink methods never
        // panic while it is held.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl SinkState {
    /// Build the result record and fire the completion signal. Idempotent:
    /// the completion handle is consumed by the first terminal operation.
    fn finish(&mut self) {
        let Some(completion) = self.completion.take() else {
            return;
        };
        let record = ResultRecord {
            status: self.status.unwrap_or(StatusCode::OK).as_u16(),
            result: self.result.take(),
            headers: self.return_headers.then(|| flatten(&self.headers)),
        };
        completion.complete(record);
    }
}

fn flatten(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            let value = value.to_str().ok()?;
            Some((name.as_str().to_string(), value.to_string()))
        })
        .collect()
}
