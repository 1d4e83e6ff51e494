//! Axum router adapter.
//!
//! Mounts a whole `axum::Router` behind the [`Pipeline`] seam so an
//! application's existing routes can serve sub-requests in process.
//!
//! # Design Decisions
//! - Route misses are detected with a marker extension planted by a
//!   fallback installed on the router, and surface through the batch
//!   fallback as 404
//! - Each sub-request runs on its own supervised task; a panicking handler
//!   becomes a 500 record instead of escaping the multiplexer
//! - An empty response body records status only; a JSON body records a
//!   structured result; any other body records its text

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower::ServiceExt;

use crate::pipeline::{Fallback, Pipeline};
use crate::synthetic::{SyntheticRequest, SyntheticResponse};

/// Marker extension identifying responses produced by the route-miss
/// fallback rather than an application handler.
#[derive(Debug, Clone, Copy)]
struct RouteMiss;

async fn route_miss() -> Response {
    let mut response = StatusCode::NOT_FOUND.into_response();
    response.extensions_mut().insert(RouteMiss);
    response
}

/// [`Pipeline`] implementation over an `axum::Router`.
pub struct RouterPipeline {
    router: Router,
}

impl RouterPipeline {
    /// Wrap an application router. Installs a route-miss fallback; an
    /// application that needs its own fallback behavior should keep it out
    /// of the router handed to the multiplexer.
    pub fn new(router: Router) -> Self {
        Self {
            router: router.fallback(route_miss),
        }
    }
}

#[async_trait]
impl Pipeline for RouterPipeline {
    async fn handle(&self, request: SyntheticRequest, sink: SyntheticResponse, fallback: Fallback) {
        let request = match request.into_http() {
            Ok(request) => request,
            Err(error) => return fallback.invoke(Some(Box::new(error))),
        };

        let router = self.router.clone();
        match tokio::spawn(router.oneshot(request)).await {
            Ok(Ok(response)) => transcribe(response, sink, fallback).await,
            Ok(Err(infallible)) => match infallible {},
            Err(join_error) => {
                let verdict = if join_error.is_panic() {
                    "handler panicked"
                } else {
                    "handler task cancelled"
                };
                fallback.invoke(Some(format!("{verdict}: {join_error}").into()));
            }
        }
    }
}

/// Replay the router's response into the sink.
async fn transcribe(response: Response, sink: SyntheticResponse, fallback: Fallback) {
    if response.extensions().get::<RouteMiss>().is_some() {
        return fallback.invoke(None);
    }

    let (parts, body) = response.into_parts();
    // The response was produced in process from a bounded request; no cap.
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => return fallback.invoke(Some(Box::new(error))),
    };

    sink.status(parts.status);
    for (name, value) in parts.headers.iter() {
        sink.header(name.clone(), value.clone());
    }

    if bytes.is_empty() {
        return sink.end();
    }

    let is_json = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));

    if is_json {
        match serde_json::from_slice(&bytes) {
            Ok(value) => sink.send_value(value),
            Err(_) => sink.send_text(String::from_utf8_lossy(&bytes)),
        }
    } else {
        sink.send_text(String::from_utf8_lossy(&bytes));
    }
}
