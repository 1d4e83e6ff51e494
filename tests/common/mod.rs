//! Shared utilities for the end-to-end batch tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use batch_mux::{BatchEndpoint, BatchOptions, RouterPipeline};

async fn user() -> Json<Value> {
    Json(json!({"id": 17}))
}

async fn user_by_id(Path(id): Path<String>, headers: HeaderMap) -> Json<Value> {
    let token = headers
        .get("token")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    Json(json!({"id": id, "token": token}))
}

async fn pi() -> Json<f64> {
    Json(std::f64::consts::PI)
}

async fn e() -> Json<f64> {
    Json(std::f64::consts::E)
}

async fn pi_with_token() -> impl axum::response::IntoResponse {
    ([("token", "124")], Json(std::f64::consts::PI))
}

async fn forbidden() -> StatusCode {
    StatusCode::FORBIDDEN
}

async fn panicking() -> StatusCode {
    panic!("exercised on purpose")
}

async fn echo(Json(body): Json<Value>) -> Json<Value> {
    Json(body)
}

async fn climate(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let sunny = params.get("sunny").map(String::as_str) == Some("true");
    let warm = params.get("warm").map(String::as_str) == Some("true");
    Json(json!({"sunny": sunny && warm, "warm": sunny && warm}))
}

/// The demo application whose routes sub-requests are replayed through.
pub fn api_routes() -> Router {
    Router::new()
        .route("/api/user", get(user))
        .route("/api/user/{id}", get(user_by_id))
        .route("/api/constants/pi", get(pi))
        .route("/api/constants/e", get(e))
        .route("/api/token", get(pi_with_token))
        .route("/api/forbidden", get(forbidden))
        .route("/api/exception/sync", get(panicking))
        .route("/api/echo", post(echo))
        .route("/api/climate", get(climate))
}

/// Serve the demo app with a batch endpoint mounted at `/api/batch`,
/// returning the bound address.
pub async fn start_batch_server(options: BatchOptions) -> SocketAddr {
    batch_mux::observability::init_tracing();

    let app = api_routes();
    let pipeline = Arc::new(RouterPipeline::new(app.clone()));
    let endpoint = BatchEndpoint::new(pipeline, options);
    let server = app.route("/api/batch", endpoint.into_method_router());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, server).await;
    });
    addr
}
