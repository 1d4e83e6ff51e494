//! Mountable batch endpoint.
//!
//! Owns the physical-call contract: a batch call must be a POST carrying
//! `application/json`, anything else is rejected with a bodyless 400 before
//! any sub-request is dispatched.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, MethodRouter};
use axum::Json;

use crate::config::BatchOptions;
use crate::dispatch::BatchDispatcher;
use crate::envelope::{parse_envelope, BatchResult};
use crate::error::EnvelopeError;
use crate::pipeline::Pipeline;

/// Batch endpoint ready to be mounted on an application router.
pub struct BatchEndpoint {
    dispatcher: BatchDispatcher,
}

impl BatchEndpoint {
    pub fn new(pipeline: Arc<dyn Pipeline>, options: BatchOptions) -> Self {
        Self {
            dispatcher: BatchDispatcher::new(pipeline, options),
        }
    }

    /// Handle one physical call end to end.
    pub async fn call(&self, request: Request<Body>) -> Response {
        match self.process(request).await {
            Ok(result) => (StatusCode::OK, Json(result)).into_response(),
            Err(error) => {
                tracing::warn!(%error, "rejecting batch call");
                error.into_response()
            }
        }
    }

    async fn process(&self, request: Request<Body>) -> Result<BatchResult, EnvelopeError> {
        if request.method() != Method::POST {
            return Err(EnvelopeError::MethodNotAllowed);
        }

        let content_type = request
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");
        // Parameters like `; charset=utf-8` are tolerated.
        if content_type.split(';').next().map(str::trim) != Some("application/json") {
            return Err(EnvelopeError::UnsupportedContentType);
        }

        let (parts, body) = request.into_parts();
        let bytes = axum::body::to_bytes(body, self.dispatcher.options().max_body_size)
            .await
            .map_err(EnvelopeError::BodyTooLarge)?;
        let envelope = parse_envelope(&bytes)?;

        Ok(self.dispatcher.dispatch(&parts.headers, envelope).await)
    }

    /// Mount point accepting every method, so the POST check answers with
    /// the contract's 400 rather than axum's 405.
    pub fn into_method_router(self) -> MethodRouter {
        let endpoint = Arc::new(self);
        any(move |request: Request<Body>| {
            let endpoint = Arc::clone(&endpoint);
            async move { endpoint.call(request).await }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{Fallback, RouterPipeline};
    use crate::synthetic::{SyntheticRequest, SyntheticResponse};
    use async_trait::async_trait;
    use axum::http::HeaderValue;
    use serde_json::{json, Value};

    struct NullPipeline;

    #[async_trait]
    impl Pipeline for NullPipeline {
        async fn handle(
            &self,
            _request: SyntheticRequest,
            _sink: SyntheticResponse,
            fallback: Fallback,
        ) {
            fallback.invoke(None);
        }
    }

    fn endpoint() -> BatchEndpoint {
        BatchEndpoint::new(Arc::new(NullPipeline), BatchOptions::default())
    }

    fn json_post(body: &str) -> Request<Body> {
        let mut request = Request::builder()
            .method(Method::POST)
            .uri("/api/batch")
            .body(Body::from(body.to_string()))
            .unwrap();
        request.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        request
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_non_post_rejected() {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/api/batch")
            .body(Body::empty())
            .unwrap();
        let response = endpoint().call(request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_wrong_content_type_rejected() {
        let mut request = json_post(r#"{"requests":[]}"#);
        request.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        let response = endpoint().call(request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_content_type_parameters_tolerated() {
        let mut request = json_post(r#"{"requests":[]}"#);
        request.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        let response = endpoint().call(request).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_empty_requests_returns_empty_aggregate() {
        let response = endpoint().call(json_post(r#"{"requests":[]}"#)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"responses": []}));
    }

    #[tokio::test]
    async fn test_missing_requests_rejected() {
        let response = endpoint().call(json_post(r#"{"other": 1}"#)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_batch_failure_has_no_partial_results() {
        let response = endpoint().call(json_post("{broken")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_mounted_router_pipeline_round_trip() {
        use axum::routing::get;
        use axum::Router;

        let app = Router::new().route("/api/user", get(|| async { Json(json!({"id": 17})) }));
        let endpoint = BatchEndpoint::new(
            Arc::new(RouterPipeline::new(app)),
            BatchOptions::default(),
        );
        let response = endpoint
            .call(json_post(
                r#"{"requests":[{"method":"GET","uri":"/api/user"}]}"#,
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"responses": [{"status": 200, "result": {"id": 17}}]})
        );
    }
}
