//! Batch orchestration.
//!
//! Builds one synthetic request/response pair per sub-request, replays each
//! through the pipeline without waiting between dispatches, and aggregates
//! the captured records in submission order.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderMap, Method, StatusCode};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::config::BatchOptions;
use crate::dispatch::CompletionCoordinator;
use crate::envelope::{BatchEnvelope, BatchResult, ResultRecord};
use crate::headers::merge_headers;
use crate::pipeline::{Fallback, Pipeline};
use crate::synthetic::{SyntheticRequest, SyntheticResponse};

/// Orchestrates one batch: envelope in, ordered aggregate out.
pub struct BatchDispatcher {
    pipeline: Arc<dyn Pipeline>,
    options: BatchOptions,
}

impl BatchDispatcher {
    pub fn new(pipeline: Arc<dyn Pipeline>, options: BatchOptions) -> Self {
        Self { pipeline, options }
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Replay every sub-request through the pipeline and aggregate the
    /// results. `outer_headers` are the physical call's headers, used as the
    /// base for per-request header merging.
    ///
    /// All sub-requests are issued without waiting on any; completion is
    /// observed out of order and re-addressed by index. A sub-request
    /// failure never aborts its siblings.
    pub async fn dispatch(&self, outer_headers: &HeaderMap, envelope: BatchEnvelope) -> BatchResult {
        let batch_id = Uuid::new_v4();
        let total = envelope.requests.len();
        tracing::debug!(batch_id = %batch_id, total, "dispatching batch");

        let coordinator = CompletionCoordinator::new(total);

        let limiter = match self.options.max_in_flight {
            0 => None,
            cap => Some(Arc::new(Semaphore::new(cap))),
        };
        let deadline = match self.options.sub_request_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        for (index, sub) in envelope.requests.into_iter().enumerate() {
            let method = match Method::from_bytes(sub.method.as_bytes()) {
                Ok(method) => method,
                Err(_) => {
                    tracing::warn!(
                        batch_id = %batch_id,
                        index,
                        method = %sub.method,
                        "sub-request carries an invalid method"
                    );
                    coordinator
                        .handle(index)
                        .complete(ResultRecord::with_reason(StatusCode::BAD_REQUEST));
                    continue;
                }
            };

            let headers = merge_headers(outer_headers, &sub.headers);
            let request = SyntheticRequest::new(method, &sub.uri, headers, sub.body.as_ref());
            let sink = SyntheticResponse::new(coordinator.handle(index), self.options.return_headers);
            let fallback = Fallback::new(sink.clone());
            let overdue = coordinator.handle(index);

            tracing::debug!(
                batch_id = %batch_id,
                index,
                method = %request.method(),
                path = %request.path(),
                "dispatching sub-request"
            );

            let pipeline = Arc::clone(&self.pipeline);
            let limiter = limiter.clone();
            tokio::spawn(async move {
                let _permit = match limiter {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };
                let run = pipeline.handle(request, sink, fallback);
                match deadline {
                    Some(limit) => {
                        if tokio::time::timeout(limit, run).await.is_err() {
                            tracing::warn!(
                                batch_id = %batch_id,
                                index,
                                "sub-request stalled; forcing a timeout completion"
                            );
                            overdue.complete(ResultRecord::with_reason(StatusCode::GATEWAY_TIMEOUT));
                        }
                    }
                    None => run.await,
                }
            });
        }

        let responses = coordinator.wait().await;
        tracing::debug!(batch_id = %batch_id, total, "batch aggregated");
        BatchResult { responses }
    }
}
