//! Pipeline capability interface.
//!
//! The request-handling pipeline is an external collaborator: anything that
//! can take a synthetic request, write a terminal response into the sink or
//! invoke the fallback, exactly once per sub-request. The dispatcher never
//! looks inside it.

pub mod router;

use async_trait::async_trait;
use axum::http::StatusCode;

use crate::synthetic::{SyntheticRequest, SyntheticResponse};

pub use router::RouterPipeline;

/// Boxed error handed to the fallback by a failing handler.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The opaque request-handling pipeline sub-requests are replayed through.
///
/// Contract: for every call, exactly one of {a terminal operation on the
/// sink, an invocation of the fallback} happens.
#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn handle(
        &self,
        request: SyntheticRequest,
        response: SyntheticResponse,
        fallback: Fallback,
    );
}

/// Last-resort callback for sub-requests no handler consumed.
///
/// Invoked with an error when a handler failed (recorded as 500), without
/// one when no route matched (recorded as 404). Consumed on use.
pub struct Fallback {
    sink: SyntheticResponse,
}

impl Fallback {
    pub(crate) fn new(sink: SyntheticResponse) -> Self {
        Self { sink }
    }

    pub fn invoke(self, error: Option<BoxError>) {
        match error {
            Some(error) => {
                tracing::warn!(%error, "sub-request handler failed");
                self.sink.send_status(StatusCode::INTERNAL_SERVER_ERROR);
            }
            None => self.sink.send_status(StatusCode::NOT_FOUND),
        }
    }
}
