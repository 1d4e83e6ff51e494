//! Completion barrier for one batch call.

use axum::http::StatusCode;
use tokio::sync::mpsc;

use crate::envelope::ResultRecord;

/// Delivers the completion of one sub-request to its batch's coordinator.
///
/// Consumed on use; cloning a fresh handle for the same index is allowed
/// (the dispatcher does this for forced timeout completions) and the
/// coordinator keeps only the first record per index.
pub struct CompletionHandle {
    index: usize,
    tx: mpsc::UnboundedSender<(usize, ResultRecord)>,
}

impl CompletionHandle {
    pub fn complete(self, record: ResultRecord) {
        // The receiver only disappears once the batch is aggregated; a late
        // completion after that is dropped on the floor.
        let _ = self.tx.send((self.index, record));
    }
}

/// Barrier releasing the aggregate result once every sub-request has
/// signaled completion. Scoped to one batch call, parameterized by `total`.
pub struct CompletionCoordinator {
    total: usize,
    tx: mpsc::UnboundedSender<(usize, ResultRecord)>,
    rx: mpsc::UnboundedReceiver<(usize, ResultRecord)>,
}

impl CompletionCoordinator {
    pub fn new(total: usize) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { total, tx, rx }
    }

    /// Hand out a completion handle for the sub-request at `index`.
    pub fn handle(&self, index: usize) -> CompletionHandle {
        CompletionHandle {
            index,
            tx: self.tx.clone(),
        }
    }

    /// Wait until `finished == total`, then yield the records in original
    /// index order. Resolves immediately when `total == 0`.
    pub async fn wait(self) -> Vec<ResultRecord> {
        let Self { total, tx, mut rx } = self;
        drop(tx);

        let mut slots: Vec<Option<ResultRecord>> = (0..total).map(|_| None).collect();
        let mut finished = 0usize;

        while finished < total {
            match rx.recv().await {
                Some((index, record)) => match slots.get_mut(index) {
                    Some(slot) => {
                        // Duplicate completions for an index lose to the
                        // first one.
                        if slot.is_none() {
                            *slot = Some(record);
                            finished += 1;
                        }
                    }
                    None => {
                        tracing::warn!(index, total, "completion for out-of-range index dropped");
                    }
                },
                None => {
                    // Every handle dropped without completing. A conforming
                    // pipeline never does this; fill the holes instead of
                    // hanging the batch.
                    tracing::warn!(
                        total,
                        finished,
                        "completion channel closed before the batch finished"
                    );
                    break;
                }
            }
        }

        slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| ResultRecord::with_reason(StatusCode::INTERNAL_SERVER_ERROR))
            })
            .collect()
    }
}
