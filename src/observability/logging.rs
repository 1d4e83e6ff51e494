//! Tracing subscriber setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber.
///
/// Respects `RUST_LOG` when set; safe to call more than once (later calls
/// are no-ops), which keeps test setup simple.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "batch_mux=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
