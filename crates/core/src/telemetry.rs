//! Tracing configuration.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Error, Result};

/// Configure the global tracing subscriber.
///
/// Filtering follows `RUST_LOG`, defaulting to `info,taskmesh=debug`. With
/// `json_logs` set, log lines are emitted as JSON objects.
pub fn configure_tracing(json_logs: bool) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info,taskmesh=debug".into()),
    );

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    result.map_err(|e| Error::internal(format!("failed to install tracing subscriber: {}", e)))
}
