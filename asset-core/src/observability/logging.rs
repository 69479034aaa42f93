//! Structured JSON logging. `RUST_LOG` wins over the configured default.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub fn init_tracing(service_name: &str, default_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .json()
                .flatten_event(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!(service = service_name, "tracing initialized");
}
