//! Structured logging initialization.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the global tracing subscriber.
///
/// `level` applies to the rumor crates unless `RUST_LOG` overrides it;
/// `json_format` selects JSON output for log aggregation, pretty output
/// otherwise.
pub fn init_logging(level: &str, json_format: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("rumor={level},rumor_node={level},tower_http=warn").into());

    let registry = tracing_subscriber::registry().with(env_filter);

    if json_format {
        registry
            .with(fmt::layer().json().with_current_span(true).with_target(true))
            .init();
    } else {
        registry.with(fmt::layer().pretty()).init();
    }

    tracing::info!(level = %level, json = json_format, "Logging initialized");
}
