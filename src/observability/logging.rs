//! Structured logging.
//!
//! # Responsibilities
//! - Install the global `tracing` subscriber
//! - Choose text or JSON output
//! - Attach the OpenTelemetry layer for registered sources
//!
//! # Design Decisions
//! - `RUST_LOG` overrides the configured filter
//! - The filter applies to log output only; exported spans use their own source filter

use opentelemetry_sdk::trace::TracerProvider;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::config::{LogFormat, LoggingConfig, TelemetryConfig};
use crate::observability::tracing::{trace_layer, ACTIVITY_SOURCE_NAME, HTTP_SOURCE_NAME};
use crate::observability::TelemetryError;

/// Sources whose spans go to the trace exporter.
pub fn trace_sources(telemetry: &TelemetryConfig) -> Vec<String> {
    let mut sources = vec![ACTIVITY_SOURCE_NAME.to_string()];
    if telemetry.http_instrumentation {
        sources.push(HTTP_SOURCE_NAME.to_string());
    }
    sources
}

/// Filter directives: `rust_log` when set and non-empty, the configured level otherwise.
pub fn filter_directives(rust_log: Option<String>, logging: &LoggingConfig) -> String {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .unwrap_or_else(|| logging.level.clone())
}

/// Build the log filter from `RUST_LOG` or the configured level.
pub fn env_filter(logging: &LoggingConfig) -> Result<EnvFilter, TelemetryError> {
    let directives = filter_directives(std::env::var(EnvFilter::DEFAULT_ENV).ok(), logging);
    Ok(EnvFilter::try_new(directives)?)
}

/// Install the global subscriber.
///
/// Spans from the registered sources go to `tracer_provider` when one is given.
pub fn init_logging(
    logging: &LoggingConfig,
    telemetry: &TelemetryConfig,
    tracer_provider: Option<&TracerProvider>,
) -> Result<(), TelemetryError> {
    let filter = env_filter(logging)?;

    let fmt_layer = match logging.format {
        LogFormat::Text => fmt::layer().with_filter(filter).boxed(),
        LogFormat::Json => fmt::layer().json().with_filter(filter).boxed(),
    };

    let traces = tracer_provider.map(|provider| trace_layer(provider, trace_sources(telemetry)));

    Registry::default()
        .with(fmt_layer)
        .with(traces)
        .try_init()?;

    Ok(())
}
