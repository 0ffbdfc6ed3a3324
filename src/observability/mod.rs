//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers produce:
//!     → logging.rs (structured log events, scoped by spans)
//!     → metrics.rs (counter on the meter, HTTP request metrics)
//!     → tracing.rs (activity spans with parent/child links)
//!
//! Consumers:
//!     → stdout (fmt layer, OpenTelemetry stdout span exporter, console metrics exporter)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Everything is initialized once, in order, by [`init`]
//! - Instrument handles are values passed into the HTTP layer, not statics

pub mod logging;
pub mod metrics;
pub mod tracing;

use opentelemetry_sdk::trace::TracerProvider;
use thiserror::Error;

use crate::config::AppConfig;
use self::metrics::{Meter, RecorderInstalled, METER_NAME, METER_VERSION};
use self::tracing::{console_tracer_provider, ACTIVITY_SOURCE_NAME, ACTIVITY_SOURCE_VERSION};

/// Errors raised while installing the telemetry stack.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),

    #[error(transparent)]
    Recorder(#[from] RecorderInstalled),
}

/// Process-wide telemetry handles.
pub struct Telemetry {
    pub meter: Meter,
    tracer_provider: Option<TracerProvider>,
}

impl Telemetry {
    /// Flush and stop the span exporter.
    pub fn shutdown(self) {
        let Some(provider) = self.tracer_provider else {
            return;
        };
        if let Err(error) = provider.shutdown() {
            ::tracing::warn!(error = %error, "Tracer provider shutdown failed");
        }
    }
}

/// Install the log subscriber, tracer provider and metrics recorder.
pub fn init(config: &AppConfig) -> Result<Telemetry, TelemetryError> {
    let tracer_provider = config
        .telemetry
        .console_traces
        .then(console_tracer_provider);
    logging::init_logging(&config.logging, &config.telemetry, tracer_provider.as_ref())?;
    if let Some(provider) = &tracer_provider {
        opentelemetry::global::set_tracer_provider(provider.clone());
    }

    let (meter, recorder) = Meter::new();
    metrics::install(recorder)?;

    ::tracing::info!(
        meter = METER_NAME,
        meter_version = METER_VERSION,
        activity_source = ACTIVITY_SOURCE_NAME,
        activity_source_version = ACTIVITY_SOURCE_VERSION,
        console_traces = config.telemetry.console_traces,
        console_metrics = config.telemetry.console_metrics,
        "Telemetry initialized"
    );

    Ok(Telemetry {
        meter,
        tracer_provider,
    })
}
