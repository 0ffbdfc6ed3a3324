//! Distributed tracing support.
//!
//! # Responsibilities
//! - Own the OpenTelemetry tracer provider and its exporter (console, or in-memory for tests)
//! - Bridge `tracing` spans from registered sources into OpenTelemetry spans
//!
//! # Design Decisions
//! - Sources are `tracing` targets; only spans with a registered target are exported
//! - `otel.name` overrides the static span name, `otel.kind` the span kind
//! - Spans are exported as they end (simple processor), nothing is buffered

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::export::trace::SpanExporter;
use opentelemetry_sdk::trace::{Tracer, TracerProvider};
use tracing::{Metadata, Subscriber};
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::filter::Filtered;
use tracing_subscriber::layer::{Context, Filter, Layer};
use tracing_subscriber::registry::LookupSpan;

/// Target of every span the forecast handlers start.
pub const ACTIVITY_SOURCE_NAME: &str = "observability_demo::activity";

/// Version reported alongside the activity source.
pub const ACTIVITY_SOURCE_VERSION: &str = "1.0.0";

/// Target of the per-request HTTP server spans.
pub const HTTP_SOURCE_NAME: &str = "observability_demo::http";

/// Provider that hands every ended span to `exporter`.
pub fn tracer_provider<E>(exporter: E) -> TracerProvider
where
    E: SpanExporter + 'static,
{
    TracerProvider::builder()
        .with_simple_exporter(exporter)
        .build()
}

/// Provider writing ended spans to stdout.
pub fn console_tracer_provider() -> TracerProvider {
    tracer_provider(opentelemetry_stdout::SpanExporter::default())
}

/// Per-layer filter admitting only spans from registered sources.
#[derive(Debug, Clone)]
pub struct SourceFilter {
    sources: Vec<String>,
}

impl SourceFilter {
    pub fn new(sources: Vec<String>) -> Self {
        Self { sources }
    }

    fn matches(&self, metadata: &Metadata<'_>) -> bool {
        metadata.is_span()
            && self
                .sources
                .iter()
                .any(|source| source == metadata.target())
    }
}

impl<S> Filter<S> for SourceFilter {
    fn enabled(&self, metadata: &Metadata<'_>, _cx: &Context<'_, S>) -> bool {
        self.matches(metadata)
    }
}

/// OpenTelemetry layer on `provider`, restricted to spans whose target equals one of `sources`.
///
/// Spans outside the sources are invisible to the layer, so a source span
/// nested under one of them is parented to the nearest source ancestor.
pub fn trace_layer<S>(
    provider: &TracerProvider,
    sources: Vec<String>,
) -> Filtered<OpenTelemetryLayer<S, Tracer>, SourceFilter, S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let tracer = provider.tracer(ACTIVITY_SOURCE_NAME);
    Layer::<S>::with_filter(
        tracing_opentelemetry::layer().with_tracer(tracer),
        SourceFilter::new(sources),
    )
}
