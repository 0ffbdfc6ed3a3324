//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::fmt;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Days, Local, NaiveDate};
use opentelemetry_sdk::export::trace::SpanData;
use opentelemetry_sdk::testing::trace::InMemorySpanExporter;
use opentelemetry_sdk::trace::TracerProvider;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower::ServiceExt;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Registry;

use observability_demo::config::{AppConfig, Environment};
use observability_demo::forecast::model::{MAX_TEMPERATURE_C, MIN_TEMPERATURE_C};
use observability_demo::forecast::{WeatherForecast, SUMMARIES};
use observability_demo::observability::metrics::Meter;
use observability_demo::observability::tracing::{trace_layer, tracer_provider};
use observability_demo::{HttpServer, Shutdown};

/// Seeded config for the given environment, bound to an ephemeral port.
pub fn test_config(environment: Environment) -> AppConfig {
    let mut config = AppConfig::default();
    config.environment = environment;
    config.server.bind_address = "127.0.0.1:0".to_string();
    config.forecast.seed = Some(7);
    config
}

/// Router plus the meter it increments.
pub fn build_app(config: AppConfig) -> (Router, Meter) {
    let meter = Meter::detached();
    let server = HttpServer::new(config, meter.clone());
    (server.router(), meter)
}

/// Issue a GET against the router and return status and body bytes.
pub async fn get(router: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

/// GET a forecast route and decode the records.
pub async fn get_forecasts(router: &Router, uri: &str) -> Vec<WeatherForecast> {
    let (status, body) = get(router, uri).await;
    assert_eq!(status, StatusCode::OK, "GET {uri}");
    serde_json::from_slice(&body).unwrap()
}

/// Serve the router on a real listener.
pub async fn start_server(config: AppConfig) -> (SocketAddr, Meter, Shutdown, JoinHandle<()>) {
    let listener = TcpListener::bind(&config.server.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let meter = Meter::detached();
    let server = HttpServer::new(config, meter.clone());
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    let handle = tokio::spawn(async move {
        server.run(listener, server_shutdown).await.unwrap();
    });

    (addr, meter, shutdown, handle)
}

/// Range and label checks on every record.
pub fn assert_valid_records(forecasts: &[WeatherForecast]) {
    for forecast in forecasts {
        assert!(
            (MIN_TEMPERATURE_C..=MAX_TEMPERATURE_C).contains(&forecast.temperature_c),
            "temperature {} out of range",
            forecast.temperature_c
        );
        assert!(SUMMARIES.contains(&forecast.summary.as_str()), "unknown summary {}", forecast.summary);
    }
}

/// Dates step by one day starting the day after `today`.
///
/// `today` is read before the request; a request straddling midnight may
/// start one day later.
pub fn assert_dates_from_tomorrow(batch: &[WeatherForecast], today: NaiveDate) {
    let first = batch[0].date;
    let tomorrow = today.checked_add_days(Days::new(1)).unwrap();
    let day_after = today.checked_add_days(Days::new(2)).unwrap();
    assert!(first == tomorrow || first == day_after, "batch starts at {first}");

    for pair in batch.windows(2) {
        assert_eq!(pair[1].date, pair[0].date.checked_add_days(Days::new(1)).unwrap());
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// A span the captured event was emitted in.
#[derive(Debug, Clone)]
pub struct CapturedSpan {
    pub name: String,
    pub fields: Vec<(String, String)>,
}

impl CapturedSpan {
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}

/// An event with its level, message and enclosing spans (root first).
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub message: String,
    pub spans: Vec<CapturedSpan>,
}

/// Layer that records every event.
#[derive(Debug, Clone, Default)]
pub struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl EventCapture {
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Vec<(String, String)>,
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields.push((field.name().to_string(), value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        } else {
            self.fields.push((field.name().to_string(), format!("{:?}", value)));
        }
    }
}

struct SpanFields(Vec<(String, String)>);

impl<S> Layer<S> for EventCapture
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        attrs.record(&mut visitor);
        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(SpanFields(visitor.fields));
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let spans = match ctx.event_scope(event) {
            Some(scope) => scope
                .from_root()
                .map(|span| {
                    let extensions = span.extensions();
                    let fields = extensions
                        .get::<SpanFields>()
                        .map(|f| f.0.clone())
                        .unwrap_or_default();
                    CapturedSpan {
                        name: span.name().to_string(),
                        fields,
                    }
                })
                .collect(),
            None => Vec::new(),
        };

        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message: visitor.message.unwrap_or_default(),
            spans,
        });
    }
}

/// In-memory trace pipeline for asserting on exported spans.
pub struct SpanCapture {
    exporter: InMemorySpanExporter,
    provider: TracerProvider,
}

impl SpanCapture {
    pub fn new() -> Self {
        let exporter = InMemorySpanExporter::default();
        let provider = tracer_provider(exporter.clone());
        Self { exporter, provider }
    }

    /// Subscriber exporting spans from `sources` into this capture.
    pub fn subscriber(&self, sources: &[&str]) -> impl Subscriber + Send + Sync + 'static {
        Registry::default().with(trace_layer(
            &self.provider,
            sources.iter().map(|s| s.to_string()).collect(),
        ))
    }

    /// Spans exported so far, in end order.
    pub fn finished_spans(&self) -> Vec<SpanData> {
        self.exporter.get_finished_spans().unwrap()
    }
}

/// String value of the attribute `key`.
pub fn attribute(span: &SpanData, key: &str) -> Option<String> {
    span.attributes
        .iter()
        .find(|kv| kv.key.as_str() == key)
        .map(|kv| kv.value.as_str().into_owned())
}
