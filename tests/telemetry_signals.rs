//! Telemetry emitted by each endpoint.

use opentelemetry::trace::{SpanId, SpanKind};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

use observability_demo::config::Environment;
use observability_demo::forecast::ForecastGenerator;
use observability_demo::http::forecast::{
    forecast_with_logs, forecast_with_metrics, forecast_with_tracing, LOG_SCOPE, TRACING_ROUTE,
};
use observability_demo::observability::metrics::{Meter, REQUESTS_COUNTER};
use observability_demo::observability::tracing::{ACTIVITY_SOURCE_NAME, HTTP_SOURCE_NAME};

mod common;

const LOG_MESSAGE: &str = "Get a weather forecast with logs";

#[test]
fn test_logs_emit_three_levels_inside_one_scope() {
    let capture = common::EventCapture::default();
    let subscriber = Registry::default().with(capture.clone());
    let generator = ForecastGenerator::seeded(1);

    let forecasts = tracing::subscriber::with_default(subscriber, || forecast_with_logs(&generator));
    assert_eq!(forecasts.len(), 5);

    let events = capture.events();
    let levels: Vec<Level> = events.iter().map(|e| e.level).collect();
    assert_eq!(levels, vec![Level::INFO, Level::WARN, Level::ERROR]);

    for event in &events {
        assert_eq!(event.message, LOG_MESSAGE);
        assert_eq!(event.spans.len(), 1);
        assert_eq!(event.spans[0].name, "WeatherForecastController");
        assert_eq!(event.spans[0].field("scope"), Some(LOG_SCOPE));
    }
}

#[test]
fn test_logs_scope_is_not_exported_as_a_trace() {
    let capture = common::SpanCapture::new();
    let generator = ForecastGenerator::seeded(1);

    tracing::subscriber::with_default(
        capture.subscriber(&[ACTIVITY_SOURCE_NAME, HTTP_SOURCE_NAME]),
        || forecast_with_logs(&generator),
    );

    assert!(capture.finished_spans().is_empty());
}

#[test]
fn test_metrics_increment_exactly_once_per_call() {
    let meter = Meter::detached();
    let generator = ForecastGenerator::seeded(1);

    for _ in 0..10 {
        assert_eq!(forecast_with_metrics(&generator, &meter).len(), 5);
    }

    assert_eq!(meter.counter_value(REQUESTS_COUNTER), Some(10));
}

#[test]
fn test_tracing_children_close_before_parent() {
    let capture = common::SpanCapture::new();
    let generator = ForecastGenerator::seeded(1);

    let forecasts = tracing::subscriber::with_default(capture.subscriber(&[ACTIVITY_SOURCE_NAME]), || {
        forecast_with_tracing(&generator)
    });
    assert_eq!(forecasts.len(), 10);

    let spans = capture.finished_spans();
    let names: Vec<&str> = spans.iter().map(|s| s.name.as_ref()).collect();
    assert_eq!(
        names,
        vec!["Get WeatherForecast (1)", "Get WeatherForecast (2)", "GetWeatherForecastWithTracing"]
    );

    let parent = &spans[2];
    assert_eq!(parent.parent_span_id, SpanId::INVALID);
    assert_eq!(parent.span_kind, SpanKind::Internal);
    assert_eq!(
        common::attribute(parent, "Method").as_deref(),
        Some("GetWeatherForecastWithTracing")
    );

    for child in &spans[..2] {
        assert_eq!(child.parent_span_id, parent.span_context.span_id());
        assert_eq!(child.span_context.trace_id(), parent.span_context.trace_id());
        assert_eq!(child.span_kind, SpanKind::Internal);
        assert!(child.start_time >= parent.start_time);
        assert!(child.end_time <= parent.end_time);
    }
    assert!(spans[1].start_time >= spans[0].end_time);
}

#[test]
fn test_each_call_starts_a_new_trace() {
    let capture = common::SpanCapture::new();
    let generator = ForecastGenerator::seeded(1);

    tracing::subscriber::with_default(capture.subscriber(&[ACTIVITY_SOURCE_NAME]), || {
        forecast_with_tracing(&generator);
        forecast_with_tracing(&generator);
    });

    let spans = capture.finished_spans();
    assert_eq!(spans.len(), 6);
    assert_ne!(spans[2].span_context.trace_id(), spans[5].span_context.trace_id());
}

#[tokio::test]
async fn test_http_request_span_parents_the_activity() {
    let capture = common::SpanCapture::new();
    let _guard = tracing::subscriber::set_default(
        capture.subscriber(&[ACTIVITY_SOURCE_NAME, HTTP_SOURCE_NAME]),
    );

    let (router, _) = common::build_app(common::test_config(Environment::Production));
    let forecasts = common::get_forecasts(&router, TRACING_ROUTE).await;
    assert_eq!(forecasts.len(), 10);

    let spans = capture.finished_spans();
    assert_eq!(spans.len(), 4);

    let server = &spans[3];
    assert_eq!(server.span_kind, SpanKind::Server);
    assert_eq!(server.name, format!("GET {}", TRACING_ROUTE));
    assert_eq!(
        common::attribute(server, "http.response.status_code").as_deref(),
        Some("200")
    );

    let activity = &spans[2];
    assert_eq!(activity.name, "GetWeatherForecastWithTracing");
    assert_eq!(activity.parent_span_id, server.span_context.span_id());
    assert!(spans
        .iter()
        .all(|s| s.span_context.trace_id() == server.span_context.trace_id()));
}
