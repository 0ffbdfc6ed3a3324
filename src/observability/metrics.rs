//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Own the process-wide metrics recorder and the instruments registered on it
//! - Record per-request HTTP server metrics
//! - Export the recorder to the console on an interval
//!
//! # Metrics
//! - `Requests` (counter): calls to the metrics endpoint, labelled with the meter name
//! - `http_server_requests_total` (counter): requests by method, route, status
//! - `http_server_request_duration_seconds` (histogram): latency distribution
//!
//! # Design Decisions
//! - Instruments are created once at startup and passed around as handles
//! - Low-overhead metric updates (atomic operations)
//! - Rendering uses the Prometheus text format for both console and `/metrics`

use std::time::{Duration, Instant};

use metrics::{Counter, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
use tokio::sync::broadcast;
use tokio::time;

/// Name of the meter that owns the demo instruments.
pub const METER_NAME: &str = "observability_demo";

/// Version reported alongside the meter.
pub const METER_VERSION: &str = "v1.0";

/// Counter incremented once per call to the metrics endpoint.
pub const REQUESTS_COUNTER: &str = "Requests";

const HTTP_REQUESTS_TOTAL: &str = "http_server_requests_total";
const HTTP_REQUEST_DURATION: &str = "http_server_request_duration_seconds";

/// Error returned when a global recorder is already installed.
#[derive(Debug, thiserror::Error)]
#[error("a global metrics recorder is already installed")]
pub struct RecorderInstalled;

/// Handles to the process-wide instruments.
///
/// Cloning is cheap; every clone increments the same counter.
#[derive(Clone)]
pub struct Meter {
    handle: PrometheusHandle,
    requests: Counter,
}

impl Meter {
    /// Build a fresh recorder and register the meter's instruments on it.
    ///
    /// The recorder is returned so the caller decides whether it becomes the
    /// global recorder. The meter keeps working either way.
    pub fn new() -> (Self, PrometheusRecorder) {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        let requests = metrics::with_local_recorder(&recorder, || {
            metrics::describe_counter!(
                REQUESTS_COUNTER,
                Unit::Count,
                "Calls to the metrics-scoped forecast endpoint"
            );
            metrics::counter!(
                REQUESTS_COUNTER,
                "meter" => METER_NAME,
                "meter_version" => METER_VERSION
            )
        });

        (Self { handle, requests }, recorder)
    }

    /// Meter whose recorder is not installed globally.
    pub fn detached() -> Self {
        Self::new().0
    }

    /// The `Requests` counter.
    pub fn requests(&self) -> &Counter {
        &self.requests
    }

    /// Render every registered metric in the Prometheus text format.
    pub fn render(&self) -> String {
        self.handle.render()
    }

    /// Current value of the counter `name`, summed over its label sets.
    pub fn counter_value(&self, name: &str) -> Option<u64> {
        parse_counter(&self.render(), name)
    }

    /// Drain histogram buckets that are due for upkeep.
    pub fn run_upkeep(&self) {
        self.handle.run_upkeep();
    }
}

/// Install `recorder` as the process-wide recorder.
pub fn install(recorder: PrometheusRecorder) -> Result<(), RecorderInstalled> {
    metrics::set_global_recorder(recorder).map_err(|_| RecorderInstalled)
}

/// Record one handled HTTP request.
pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!(HTTP_REQUESTS_TOTAL, &labels).increment(1);
    metrics::histogram!(HTTP_REQUEST_DURATION, &labels).record(start.elapsed().as_secs_f64());
}

fn parse_counter(rendered: &str, name: &str) -> Option<u64> {
    let mut total = None;
    for line in rendered.lines() {
        if line.starts_with('#') {
            continue;
        }
        let metric = line.split(['{', ' ']).next().unwrap_or_default();
        if metric != name && metric.strip_suffix("_total") != Some(name) {
            continue;
        }
        let Some(value) = line
            .rsplit(' ')
            .next()
            .and_then(|v| v.parse::<f64>().ok())
        else {
            continue;
        };
        *total.get_or_insert(0) += value as u64;
    }
    total
}

/// Periodically writes the rendered metrics to stdout.
pub struct ConsoleMetricsExporter {
    meter: Meter,
    interval: Duration,
}

impl ConsoleMetricsExporter {
    pub fn new(meter: Meter, interval: Duration) -> Self {
        Self { meter, interval }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            meter = METER_NAME,
            interval_secs = self.interval.as_secs(),
            "Console metrics exporter starting"
        );

        let mut ticker = time::interval(self.interval);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.export();
                }
                _ = shutdown.recv() => {
                    // Flush once more so the last interval is not lost.
                    self.export();
                    tracing::info!("Console metrics exporter received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    fn export(&self) {
        self.meter.run_upkeep();
        println!("Export {} (meter {} {})", chrono::Utc::now().to_rfc3339(), METER_NAME, METER_VERSION);
        println!("{}", self.meter.render());
    }
}
