//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, server span, metrics, timeout)
//! - Mount Swagger in Development and `/metrics` when enabled
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::forecast::ForecastGenerator;
use crate::http::forecast::{self, LOGS_ROUTE, METRICS_ROUTE, TRACING_ROUTE};
use crate::http::middleware;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, RecordStatus, RequestSpan};
use crate::http::docs;
use crate::observability::metrics::Meter;

/// Prometheus scrape route.
pub const METRICS_ROUTE_PATH: &str = "/metrics";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forecasts: Arc<ForecastGenerator>,
    pub meter: Meter,
}

/// HTTP server for the forecast endpoints.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and meter.
    pub fn new(config: AppConfig, meter: Meter) -> Self {
        let state = AppState {
            forecasts: Arc::new(ForecastGenerator::new(config.forecast.seed)),
            meter,
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(config: &AppConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route(LOGS_ROUTE, get(forecast::get_with_logs))
            .route(METRICS_ROUTE, get(forecast::get_with_metrics))
            .route(TRACING_ROUTE, get(forecast::get_with_tracing));

        if config.environment.is_development() {
            router = router.merge(docs::routes());
        }

        if config.telemetry.prometheus_enabled {
            router = router.route(METRICS_ROUTE_PATH, get(render_metrics));
        }

        router.with_state(state).layer(
            ServiceBuilder::new()
                .layer(set_request_id_layer())
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(RequestSpan)
                        .on_response(RecordStatus),
                )
                .layer(propagate_request_id_layer())
                .layer(axum::middleware::from_fn(middleware::track_metrics))
                .layer(timeout_layer(config)),
        )
    }

    /// A clone of the router, for in-process requests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            environment = %self.config.environment,
            swagger = self.config.environment.is_development(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

async fn render_metrics(State(state): State<AppState>) -> String {
    state.meter.render()
}

/// Requests running past the configured timeout end with 408.
fn timeout_layer(config: &AppConfig) -> TimeoutLayer {
    TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        Duration::from_secs(config.server.request_timeout_secs),
    )
}
