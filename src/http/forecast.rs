//! Weather forecast endpoints.
//!
//! Each endpoint returns random forecasts and demonstrates one telemetry
//! signal. The synchronous `forecast_with_*` functions hold the behavior and
//! take their telemetry handles explicitly; the async handlers only unpack
//! [`AppState`].

use axum::{extract::State, Json};

use crate::forecast::{ForecastGenerator, WeatherForecast, BATCH_SIZE};
use crate::http::server::AppState;
use crate::observability::metrics::Meter;
use crate::observability::tracing::ACTIVITY_SOURCE_NAME;

pub const LOGS_ROUTE: &str = "/WeatherForecast/GetWeatherForecastWithLogs";
pub const METRICS_ROUTE: &str = "/WeatherForecast/GetWeatherForecastWithMetrics";
pub const TRACING_ROUTE: &str = "/WeatherForecast/GetWeatherForecastWithTracing";

/// Label attached to every event emitted inside the logging scope.
pub const LOG_SCOPE: &str = "WeatherForecastController Scope";

/// Three log levels inside one scope, then one batch.
pub fn forecast_with_logs(forecasts: &ForecastGenerator) -> Vec<WeatherForecast> {
    let scope = tracing::info_span!("WeatherForecastController", scope = LOG_SCOPE);
    let _entered = scope.enter();

    tracing::info!("Get a weather forecast with logs");
    tracing::warn!("Get a weather forecast with logs");
    tracing::error!("Get a weather forecast with logs");

    forecasts.generate(BATCH_SIZE)
}

/// One counter increment, then one batch.
pub fn forecast_with_metrics(forecasts: &ForecastGenerator, meter: &Meter) -> Vec<WeatherForecast> {
    meter.requests().increment(1);

    forecasts.generate(BATCH_SIZE)
}

/// Parent span around two child spans, each producing one batch.
pub fn forecast_with_tracing(forecasts: &ForecastGenerator) -> Vec<WeatherForecast> {
    let activity = tracing::info_span!(
        target: ACTIVITY_SOURCE_NAME,
        "GetWeatherForecastWithTracing",
        Method = "GetWeatherForecastWithTracing",
    );

    let (first, second) = {
        let _entered = activity.enter();
        (
            generate_traced(forecasts, "Get WeatherForecast (1)"),
            generate_traced(forecasts, "Get WeatherForecast (2)"),
        )
    };
    // Closes the parent span; both children are already closed.
    drop(activity);

    [first, second].concat()
}

fn generate_traced(forecasts: &ForecastGenerator, activity_name: &str) -> Vec<WeatherForecast> {
    let activity = tracing::info_span!(
        target: ACTIVITY_SOURCE_NAME,
        "generate_weather_forecast",
        otel.name = activity_name,
    );
    let _entered = activity.enter();

    forecasts.generate(BATCH_SIZE)
}

pub async fn get_with_logs(State(state): State<AppState>) -> Json<Vec<WeatherForecast>> {
    Json(forecast_with_logs(&state.forecasts))
}

pub async fn get_with_metrics(State(state): State<AppState>) -> Json<Vec<WeatherForecast>> {
    Json(forecast_with_metrics(&state.forecasts, &state.meter))
}

pub async fn get_with_tracing(State(state): State<AppState>) -> Json<Vec<WeatherForecast>> {
    Json(forecast_with_tracing(&state.forecasts))
}
