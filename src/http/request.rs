//! Request identification and the per-request server span.
//!
//! # Responsibilities
//! - Generate a UUID v4 request ID when the client sends none
//! - Echo the request ID on the response
//! - Open one server span per request on the HTTP instrumentation source
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Span named after the matched route template, not the raw path

use std::time::Duration;

use axum::extract::MatchedPath;
use axum::http::{Request, Response};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{MakeSpan, OnResponse};
use tracing::Span;

use crate::observability::tracing::HTTP_SOURCE_NAME;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Sets `x-request-id` on incoming requests that lack one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

/// Copies `x-request-id` from the request onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

/// Route template when matched, raw path otherwise.
pub fn route_of<B>(request: &Request<B>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string())
}

/// Builds the server span for each request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestSpan;

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        let request_id = request
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown");
        let route = route_of(request);
        let display_name = format!("{} {}", request.method(), route);

        tracing::info_span!(
            target: HTTP_SOURCE_NAME,
            "http_request",
            otel.name = %display_name,
            otel.kind = "server",
            http.request.method = %request.method(),
            http.route = %route,
            request_id = %request_id,
            http.response.status_code = tracing::field::Empty,
        )
    }
}

/// Records the status code on the server span.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordStatus;

impl<B> OnResponse<B> for RecordStatus {
    fn on_response(self, response: &Response<B>, latency: Duration, span: &Span) {
        span.record("http.response.status_code", response.status().as_u16());
        tracing::debug!(
            status = %response.status(),
            latency_ms = latency.as_millis() as u64,
            "Request finished"
        );
    }
}
