//! Observability demo service.
//!
//! Three forecast endpoints, each illustrating one telemetry signal:
//! scoped structured logs, a counter instrument, and nested tracing spans.

pub mod config;
pub mod error;
pub mod forecast;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::AppConfig;
pub use error::AppError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
