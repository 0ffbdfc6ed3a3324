//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, server span)
//!     → middleware/ (request metrics)
//!     → forecast.rs (endpoint behavior + telemetry)
//!     → JSON response
//! ```

pub mod docs;
pub mod forecast;
pub mod middleware;
pub mod request;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
