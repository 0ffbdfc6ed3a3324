//! Synthetic weather forecast data.
//!
//! # Data Flow
//! ```text
//! handler
//!     → generator.rs (seeded or entropy RNG, today + i days)
//!     → model.rs (immutable WeatherForecast records)
//!     → serialized into the JSON response, then dropped
//! ```

pub mod generator;
pub mod model;

pub use generator::{ForecastGenerator, BATCH_SIZE};
pub use model::{WeatherForecast, SUMMARIES};
