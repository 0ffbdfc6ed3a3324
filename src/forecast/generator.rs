//! Random forecast generation.
//!
//! # Responsibilities
//! - Produce `count` records dated today + 1 ..= today + count
//! - Draw temperature uniformly from [-20, 54] and summary uniformly from the labels
//!
//! # Design Decisions
//! - One RNG shared by all requests behind a mutex
//! - Seedable so tests and demos can reproduce output

use std::sync::{Mutex, PoisonError};

use chrono::{Days, Local, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::forecast::model::{WeatherForecast, MAX_TEMPERATURE_C, MIN_TEMPERATURE_C, SUMMARIES};

/// Number of records a single batch holds.
pub const BATCH_SIZE: usize = 5;

/// Thread-safe forecast generator.
pub struct ForecastGenerator {
    rng: Mutex<StdRng>,
}

impl ForecastGenerator {
    /// Generator with a reproducible sequence.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Generator seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Seeded when a seed is given, entropy otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    /// Generate `count` records starting tomorrow (local date).
    pub fn generate(&self, count: usize) -> Vec<WeatherForecast> {
        self.generate_from(Local::now().date_naive(), count)
    }

    /// Generate `count` records starting the day after `today`.
    pub fn generate_from(&self, today: NaiveDate, count: usize) -> Vec<WeatherForecast> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);

        (1..=count as u64)
            .map(|offset| {
                // Out of range only past year 262143.
                let date = today.checked_add_days(Days::new(offset)).unwrap_or(NaiveDate::MAX);
                let temperature_c = rng.gen_range(MIN_TEMPERATURE_C..=MAX_TEMPERATURE_C);
                let summary = SUMMARIES[rng.gen_range(0..SUMMARIES.len())];
                WeatherForecast::new(date, temperature_c, summary)
            })
            .collect()
    }
}

impl Default for ForecastGenerator {
    fn default() -> Self {
        Self::from_entropy()
    }
}
