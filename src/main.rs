//! Observability demo
//!
//! ```text
//!     Client Request
//!     ───────────────▶ request id ─▶ server span ─▶ metrics ─▶ timeout ─▶ forecast handler
//!                                                                            │
//!                      ┌─────────────────────────────────────────────────────┤
//!                      ▼                      ▼                              ▼
//!               log scope + 3 events    Requests counter +1     parent span ─▶ 2 child spans
//!                      │                      │                              │
//!                      ▼                      ▼                              ▼
//!                 fmt layer (stdout)   console metrics exporter    OpenTelemetry stdout exporter
//! ```

use std::path::PathBuf;

use clap::Parser;

use observability_demo::config::{load_config, validate_config, AppConfig, ConfigError};
use observability_demo::lifecycle::startup;

#[derive(Parser)]
#[command(name = "observability-demo")]
#[command(about = "Weather forecast service demonstrating logs, metrics and traces", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Hosting environment (Development, Staging, Production).
    #[arg(short, long)]
    environment: Option<String>,

    /// Listener address, e.g. 127.0.0.1:8080.
    #[arg(short, long)]
    bind: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<AppConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => AppConfig::default(),
        };

        if let Some(environment) = self.environment {
            config.environment = environment.parse()?;
        }
        if let Some(bind) = self.bind {
            config.server.bind_address = bind;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;
    startup::run(config).await?;
    Ok(())
}
