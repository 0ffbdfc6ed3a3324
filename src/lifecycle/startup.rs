//! Startup orchestration.
//!
//! # Responsibilities
//! - Install telemetry before anything logs
//! - Start background tasks (console metrics exporter)
//! - Bind the listener and begin accepting traffic
//! - Fan the OS shutdown signal out to every task
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listener starts last (traffic only when ready)

use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::{self, metrics::ConsoleMetricsExporter};

/// Run the service until a shutdown signal arrives or the server stops.
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let telemetry = observability::init(&config)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        bind_address = %config.server.bind_address,
        request_timeout_secs = config.server.request_timeout_secs,
        seeded = config.forecast.seed.is_some(),
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();

    let exporter = config.telemetry.console_metrics.then(|| {
        let exporter = ConsoleMetricsExporter::new(
            telemetry.meter.clone(),
            Duration::from_secs(config.telemetry.metrics_export_interval_secs),
        );
        tokio::spawn(exporter.run(shutdown.subscribe()))
    });

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    let server = HttpServer::new(config, telemetry.meter.clone());
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    let served = supervise(server_task, signals::shutdown_signal(), &shutdown).await;

    if let Some(exporter) = exporter {
        exporter.await?;
    }
    telemetry.shutdown();
    served?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Wait for `signal` or for the server to stop on its own, whichever comes
/// first, then fan shutdown out to the remaining tasks.
pub async fn supervise<F>(
    mut server_task: JoinHandle<io::Result<()>>,
    signal: F,
    shutdown: &Shutdown,
) -> Result<(), AppError>
where
    F: Future<Output = ()>,
{
    let served = tokio::select! {
        _ = signal => {
            shutdown.trigger();
            server_task.await
        }
        result = &mut server_task => {
            tracing::error!("HTTP server exited before a shutdown signal");
            shutdown.trigger();
            result
        }
    };

    served??;
    Ok(())
}
