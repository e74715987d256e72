//! workq daemon - Main Entry Point
//! Serves one shared queue over JSON-RPC

mod config;

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::{DaemonConfig, LogFormat};
use workq_api_rpc::RpcServer;
use workq_core::application::worker::{shutdown_channel, ShutdownToken};
use workq_core::WorkQueue;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn init_logging(format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("workq=info"))?;

    match format {
        LogFormat::Json => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .try_init()?;
        }
        LogFormat::Pretty => {
            // Development: Pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .try_init()?;
        }
    }
    Ok(())
}

/// Log a queue report every `interval` until shutdown
async fn report_loop(queue: Arc<WorkQueue>, interval: Duration, mut shutdown: ShutdownToken) {
    let mut ticker = tokio::time::interval(interval);
    // The first tick completes immediately.
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                queue.report();
            }
            _ = shutdown.wait() => break,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration
    let config = DaemonConfig::from_env()?;

    // 2. Initialize logging
    init_logging(config.log_format)?;

    info!("workq daemon v{} starting...", VERSION);

    // 3. Shared queue
    let queue = Arc::new(WorkQueue::new());

    // 4. Start JSON-RPC server
    let rpc_server = RpcServer::new(config.rpc.clone(), Arc::clone(&queue));
    let (addr, rpc_handle) = rpc_server
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    // 5. Periodic reports
    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let report_handle = config.report_interval.map(|interval| {
        info!(interval_secs = interval.as_secs(), "Starting queue reports");
        tokio::spawn(report_loop(Arc::clone(&queue), interval, shutdown_rx))
    });

    info!(addr = %addr, "System ready. Waiting for jobs...");
    info!("Press Ctrl+C to shutdown");

    // 6. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    // 7. Graceful shutdown
    shutdown_tx.shutdown();
    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    rpc_handle.stopped().await;
    if let Some(handle) = report_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
    }

    let report = queue.report();
    info!(submitted = report.submitted, "Shutdown complete.");

    Ok(())
}
