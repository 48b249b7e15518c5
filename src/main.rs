//! Cache Scheduler - server binary
//!
//! Serves the cache and job scheduler over HTTP.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cache_scheduler::api::create_router;
use cache_scheduler::{AppState, BackgroundTasks, Config};

/// Upper bound on waiting for the job in flight during shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Main entry point for the cache scheduler server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create cache store and job scheduler, register built-in jobs
/// 4. Start the job processor and background maintenance tasks
/// 5. Start HTTP server on configured port
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cache_scheduler=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cache scheduler server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: max_entries={}, max_size_bytes={}, default_ttl={}s, port={}, cleanup_interval={}s",
        config.max_entries,
        config.max_size_bytes,
        config.default_ttl,
        config.server_port,
        config.cleanup_interval
    );
    info!(
        "Job settings: tick={}ms, backoff={}ms, max_retries={}, timeout={:?}, policy={:?}",
        config.job_tick_interval_ms,
        config.job_retry_backoff_ms,
        config.job_max_retries,
        config.job_timeout_ms,
        config.job_dispatch_policy
    );

    let state = AppState::from_config(&config).await;
    state.scheduler.start().await;

    let tasks = BackgroundTasks::spawn(&config, state.cache.clone(), state.scheduler.clone());
    info!("{} background tasks started", tasks.len());

    let scheduler = state.scheduler.clone();
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tasks.stop();
    if tokio::time::timeout(SHUTDOWN_GRACE, scheduler.stop())
        .await
        .is_err()
    {
        warn!("Job in flight did not finish within {:?}", SHUTDOWN_GRACE);
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
