use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use cirelay_db::{EventRepository, FileEventStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cirelay_api::config::ServerConfig;
use cirelay_api::router::build_app_router;
use cirelay_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cirelay_api=debug,cirelay_events=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env().context("Invalid configuration")?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        events_file = %config.events_file.display(),
        ingest_mode = %config.ingest_mode,
        forward_enabled = config.forward_url.is_some(),
        slack_configured = config.slack_webhook_url.is_some(),
        "Loaded server configuration"
    );

    // --- Event store ---
    let store: Arc<dyn EventRepository> = Arc::new(FileEventStore::new(&config.events_file));
    match store.load().await {
        Ok(events) => tracing::info!(stored = events.len(), "Event store opened"),
        Err(e) => tracing::error!(
            error = %e,
            "Event store unreadable; queries and appends will fail until it is repaired"
        ),
    }

    // --- App state ---
    let state = AppState::new(config.clone(), store).context("Failed to build application state")?;
    let tasks = state.tasks.clone();

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().context("Invalid HOST address")?,
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // --- Drain deferred appends ---
    tracing::info!(pending = tasks.len(), "Server stopped accepting connections, draining");
    tasks.close();
    let drain_timeout = Duration::from_secs(config.shutdown_timeout_secs);
    if tokio::time::timeout(drain_timeout, tasks.wait()).await.is_err() {
        tracing::warn!(
            pending = tasks.len(),
            "Shutdown timeout elapsed, pending deferred appends are lost"
        );
    }

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
