//! Score server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use game_server::logging::setup_logging;
use game_server::{AppState, ServerConfig, SystemClock, router};

/// How often abandoned sessions are swept.
const SESSION_SWEEP_PERIOD: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = ServerConfig::from_env().context("Failed to load server configuration")?;

    // Guards flush the file writers on drop; hold them until shutdown.
    let _log_guards = setup_logging(&config.log_dir).context("Failed to set up logging")?;

    let state = Arc::new(AppState::new(
        &config.service,
        config.leaders_rate_limit,
        config.signer,
        Arc::new(SystemClock),
    ));

    let sweeper = config
        .service
        .session_ttl
        .map(|_| state.service.sessions().spawn_sweeper(SESSION_SWEEP_PERIOD));

    let app = router(state.clone(), &config.static_dir);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;

    tracing::info!(
        addr = %config.bind,
        static_dir = %config.static_dir.display(),
        trusted = %state.service.trusted_identity(),
        "Score server ready"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    tracing::info!("Score server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
