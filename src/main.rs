//! MP Tourify backend
//!
//! Main application entry point

use std::time::Duration;
use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use mp_tourify::{
    config::Settings,
    create_router,
    database::{create_pool, run_migrations, PoolConfig},
    utils::logging,
    AppState,
};

/// How often idle login rate-limit buckets are dropped
const LIMITER_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("Failed to load configuration")?;
    settings.validate()?;

    // Initialize logging; the guard flushes the file writer on exit
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", mp_tourify::info());

    info!("Connecting to database...");
    let pool = create_pool(&PoolConfig::from(&settings.database)).await?;
    run_migrations(&pool).await?;

    let bind_address = settings.bind_address();
    let state = AppState::new(pool, settings)?;

    if let Some(admin) = state.services.auth_service.bootstrap_admin().await? {
        info!(email = %admin.email, "Created initial admin account");
    }

    if !state.services.media_service.storage().is_enabled() {
        warn!("Object storage is not configured; uploads are disabled");
    }

    let limiter = state.services.auth_service.login_limiter();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(LIMITER_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            limiter.cleanup();
        }
    });

    let app = create_router(state);
    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    info!("Listening on {}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("MP Tourify has been shut down.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "Failed to install signal handler");
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
}
