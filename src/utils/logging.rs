//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the MP Tourify backend.

use tracing::{info, warn, debug, error};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};
use uuid::Uuid;
use crate::config::LoggingConfig;
use crate::utils::errors::{TourifyError, Result};

/// Initialize logging based on configuration.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.level));

    let stdout_layer = if config.json {
        tracing_subscriber::fmt::layer().json().with_writer(std::io::stdout).boxed()
    } else {
        tracing_subscriber::fmt::layer().with_writer(std::io::stdout).boxed()
    };

    let (file_layer, guard) = match config.directory {
        Some(ref directory) => {
            let file_appender = tracing_appender::rolling::daily(directory, "tourify.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(non_blocking)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| TourifyError::Config(format!("Failed to initialize logging: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log admin panel mutations
pub fn log_admin_action(admin_id: Uuid, action: &str, target: Option<&str>, details: Option<&str>) {
    info!(
        admin_id = %admin_id,
        action = action,
        target = target,
        details = details,
        "Admin action performed"
    );
}

/// Log login/logout outcomes
pub fn log_auth_event(email: &str, action: &str, success: bool, details: Option<&str>) {
    if success {
        info!(
            email = email,
            action = action,
            details = details,
            "Authentication event: success"
        );
    } else {
        warn!(
            email = email,
            action = action,
            details = details,
            "Authentication event: failure"
        );
    }
}

/// Log a workflow status change
pub fn log_status_change(entity: &str, id: Uuid, from: &str, to: &str, actor: Uuid) {
    info!(
        entity = entity,
        id = %id,
        from = from,
        to = to,
        actor = %actor,
        "Status changed"
    );
}

/// Log database operations
pub fn log_database_operation(operation: &str, table: &str, duration_ms: u64, success: bool) {
    if success {
        debug!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation completed"
        );
    } else {
        error!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation failed"
        );
    }
}
