//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{TourifyError, Result};
use super::Settings;

/// Minimum accepted length of the JWT signing secret
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_server_config(&settings.server)?;
    validate_database_config(&settings.database)?;
    validate_auth_config(&settings.auth)?;
    validate_logging_config(&settings.logging)?;

    if let Some(ref storage_config) = settings.storage {
        validate_storage_config(storage_config)?;
    }

    Ok(())
}

fn validate_server_config(config: &super::ServerConfig) -> Result<()> {
    if config.host.is_empty() {
        return Err(TourifyError::Config("Server host is required".to_string()));
    }

    if config.port == 0 {
        return Err(TourifyError::Config("Server port must be greater than 0".to_string()));
    }

    for origin in &config.cors_origins {
        url::Url::parse(origin).map_err(|e| {
            TourifyError::Config(format!("Invalid CORS origin {}: {}", origin, e))
        })?;
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(TourifyError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(TourifyError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(TourifyError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate session configuration
fn validate_auth_config(config: &super::AuthConfig) -> Result<()> {
    if config.jwt_secret.len() < MIN_JWT_SECRET_LEN {
        return Err(TourifyError::Config(format!(
            "JWT secret must be at least {} characters",
            MIN_JWT_SECRET_LEN
        )));
    }

    if config.token_ttl_hours <= 0 {
        return Err(TourifyError::Config(
            "Token TTL must be greater than 0".to_string()
        ));
    }

    if config.cookie_name.is_empty() {
        return Err(TourifyError::Config(
            "Cookie name is required".to_string()
        ));
    }

    if config.login_attempts_per_minute == 0 {
        return Err(TourifyError::Config(
            "Login attempts per minute must be greater than 0".to_string()
        ));
    }

    if !(4..=31).contains(&config.password_cost) {
        return Err(TourifyError::Config(
            "Password cost must be between 4 and 31".to_string()
        ));
    }

    if let Some(ref admin) = config.bootstrap_admin {
        if admin.email.is_empty() || admin.password.len() < 8 {
            return Err(TourifyError::Config(
                "Bootstrap admin needs an email and a password of at least 8 characters".to_string()
            ));
        }
    }

    Ok(())
}

/// Validate object storage configuration
fn validate_storage_config(config: &super::StorageConfig) -> Result<()> {
    url::Url::parse(&config.base_url)
        .map_err(|e| TourifyError::Config(format!("Invalid storage base URL: {}", e)))?;

    if config.cloud_name.is_empty() {
        return Err(TourifyError::Config(
            "Storage cloud name is required".to_string()
        ));
    }

    if config.upload_preset.is_empty() {
        return Err(TourifyError::Config(
            "Storage upload preset is required".to_string()
        ));
    }

    if config.timeout_seconds == 0 {
        return Err(TourifyError::Config(
            "Storage timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(TourifyError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(TourifyError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::{BootstrapAdminConfig, StorageConfig};

    fn valid_settings() -> Settings {
        let mut settings = Settings::default();
        settings.auth.jwt_secret = "x".repeat(MIN_JWT_SECRET_LEN);
        settings
    }

    #[test]
    fn test_valid_settings_pass() {
        assert!(validate_settings(&valid_settings()).is_ok());
    }

    #[test]
    fn test_short_jwt_secret_rejected() {
        let mut settings = valid_settings();
        settings.auth.jwt_secret = "short".to_string();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_pool_bounds() {
        let mut settings = valid_settings();
        settings.database.min_connections = 20;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut settings = valid_settings();
        settings.logging.level = "verbose".to_string();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_bootstrap_admin_password_length() {
        let mut settings = valid_settings();
        settings.auth.bootstrap_admin = Some(BootstrapAdminConfig {
            name: "Root".to_string(),
            email: "root@example.org".to_string(),
            password: "short".to_string(),
        });
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_storage_config() {
        let mut settings = valid_settings();
        settings.storage = Some(StorageConfig {
            base_url: "not a url".to_string(),
            cloud_name: "tourify".to_string(),
            upload_preset: "preset".to_string(),
            folder: "mp".to_string(),
            timeout_seconds: 30,
            max_file_size_mb: 20,
        });
        assert!(validate_settings(&settings).is_err());

        if let Some(storage) = settings.storage.as_mut() {
            storage.base_url = "https://api.cloudinary.com/v1_1".to_string();
        }
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_invalid_cors_origin() {
        let mut settings = valid_settings();
        settings.server.cors_origins = vec!["::nope".to_string()];
        assert!(validate_settings(&settings).is_err());
    }
}
