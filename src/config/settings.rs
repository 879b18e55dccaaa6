//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: Option<StorageConfig>,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed to call the API with credentials. Empty means same-origin only.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Session and account configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub cookie_name: String,
    pub secure_cookie: bool,
    pub login_attempts_per_minute: u32,
    pub password_cost: u32,
    pub bootstrap_admin: Option<BootstrapAdminConfig>,
}

/// First admin account, created when the admins table is empty
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BootstrapAdminConfig {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Object storage configuration (Cloudinary-compatible upload API)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub base_url: String,
    pub cloud_name: String,
    pub upload_preset: String,
    pub folder: String,
    pub timeout_seconds: u64,
    pub max_file_size_mb: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: Option<String>,
    pub json: bool,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let defaults = config::Config::try_from(&Settings::default())?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("TOURIFY")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::TourifyError> {
        super::validation::validate_settings(self)
    }

    /// Socket address string the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                cors_origins: vec![],
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/tourify".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            auth: AuthConfig {
                jwt_secret: String::new(),
                token_ttl_hours: 24,
                cookie_name: "token".to_string(),
                secure_cookie: false,
                login_attempts_per_minute: 5,
                password_cost: bcrypt::DEFAULT_COST,
                bootstrap_admin: None,
            },
            storage: None,
            logging: LoggingConfig {
                level: "info".to_string(),
                directory: None,
                json: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.auth.cookie_name, "token");
        assert_eq!(settings.bind_address(), "0.0.0.0:8080");
        assert!(settings.storage.is_none());
    }
}
