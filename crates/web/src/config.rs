//! Web configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `WEB_DATABASE_URL` - `PostgreSQL` connection string
//! - `WEB_BASE_URL` - Public URL for the web API
//!
//! ## Optional
//! - `WEB_HOST` - Bind address (default: 127.0.0.1)
//! - `WEB_PORT` - Listen port (default: 3000)
//! - `WEB_CORS_ORIGIN` - Allowed browser origin for the SPA (default: `WEB_BASE_URL`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Web application configuration.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the API
    pub base_url: String,
    /// Browser origin allowed to call the API
    pub cors_origin: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

impl WebConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = SecretString::from(require_var("WEB_DATABASE_URL")?);

        let base_url = require_var("WEB_BASE_URL")?;
        Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("WEB_BASE_URL".to_string(), e.to_string())
        })?;

        let host: IpAddr = optional_var("WEB_HOST")
            .unwrap_or_else(|| "127.0.0.1".to_string())
            .parse()
            .map_err(|e: std::net::AddrParseError| {
                ConfigError::InvalidEnvVar("WEB_HOST".to_string(), e.to_string())
            })?;

        let port: u16 = optional_var("WEB_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidEnvVar("WEB_PORT".to_string(), e.to_string())
            })?;

        let cors_origin = optional_var("WEB_CORS_ORIGIN").unwrap_or_else(|| base_url.clone());

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            cors_origin,
            sentry_dsn: optional_var("SENTRY_DSN"),
            sentry_environment: optional_var("SENTRY_ENVIRONMENT"),
        })
    }

    /// The socket address to bind the server to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the deployment is served over HTTPS (secure cookies).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

/// Read a required environment variable.
fn require_var(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

/// Read an optional environment variable, treating empty values as unset.
fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> WebConfig {
        WebConfig {
            database_url: SecretString::from("postgres://localhost/shopsync"),
            host: "0.0.0.0".parse().unwrap(),
            port: 3000,
            base_url: "https://shopsync.app".to_string(),
            cors_origin: "https://shopsync.app".to_string(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[test]
    fn test_socket_addr() {
        assert_eq!(config().socket_addr().to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn test_is_secure() {
        assert!(config().is_secure());

        let mut insecure = config();
        insecure.base_url = "http://localhost:3000".to_string();
        assert!(!insecure.is_secure());
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingEnvVar("WEB_BASE_URL".to_string());
        assert_eq!(
            err.to_string(),
            "Missing environment variable: WEB_BASE_URL"
        );
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let debug = format!("{:?}", config());
        assert!(!debug.contains("postgres://localhost/shopsync"));
    }
}
