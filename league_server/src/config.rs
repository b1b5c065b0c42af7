//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use league::db::DatabaseConfig;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Default listener when neither `--bind` nor `SERVER_BIND` is given
pub const DEFAULT_BIND: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8080);

/// Minimum admin key length accepted at startup
pub const MIN_ADMIN_KEY_LEN: usize = 16;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Shared secret for admin endpoints
    pub admin_api_key: String,
    /// Seconds between auto-close sweeps
    pub close_interval_secs: u64,
    /// Prometheus listener, disabled when unset
    pub metrics_bind: Option<SocketAddr>,
    /// Apply pending migrations on startup
    pub run_migrations: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// CLI overrides win over the environment.
    ///
    /// # Errors
    ///
    /// Returns error if `ADMIN_API_KEY` is missing or a present value cannot be parsed
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
        close_interval_override: Option<u64>,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_env_opt("SERVER_BIND")?.unwrap_or(DEFAULT_BIND),
        };

        let database_url = database_url_override
            .or_else(|| std::env::var("DATABASE_URL").ok())
            .unwrap_or_else(|| DatabaseConfig::development().database_url);

        let database = DatabaseConfig {
            database_url,
            max_connections: parse_env_or("DB_MAX_CONNECTIONS", 20),
            min_connections: parse_env_or("DB_MIN_CONNECTIONS", 2),
            connection_timeout_secs: parse_env_or("DB_CONNECTION_TIMEOUT_SECS", 10),
            idle_timeout_secs: parse_env_or("DB_IDLE_TIMEOUT_SECS", 600),
            max_lifetime_secs: parse_env_or("DB_MAX_LIFETIME_SECS", 1800),
        };

        let admin_api_key =
            std::env::var("ADMIN_API_KEY").map_err(|_| ConfigError::MissingRequired {
                var: "ADMIN_API_KEY".to_string(),
                hint: "Generate with: openssl rand -hex 16".to_string(),
            })?;

        let close_interval_secs = close_interval_override
            .unwrap_or_else(|| parse_env_or("CLOSE_INTERVAL_SECS", 60));

        Ok(ServerConfig {
            bind,
            database,
            admin_api_key,
            close_interval_secs,
            metrics_bind: parse_env_opt("METRICS_BIND")?,
            run_migrations: parse_env_or("RUN_MIGRATIONS", true),
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.admin_api_key.len() < MIN_ADMIN_KEY_LEN {
            return Err(ConfigError::Invalid {
                var: "ADMIN_API_KEY".to_string(),
                reason: format!("Must be at least {MIN_ADMIN_KEY_LEN} characters"),
            });
        }

        if self.close_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "CLOSE_INTERVAL_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Invalid {
                var: "DB_MIN_CONNECTIONS".to_string(),
                reason: format!(
                    "Cannot exceed DB_MAX_CONNECTIONS ({})",
                    self.database.max_connections
                ),
            });
        }

        if self.metrics_bind == Some(self.bind) {
            return Err(ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: format!("Must differ from SERVER_BIND ({})", self.bind),
            });
        }

        Ok(())
    }

    pub fn close_interval(&self) -> Duration {
        Duration::from_secs(self.close_interval_secs)
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Optional variable; present but unparsable is an error
fn parse_env_opt<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => {
            value
                .trim()
                .parse()
                .map(Some)
                .map_err(|e: T::Err| ConfigError::Invalid {
                    var: key.to_string(),
                    reason: e.to_string(),
                })
        }
        _ => Ok(None),
    }
}
