//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use chrono::Duration;
use std::net::SocketAddr;
use user_accounts::{
    AuthConfig, DatabaseConfig,
    auth::{
        HashingParams, JwtAlgorithm,
        config::{DEFAULT_ACCESS_TOKEN_MINUTES, DEFAULT_REFRESH_TOKEN_DAYS},
    },
};

/// Default listen address
pub const DEFAULT_BIND: SocketAddr = SocketAddr::new(
    std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
    8000,
);

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Token and password hashing configuration
    pub auth: AuthConfig,
    /// Origins allowed by CORS
    pub cors: CorsOrigins,
    /// Prometheus exporter address; metrics are disabled when unset
    pub metrics_bind: Option<SocketAddr>,
}

/// Allowed cross-origin callers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    Any,
    List(Vec<String>),
}

impl CorsOrigins {
    /// Parse a comma-separated origin list; `*` allows any origin
    pub fn parse(value: &str) -> Self {
        let origins: Vec<String> = value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        if origins.iter().any(|o| o == "*") {
            CorsOrigins::Any
        } else {
            CorsOrigins::List(origins)
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `database_url_override` - Optional database URL override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_env("SERVER_BIND")?.unwrap_or(DEFAULT_BIND),
        };

        // Database configuration
        let database_url = database_url_override
            .or_else(|| std::env::var("DATABASE_URL").ok())
            .unwrap_or_else(|| DatabaseConfig::development().database_url);

        let defaults = DatabaseConfig::with_url(database_url);
        let database = DatabaseConfig {
            max_connections: parse_env_or("DB_MAX_CONNECTIONS", defaults.max_connections),
            min_connections: parse_env_or("DB_MIN_CONNECTIONS", defaults.min_connections),
            connection_timeout_secs: parse_env_or(
                "DB_CONNECTION_TIMEOUT_SECS",
                defaults.connection_timeout_secs,
            ),
            idle_timeout_secs: parse_env_or("DB_IDLE_TIMEOUT_SECS", defaults.idle_timeout_secs),
            max_lifetime_secs: parse_env_or("DB_MAX_LIFETIME_SECS", defaults.max_lifetime_secs),
            ..defaults
        };

        // Security configuration (JWT_SECRET is required)
        let jwt_secret = std::env::var("JWT_SECRET").map_err(|_| ConfigError::MissingRequired {
            var: "JWT_SECRET".to_string(),
            hint: "Generate with: openssl rand -hex 32".to_string(),
        })?;

        let mut auth = AuthConfig::new(jwt_secret);
        if let Some(algorithm) = parse_env::<JwtAlgorithm>("JWT_ALGORITHM")? {
            auth.jwt_algorithm = algorithm;
        }
        auth.access_token_ttl = parse_ttl(
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            DEFAULT_ACCESS_TOKEN_MINUTES,
            Duration::try_minutes,
        )?;
        auth.refresh_token_ttl = parse_ttl(
            "REFRESH_TOKEN_EXPIRE_DAYS",
            DEFAULT_REFRESH_TOKEN_DAYS,
            Duration::try_days,
        )?;
        auth.password_pepper = std::env::var("PASSWORD_PEPPER").unwrap_or_default();

        let hashing = HashingParams::default();
        auth.hashing = HashingParams {
            memory_kib: parse_env_or("ARGON2_MEMORY_KIB", hashing.memory_kib),
            iterations: parse_env_or("ARGON2_ITERATIONS", hashing.iterations),
            parallelism: parse_env_or("ARGON2_PARALLELISM", hashing.parallelism),
        };

        let cors = std::env::var("CORS_ORIGINS")
            .map(|v| CorsOrigins::parse(&v))
            .unwrap_or(CorsOrigins::List(Vec::new()));

        let metrics_bind = parse_env("METRICS_BIND")?;

        Ok(ServerConfig {
            bind,
            database,
            auth,
            cors,
            metrics_bind,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.auth
            .validate()
            .map_err(|reason| ConfigError::Invalid {
                var: "auth".to_string(),
                reason,
            })?;

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid {
                var: "DB_MAX_CONNECTIONS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Invalid {
                var: "DB_MIN_CONNECTIONS".to_string(),
                reason: format!(
                    "Cannot exceed max connections ({})",
                    self.database.max_connections
                ),
            });
        }

        Ok(())
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

/// Parse an optional environment variable, rejecting unparsable values
fn parse_env<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Invalid {
                var: key.to_string(),
                reason: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

/// Parse a token lifetime, rejecting values chrono cannot represent
fn parse_ttl(
    key: &str,
    default: i64,
    to_duration: fn(i64) -> Option<Duration>,
) -> Result<Duration, ConfigError> {
    let value = parse_env::<i64>(key)?.unwrap_or(default);
    to_duration(value).ok_or_else(|| ConfigError::Invalid {
        var: key.to_string(),
        reason: format!("{value} is out of range"),
    })
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
