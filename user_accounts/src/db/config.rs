//! Database configuration module.
//!
//! Provides configuration structures for database connection management.

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub database_url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Connection timeout in seconds
    pub connection_timeout_secs: u64,

    /// Idle connection timeout in seconds
    pub idle_timeout_secs: u64,

    /// Maximum connection lifetime in seconds
    pub max_lifetime_secs: u64,
}

impl DatabaseConfig {
    /// Default pool settings for the given connection URL
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: 10,
            min_connections: 1,
            connection_timeout_secs: 5,
            idle_timeout_secs: 300,
            max_lifetime_secs: 1800,
        }
    }

    /// Create a default configuration for development
    ///
    /// Uses `postgres://postgres@localhost/user_accounts` as the database URL
    pub fn development() -> Self {
        Self::with_url("postgres://postgres@localhost/user_accounts")
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::development()
    }
}
