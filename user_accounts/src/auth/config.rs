//! Authentication configuration.
//!
//! Loaded once at startup and handed to [`TokenService`](super::TokenService)
//! and [`PasswordHasher`](super::PasswordHasher) at construction.

use std::fmt;

use chrono::Duration;
use jsonwebtoken::Algorithm;

/// Default access token lifetime in minutes
pub const DEFAULT_ACCESS_TOKEN_MINUTES: i64 = 180;

/// Default refresh token lifetime in days
pub const DEFAULT_REFRESH_TOKEN_DAYS: i64 = 60;

/// Longest accepted token lifetime, in days
pub const MAX_TOKEN_TTL_DAYS: i64 = 3650;

/// Minimum accepted JWT secret length
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Minimum accepted pepper length, when a pepper is configured
pub const MIN_PEPPER_LEN: usize = 16;

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingParams {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for HashingParams {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

/// Token and password hashing configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// Secret key for JWT signing
    pub jwt_secret: String,
    /// HMAC signing algorithm
    pub jwt_algorithm: Algorithm,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    /// Server-side pepper appended to passwords before hashing; empty disables it
    pub password_pepper: String,
    pub hashing: HashingParams,
}

impl AuthConfig {
    /// Configuration with default algorithm, lifetimes and hashing cost.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            jwt_algorithm: Algorithm::HS256,
            access_token_ttl: Duration::minutes(DEFAULT_ACCESS_TOKEN_MINUTES),
            refresh_token_ttl: Duration::days(DEFAULT_REFRESH_TOKEN_DAYS),
            password_pepper: String::new(),
            hashing: HashingParams::default(),
        }
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns a description of the first offending setting.
    pub fn validate(&self) -> Result<(), String> {
        if !matches!(
            self.jwt_algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(format!(
                "JWT algorithm {:?} is not supported, use HS256, HS384 or HS512",
                self.jwt_algorithm
            ));
        }

        if self.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(format!(
                "JWT secret must be at least {MIN_JWT_SECRET_LEN} characters"
            ));
        }

        if !self.password_pepper.is_empty() && self.password_pepper.len() < MIN_PEPPER_LEN {
            return Err(format!(
                "Password pepper must be at least {MIN_PEPPER_LEN} characters"
            ));
        }

        if self.access_token_ttl <= Duration::zero() {
            return Err("Access token lifetime must be positive".to_string());
        }

        if self.refresh_token_ttl <= Duration::zero() {
            return Err("Refresh token lifetime must be positive".to_string());
        }

        let max_ttl = Duration::days(MAX_TOKEN_TTL_DAYS);
        if self.access_token_ttl > max_ttl || self.refresh_token_ttl > max_ttl {
            return Err(format!(
                "Token lifetimes must not exceed {MAX_TOKEN_TTL_DAYS} days"
            ));
        }

        argon2::Params::new(
            self.hashing.memory_kib,
            self.hashing.iterations,
            self.hashing.parallelism,
            None,
        )
        .map_err(|e| format!("Invalid Argon2 parameters: {e}"))?;

        Ok(())
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("password_pepper", &"<redacted>")
            .field("hashing", &self.hashing)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> AuthConfig {
        AuthConfig::new("k".repeat(32))
    }

    #[test]
    fn defaults_match_documented_lifetimes() {
        let config = valid();
        assert_eq!(config.access_token_ttl, Duration::minutes(180));
        assert_eq!(config.refresh_token_ttl, Duration::days(60));
        assert_eq!(config.jwt_algorithm, Algorithm::HS256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_short_secret() {
        let config = AuthConfig::new("short");
        assert!(config.validate().unwrap_err().contains("JWT secret"));
    }

    #[test]
    fn rejects_asymmetric_algorithm() {
        let mut config = valid();
        config.jwt_algorithm = Algorithm::RS256;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_short_pepper_but_allows_none() {
        let mut config = valid();
        config.password_pepper = "tiny".to_string();
        assert!(config.validate().is_err());
        config.password_pepper.clear();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_ttl() {
        let mut config = valid();
        config.access_token_ttl = Duration::zero();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_oversized_ttl() {
        let mut config = valid();
        config.refresh_token_ttl = Duration::days(100_000_000);
        assert!(config.validate().unwrap_err().contains("must not exceed"));

        config.refresh_token_ttl = Duration::days(MAX_TOKEN_TTL_DAYS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn debug_redacts_secrets() {
        let mut config = valid();
        config.password_pepper = "pepper-pepper-pepper".to_string();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains(&config.jwt_secret));
        assert!(!rendered.contains("pepper-pepper"));
    }
}
