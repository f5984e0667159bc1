//! Authentication module providing registration, login, and token management.
//!
//! This module implements:
//! - Argon2id password hashing with an optional server-side pepper
//! - Signed JWT access tokens (180-minute default expiry)
//! - Refresh tokens rotated on every refresh (60-day default expiry)
//! - Role and ownership guards for protected operations
//!
//! Tokens are verified statelessly, so logging out is advisory: an issued
//! token remains valid until it expires.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use user_accounts::auth::{AuthConfig, AuthManager, LoginRequest, RegisterRequest};
//! use user_accounts::db::{Database, DatabaseConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&DatabaseConfig::development()).await?;
//!     db.migrate().await?;
//!
//!     let config = AuthConfig::new("change-me-to-a-long-random-signing-secret");
//!     let auth = AuthManager::new(Arc::new(db.users()), &config)?;
//!
//!     let user = auth
//!         .register(RegisterRequest {
//!             username: "bob".to_string(),
//!             email: "bob@example.com".to_string(),
//!             password: "secret1".to_string(),
//!             role: None,
//!             is_approved: None,
//!         })
//!         .await?;
//!
//!     let session = auth
//!         .login(LoginRequest {
//!             username: user.username,
//!             password: "secret1".to_string(),
//!         })
//!         .await?;
//!     println!("access token: {}", session.access_token);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod errors;
pub mod guard;
pub mod manager;
pub mod models;
pub mod password;
pub mod tokens;
pub mod validation;

pub use config::{AuthConfig, HashingParams};
pub use jsonwebtoken::Algorithm as JwtAlgorithm;
pub use errors::{AuthError, AuthResult, ConflictField, ErrorKind};
pub use guard::{require_owner, require_owner_or_role, require_role};
pub use manager::AuthManager;
pub use models::{
    ChangePasswordRequest, LoginRequest, LoginResponse, RefreshResponse, RegisterRequest,
    SessionTokens, TokenClaims, TokenKind,
};
pub use password::PasswordHasher;
pub use tokens::TokenService;
