//! # User Accounts
//!
//! User registration, credential verification, role-based authorization and
//! bearer token issuance.
//!
//! ## Core Modules
//!
//! - [`auth`]: Password hashing, token service, authentication flow and guards
//! - [`accounts`]: User model and account management flows
//! - [`db`]: Credential store (PostgreSQL and in-memory)
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use user_accounts::{AuthConfig, AuthManager, MemoryUserRepository};
//!
//! let config = AuthConfig::new("a-signing-secret-of-at-least-32-chars");
//! let auth = AuthManager::new(Arc::new(MemoryUserRepository::new()), &config).unwrap();
//! let token = auth.tokens().issue_access(1).unwrap();
//! assert_eq!(auth.tokens().verify(&token, None).unwrap().sub, "1");
//! ```

/// Account records and management.
pub mod accounts;
pub use accounts::{AccountManager, Role, User, UserId, UserResponse, UserUpdate};

/// Authentication and authorization.
pub mod auth;
pub use auth::{AuthConfig, AuthError, AuthManager, AuthResult, ErrorKind};

/// Credential store.
pub mod db;
pub use db::{Database, DatabaseConfig, MemoryUserRepository, PgUserRepository, UserRepository};
