//! Authentication and account error types.

use std::fmt;

use thiserror::Error;

/// Coarse failure category surfaced to callers.
///
/// Every [`AuthError`] maps to exactly one kind; the HTTP layer turns kinds
/// into status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Conflict,
    Unauthorized,
    Forbidden,
    NotFound,
    Invalid,
    Internal,
}

/// Unique field that caused a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictField {
    Username,
    Email,
}

impl fmt::Display for ConflictField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictField::Username => f.write_str("username"),
            ConflictField::Email => f.write_str("email"),
        }
    }
}

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Password hashing failed
    #[error("Password hashing failed")]
    HashingFailed,

    /// Token could not be signed
    #[error("Token encoding failed: {0}")]
    TokenEncoding(#[source] jsonwebtoken::errors::Error),

    /// Token expiry is outside the representable time range
    #[error("Token lifetime out of range")]
    TokenLifetime,

    /// Username or email already in use
    #[error("{0} already taken")]
    Conflict(ConflictField),

    /// Unknown username or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Bad signature, expired, wrong kind, malformed claims or unknown subject
    #[error("Could not validate credentials")]
    InvalidToken,

    /// Authenticated but not allowed
    #[error("Not enough permissions")]
    Forbidden,

    /// User not found
    #[error("User not found")]
    UserNotFound,

    /// Malformed input or failed precondition
    #[error("{0}")]
    Invalid(String),
}

impl AuthError {
    /// Shorthand for [`AuthError::Invalid`].
    pub fn invalid(reason: impl Into<String>) -> Self {
        AuthError::Invalid(reason.into())
    }

    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Conflict(_) => ErrorKind::Conflict,
            AuthError::InvalidCredentials | AuthError::InvalidToken => ErrorKind::Unauthorized,
            AuthError::Forbidden => ErrorKind::Forbidden,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::Invalid(_) => ErrorKind::Invalid,
            AuthError::Database(_)
            | AuthError::HashingFailed
            | AuthError::TokenEncoding(_)
            | AuthError::TokenLifetime => ErrorKind::Internal,
        }
    }

    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Internal failures collapse into one generic message so SQL and key
    /// material details never reach the caller.
    pub fn client_message(&self) -> String {
        match self.kind() {
            ErrorKind::Internal => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Translate unique-constraint violations into [`AuthError::Conflict`].
///
/// Covers the window between the uniqueness pre-check and the write, where a
/// concurrent writer may claim the same username or email.
pub(crate) fn map_unique_violation(err: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.is_unique_violation()
    {
        match db_err.constraint() {
            Some("users_username_key") => return AuthError::Conflict(ConflictField::Username),
            Some("users_email_key") => return AuthError::Conflict(ConflictField::Email),
            _ => {}
        }
    }
    AuthError::Database(err)
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
