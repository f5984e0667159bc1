//! Authentication data models.

use serde::{Deserialize, Serialize};

use crate::accounts::{Role, UserId};

/// Value of the `type` claim carried by refresh tokens
pub const REFRESH_TOKEN_TYPE: &str = "refresh";

/// Token type reported to clients alongside issued tokens
pub const BEARER_TOKEN_TYPE: &str = "bearer";

/// Kind of bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims shared by access and refresh tokens
///
/// Access tokens omit `type`; refresh tokens carry `type: "refresh"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,           // User ID
    pub exp: i64,              // Expiration timestamp
    #[serde(default)]
    pub iat: i64,              // Issued at timestamp
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl TokenClaims {
    /// Kind implied by the `type` claim.
    ///
    /// `None` when a `type` claim is present but is not a recognized marker.
    pub fn kind(&self) -> Option<TokenKind> {
        match self.token_type.as_deref() {
            None => Some(TokenKind::Access),
            Some(REFRESH_TOKEN_TYPE) => Some(TokenKind::Refresh),
            Some(_) => None,
        }
    }

    /// Subject parsed as a user id.
    pub fn user_id(&self) -> Option<UserId> {
        self.sub.parse().ok()
    }
}

/// User registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub is_approved: Option<bool>,
}

/// User login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Access and refresh token pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Successful login: tokens plus denormalized identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
}

/// Successful refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

impl From<SessionTokens> for RefreshResponse {
    fn from(tokens: SessionTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: BEARER_TOKEN_TYPE.to_string(),
        }
    }
}

/// Password change request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}
