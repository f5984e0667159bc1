//! Authentication API handlers.
//!
//! This module provides HTTP REST endpoints for:
//! - User registration with username, email and password
//! - Login with username/password
//! - Token refresh, rotating both tokens
//! - Logout, which is advisory only
//!
//! # Examples
//!
//! Register a new user:
//! ```bash
//! curl -X POST http://localhost:8000/api/v1/auth/register \
//!   -H "Content-Type: application/json" \
//!   -d '{"username": "bob", "email": "bob@example.com", "password": "secret1"}'
//! ```
//!
//! Login:
//! ```bash
//! curl -X POST http://localhost:8000/api/v1/auth/login \
//!   -H "Content-Type: application/json" \
//!   -d '{"username": "bob", "password": "secret1"}'
//! ```

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use user_accounts::{
    UserResponse,
    auth::{LoginRequest, LoginResponse, RefreshResponse, RegisterRequest},
};

use super::{ApiJson, AppState, error::ApiResult};
use crate::{logging, metrics};

/// Refresh request body
#[derive(Debug, Deserialize)]
pub struct RefreshPayload {
    pub refresh_token: String,
}

/// Plain acknowledgement body
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Register a new user account.
///
/// # Request Body
///
/// ```json
/// {
///   "username": "bob",
///   "email": "bob@example.com",
///   "password": "secret1",
///   "role": "USER",          // Optional
///   "is_approved": false     // Optional
/// }
/// ```
///
/// # Response
///
/// `201 Created` with the public user view (never the password hash).
///
/// # Errors
///
/// - `400 Bad Request`: Invalid username, email or password
/// - `409 Conflict`: Username or email already taken
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let user = state.auth_manager.register(payload).await?;
    metrics::registrations_total();

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Login with username and password.
///
/// # Response
///
/// ```json
/// {
///   "access_token": "eyJhbGciOiJIUzI1NiIs...",
///   "refresh_token": "eyJhbGciOiJIUzI1NiIs...",
///   "token_type": "bearer",
///   "user_id": 42,
///   "username": "bob",
///   "role": "USER"
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown username or wrong password (not distinguished)
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    match state.auth_manager.login(payload).await {
        Ok(session) => {
            metrics::login_attempts_total(true);
            Ok(Json(session))
        }
        Err(e) => {
            metrics::login_attempts_total(false);
            logging::log_security_event("failed_login", None, &e.to_string());
            Err(e.into())
        }
    }
}

/// Exchange a refresh token for a fresh access/refresh pair.
///
/// # Errors
///
/// - `401 Unauthorized`: Token invalid, expired, or not a refresh token
pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RefreshPayload>,
) -> ApiResult<Json<RefreshResponse>> {
    let result = state.auth_manager.refresh(&payload.refresh_token).await;
    metrics::token_refreshes_total(result.is_ok());

    Ok(Json(result?))
}

/// Logout.
///
/// Tokens are stateless and cannot be revoked server-side; clients must
/// discard them. Issued tokens stay valid until they expire.
pub async fn logout() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Successfully logged out. Please remove tokens from client storage.".to_string(),
    })
}
