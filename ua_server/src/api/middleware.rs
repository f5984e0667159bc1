//! Authentication middleware for protected endpoints.
//!
//! Extracts the bearer token from the `Authorization` header, resolves it to
//! a stored user, and injects that user into request extensions as
//! [`CurrentUser`] for downstream handlers.
//!
//! # Usage
//!
//! ```rust,no_run
//! use axum::{Extension, Router, routing::get, middleware};
//! use ua_server::api::{AppState, middleware::{CurrentUser, auth_middleware}};
//!
//! async fn whoami(Extension(CurrentUser(user)): Extension<CurrentUser>) -> String {
//!     format!("Authenticated as user {}", user.id)
//! }
//!
//! # fn build(state: AppState) -> Router {
//! Router::new()
//!     .route("/whoami", get(whoami))
//!     .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
//!     .with_state(state)
//! # }
//! ```

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use user_accounts::{AuthError, User};

use super::{AppState, error::ApiError};
use crate::logging;

/// The authenticated caller, resolved from the access token
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Extract the token from `Authorization: Bearer <token>`
///
/// The scheme is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Authentication middleware that validates access tokens and injects the caller.
///
/// # Behavior
///
/// - **Success**: Token valid and user exists → Injects [`CurrentUser`] → Calls next handler
/// - **Missing or malformed header**: `401 Unauthorized`
/// - **Invalid, expired or refresh token**: `401 Unauthorized`
/// - **User deleted after issuance**: `401 Unauthorized`
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = bearer_token(request.headers()) else {
        return Err(AuthError::InvalidToken.into());
    };

    let user = state
        .auth_manager
        .current_identity(token)
        .await
        .inspect_err(|e| {
            if e.kind() == user_accounts::ErrorKind::Unauthorized {
                logging::log_security_event("invalid_token", None, "Rejected bearer token");
            }
        })?;

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}
