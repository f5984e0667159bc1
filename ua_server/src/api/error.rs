//! HTTP error responses.
//!
//! Every handler failure is an [`ApiError`]; the response carries a status
//! derived from the error kind and a JSON body with a client-safe message.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use user_accounts::{AuthError, ErrorKind};

/// Error body returned to clients
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub error: String,
    /// Human-readable error message
    pub message: String,
}

/// Handler error
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Request body or path could not be parsed
    #[error("{0}")]
    BadRequest(String),
}

/// Convenience alias for handler return types.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Auth(err) => match err.kind() {
                ErrorKind::Conflict => (StatusCode::CONFLICT, "conflict"),
                ErrorKind::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
                ErrorKind::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
                ErrorKind::NotFound => (StatusCode::NOT_FOUND, "not_found"),
                ErrorKind::Invalid => (StatusCode::BAD_REQUEST, "invalid"),
                ErrorKind::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            },
        }
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        self.status_and_code().0
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            ApiError::Auth(err) => {
                if err.kind() == ErrorKind::Internal {
                    tracing::error!(error = ?err, "Request failed");
                }
                err.client_message()
            }
            ApiError::BadRequest(message) => message.clone(),
        };

        let mut response = (
            status,
            Json(ErrorResponse {
                error: code.to_string(),
                message,
            }),
        )
            .into_response();

        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}
