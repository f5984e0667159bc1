//! HTTP API for the accounts service.
//!
//! # Architecture
//!
//! The API is built with:
//! - **Axum**: Async web framework
//! - **Tower**: Middleware for CORS, request IDs, authentication
//! - **JWT**: Stateless bearer access/refresh tokens
//!
//! # Modules
//!
//! - [`auth`]: Registration, login, token refresh, logout
//! - [`users`]: User listing and account management
//! - [`middleware`]: Bearer token authentication for protected endpoints
//! - [`request_id`]: Request correlation
//! - [`error`]: Error to HTTP response mapping
//!
//! # Endpoints Overview
//!
//! ```text
//! GET    /health                              - Store health (public)
//! POST   /api/v1/auth/register                - Register user (public)
//! POST   /api/v1/auth/login                   - Login (public)
//! POST   /api/v1/auth/refresh                 - Rotate tokens (public, refresh token in body)
//! POST   /api/v1/auth/logout                  - Advisory logout (public)
//! GET    /api/v1/users                        - List users
//! GET    /api/v1/users/me                     - Caller's own record
//! GET    /api/v1/users/{id}                   - Get user
//! PUT    /api/v1/users/{id}                   - Partial update (owner or admin)
//! PUT    /api/v1/users/{id}/change-password   - Change password (owner)
//! PUT    /api/v1/users/{id}/change-role       - Change role (admin)
//! PUT    /api/v1/users/{id}/approve           - Set approval (admin)
//! DELETE /api/v1/users/{id}                   - Delete (owner or admin)
//! ```
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ua_server::api::{AppState, create_router};
//! use ua_server::config::CorsOrigins;
//! use user_accounts::{AuthConfig, MemoryUserRepository};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repo = Arc::new(MemoryUserRepository::new());
//! let state = AppState::new(repo, &AuthConfig::new("a-signing-secret-of-at-least-32-chars"))?;
//! let app = create_router(state, &CorsOrigins::Any);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod error;
pub mod middleware;
pub mod request_id;
pub mod users;

use axum::{
    Json, Router,
    extract::{FromRequest, FromRequestParts, Path, State},
    http::{HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use user_accounts::{AccountManager, AuthConfig, AuthManager, AuthResult, UserRepository};

use crate::{config::CorsOrigins, metrics};
use error::ApiError;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request (cheap due to Arc wrappers).
#[derive(Clone)]
pub struct AppState {
    pub auth_manager: Arc<AuthManager>,
    pub account_manager: Arc<AccountManager>,
    pub repository: Arc<dyn UserRepository>,
}

impl AppState {
    /// Build both managers over one credential store
    pub fn new(repository: Arc<dyn UserRepository>, config: &AuthConfig) -> AuthResult<Self> {
        let auth_manager = AuthManager::new(repository.clone(), config)?;
        let account_manager =
            AccountManager::new(repository.clone(), auth_manager.hasher().clone());

        Ok(Self {
            auth_manager: Arc::new(auth_manager),
            account_manager: Arc::new(account_manager),
            repository,
        })
    }
}

/// JSON body extractor whose rejections use the API error format
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path extractor whose rejections use the API error format
#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Create the complete API router with all endpoints and middleware.
pub fn create_router(state: AppState, cors: &CorsOrigins) -> Router {
    let v1_routes = create_v1_router(state.clone());

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", v1_routes)
        .route_layer(axum::middleware::from_fn(metrics::track_http))
        .layer(
            ServiceBuilder::new()
                .layer(cors_layer(cors))
                .layer(axum::middleware::from_fn(request_id::request_id_middleware)),
        )
        .with_state(state)
}

/// Create API v1 router with all versioned endpoints.
fn create_v1_router(state: AppState) -> Router<AppState> {
    // Public routes (no authentication middleware)
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout));

    // Protected routes (require authentication middleware)
    let protected_routes = Router::new()
        .route("/users", get(users::list_users))
        .route("/users/me", get(users::me))
        .route(
            "/users/{user_id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/users/{user_id}/change-password", put(users::change_password))
        .route("/users/{user_id}/change-role", put(users::change_role))
        .route("/users/{user_id}/approve", put(users::approve_user))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth_middleware,
        ));

    Router::new().merge(public_routes).merge(protected_routes)
}

fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    match origins {
        CorsOrigins::Any => CorsLayer::permissive(),
        CorsOrigins::List(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the credential store is reachable, `503 Service
/// Unavailable` otherwise.
///
/// ```bash
/// curl http://localhost:8000/health
/// # {"status":"healthy","version":"0.1.0","database":true,"timestamp":"2026-01-01T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = state.repository.health_check().await.is_ok();

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
