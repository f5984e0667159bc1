//! User management API handlers.
//!
//! Every route here sits behind [`auth_middleware`](super::middleware::auth_middleware);
//! handlers apply ownership and role rules before touching the store.

use axum::{Extension, Json, extract::State};
use serde::Deserialize;
use user_accounts::{
    AuthResult, Role, UserId, UserResponse, UserUpdate,
    auth::{ChangePasswordRequest, guard},
};

use super::{
    ApiJson, ApiPath, AppState,
    auth::MessageResponse,
    error::{ApiError, ApiResult},
    middleware::CurrentUser,
};
use crate::logging;

/// Role change request body
#[derive(Debug, Deserialize)]
pub struct ChangeRolePayload {
    pub role: Role,
}

/// Approval request body
#[derive(Debug, Deserialize)]
pub struct ApprovePayload {
    pub is_approved: bool,
}

/// Log and pass through a guard failure
fn audit(caller: &CurrentUser, action: &str, result: AuthResult<()>) -> ApiResult<()> {
    result.map_err(|e| {
        logging::log_security_event("forbidden", Some(caller.0.id), &format!("{action} denied"));
        ApiError::from(e)
    })
}

/// List all users.
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = state.account_manager.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// The caller's own record.
pub async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<UserResponse> {
    Json(user.into())
}

/// Get user by ID.
///
/// # Errors
///
/// - `404 Not Found`: No such user
pub async fn get_user(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<UserId>,
) -> ApiResult<Json<UserResponse>> {
    let user = state.account_manager.get_user(user_id).await?;
    Ok(Json(user.into()))
}

/// Partially update a user.
///
/// Owner or admin; `role` and `is_approved` may only be set by an admin.
///
/// # Errors
///
/// - `400 Bad Request`: Empty update or invalid field
/// - `403 Forbidden`: Not the owner/admin, or privileged fields without admin
/// - `404 Not Found`: No such user
/// - `409 Conflict`: Username or email taken
pub async fn update_user(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    ApiPath(user_id): ApiPath<UserId>,
    ApiJson(update): ApiJson<UserUpdate>,
) -> ApiResult<Json<UserResponse>> {
    audit(
        &caller,
        "profile update",
        guard::require_owner_or_role(&caller.0, user_id, Role::Admin),
    )?;
    if update.touches_privileged_fields() {
        audit(
            &caller,
            "privileged field update",
            guard::require_role(&caller.0, Role::Admin),
        )?;
    }

    let user = state.account_manager.update_profile(user_id, update).await?;
    Ok(Json(user.into()))
}

/// Change a user's password; owner only.
///
/// # Errors
///
/// - `400 Bad Request`: Current password incorrect or new password invalid
/// - `403 Forbidden`: Not the owner
pub async fn change_password(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    ApiPath(user_id): ApiPath<UserId>,
    ApiJson(payload): ApiJson<ChangePasswordRequest>,
) -> ApiResult<Json<UserResponse>> {
    audit(
        &caller,
        "password change",
        guard::require_owner(&caller.0, user_id),
    )?;

    let user = state
        .account_manager
        .change_password(user_id, &payload.current_password, &payload.new_password)
        .await?;
    Ok(Json(user.into()))
}

/// Change a user's role; admin only.
pub async fn change_role(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    ApiPath(user_id): ApiPath<UserId>,
    ApiJson(payload): ApiJson<ChangeRolePayload>,
) -> ApiResult<Json<UserResponse>> {
    audit(
        &caller,
        "role change",
        guard::require_role(&caller.0, Role::Admin),
    )?;

    let user = state
        .account_manager
        .change_role(user_id, payload.role)
        .await?;
    Ok(Json(user.into()))
}

/// Approve or un-approve a user; admin only.
pub async fn approve_user(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    ApiPath(user_id): ApiPath<UserId>,
    ApiJson(payload): ApiJson<ApprovePayload>,
) -> ApiResult<Json<UserResponse>> {
    audit(
        &caller,
        "approval change",
        guard::require_role(&caller.0, Role::Admin),
    )?;

    let user = state
        .account_manager
        .approve(user_id, payload.is_approved)
        .await?;
    Ok(Json(user.into()))
}

/// Delete a user; owner or admin.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    ApiPath(user_id): ApiPath<UserId>,
) -> ApiResult<Json<MessageResponse>> {
    audit(
        &caller,
        "account deletion",
        guard::require_owner_or_role(&caller.0, user_id, Role::Admin),
    )?;

    state.account_manager.delete(user_id).await?;
    Ok(Json(MessageResponse {
        message: "User deleted successfully".to_string(),
    }))
}
