//! Account management flows.
//!
//! Authorization is the caller's job: run the relevant
//! [`guard`](crate::auth::guard) check before invoking these operations.

use std::sync::Arc;

use super::models::{Role, User, UserId, UserUpdate};
use crate::auth::{AuthError, AuthResult, ConflictField, PasswordHasher, validation};
use crate::db::UserRepository;

/// Profile, password, role, approval and deletion operations on stored users
#[derive(Clone)]
pub struct AccountManager {
    repo: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
}

impl AccountManager {
    pub fn new(repo: Arc<dyn UserRepository>, hasher: PasswordHasher) -> Self {
        Self { repo, hasher }
    }

    /// All users, ordered by ID
    pub async fn list_users(&self) -> AuthResult<Vec<User>> {
        self.repo.list().await
    }

    /// Get user by ID
    ///
    /// # Errors
    ///
    /// * `AuthError::UserNotFound` - No such user
    pub async fn get_user(&self, user_id: UserId) -> AuthResult<User> {
        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Apply a partial profile update
    ///
    /// Only supplied fields change. A new password is hashed before storage.
    ///
    /// # Errors
    ///
    /// * `AuthError::UserNotFound` - No such user
    /// * `AuthError::Invalid` - No fields supplied, or a field fails validation
    /// * `AuthError::Conflict` - New username or email belongs to another user
    pub async fn update_profile(&self, user_id: UserId, update: UserUpdate) -> AuthResult<User> {
        let mut user = self.get_user(user_id).await?;

        if update.is_empty() {
            return Err(AuthError::invalid("no fields to update"));
        }

        if let Some(username) = update.username {
            validation::validate_username(&username)?;
            if username != user.username && self.repo.find_by_username(&username).await?.is_some()
            {
                return Err(AuthError::Conflict(ConflictField::Username));
            }
            user.username = username;
        }

        if let Some(email) = update.email {
            let email = validation::normalize_email(&email)?;
            if email != user.email && self.repo.find_by_email(&email).await?.is_some() {
                return Err(AuthError::Conflict(ConflictField::Email));
            }
            user.email = email;
        }

        if let Some(password) = update.password {
            validation::validate_password(&password)?;
            user.password_hash = self.hasher.hash(&password)?;
        }

        if let Some(role) = update.role {
            user.role = role;
        }

        if let Some(is_approved) = update.is_approved {
            user.is_approved = is_approved;
        }

        let user = self.repo.update(&user).await?;
        log::info!("Updated profile of user {}", user.id);
        Ok(user)
    }

    /// Change password after re-verifying the current one
    ///
    /// # Errors
    ///
    /// * `AuthError::UserNotFound` - No such user
    /// * `AuthError::Invalid` - Current password incorrect or new password too weak;
    ///   the stored hash is left unchanged
    pub async fn change_password(
        &self,
        user_id: UserId,
        current_password: &str,
        new_password: &str,
    ) -> AuthResult<User> {
        let mut user = self.get_user(user_id).await?;

        if !self.hasher.verify(current_password, &user.password_hash) {
            log::warn!("Password change for user {user_id} rejected: wrong current password");
            return Err(AuthError::invalid("current password incorrect"));
        }
        validation::validate_password(new_password)?;

        user.password_hash = self.hasher.hash(new_password)?;
        let user = self.repo.update(&user).await?;

        log::info!("Password changed for user {user_id}");
        Ok(user)
    }

    /// Set a user's role
    pub async fn change_role(&self, user_id: UserId, role: Role) -> AuthResult<User> {
        let mut user = self.get_user(user_id).await?;
        user.role = role;

        let user = self.repo.update(&user).await?;
        log::info!("User {user_id} now has role {role}");
        Ok(user)
    }

    /// Set a user's approval flag
    pub async fn approve(&self, user_id: UserId, is_approved: bool) -> AuthResult<User> {
        let mut user = self.get_user(user_id).await?;
        user.is_approved = is_approved;

        let user = self.repo.update(&user).await?;
        log::info!("User {user_id} approval set to {is_approved}");
        Ok(user)
    }

    /// Hard delete a user
    ///
    /// # Errors
    ///
    /// * `AuthError::UserNotFound` - No such user
    pub async fn delete(&self, user_id: UserId) -> AuthResult<()> {
        if !self.repo.delete(user_id).await? {
            return Err(AuthError::UserNotFound);
        }

        log::info!("Deleted user {user_id}");
        Ok(())
    }
}
