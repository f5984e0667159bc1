//! In-process user store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::repository::UserRepository;
use crate::accounts::{NewUser, User, UserId};
use crate::auth::{AuthError, AuthResult, ConflictField};

#[derive(Default)]
struct Inner {
    next_id: UserId,
    users: BTreeMap<UserId, User>,
}

impl Inner {
    fn check_unique(&self, id: Option<UserId>, username: &str, email: &str) -> AuthResult<()> {
        for user in self.users.values().filter(|u| Some(u.id) != id) {
            if user.username == username {
                return Err(AuthError::Conflict(ConflictField::Username));
            }
            if user.email == email {
                return Err(AuthError::Conflict(ConflictField::Email));
            }
        }
        Ok(())
    }
}

/// `UserRepository` backed by a map behind a `RwLock`
///
/// Enforces the same uniqueness rules as the PostgreSQL schema; each write
/// checks and mutates under one lock, so it never leaves partial state.
#[derive(Default)]
pub struct MemoryUserRepository {
    inner: RwLock<Inner>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&user_id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> AuthResult<Vec<User>> {
        Ok(self.inner.read().await.users.values().cloned().collect())
    }

    async fn insert(&self, user: NewUser) -> AuthResult<User> {
        let mut inner = self.inner.write().await;
        inner.check_unique(None, &user.username, &user.email)?;

        inner.next_id += 1;
        let stored = User {
            id: inner.next_id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            is_approved: user.is_approved,
            created_at: Utc::now(),
        };
        inner.users.insert(stored.id, stored.clone());

        Ok(stored)
    }

    async fn update(&self, user: &User) -> AuthResult<User> {
        let mut inner = self.inner.write().await;
        inner.check_unique(Some(user.id), &user.username, &user.email)?;

        let stored = inner
            .users
            .get_mut(&user.id)
            .ok_or(AuthError::UserNotFound)?;
        // id and created_at are immutable
        stored.username = user.username.clone();
        stored.email = user.email.clone();
        stored.password_hash = user.password_hash.clone();
        stored.role = user.role;
        stored.is_approved = user.is_approved;

        Ok(stored.clone())
    }

    async fn delete(&self, user_id: UserId) -> AuthResult<bool> {
        Ok(self.inner.write().await.users.remove(&user_id).is_some())
    }

    async fn health_check(&self) -> AuthResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::Role;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
            role: Role::User,
            is_approved: false,
        }
    }

    #[tokio::test]
    async fn assigns_increasing_ids() {
        let repo = MemoryUserRepository::new();
        let a = repo.insert(new_user("alice", "a@x.com")).await.unwrap();
        let b = repo.insert(new_user("bob", "b@x.com")).await.unwrap();
        assert!(b.id > a.id);
        assert_eq!(repo.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn enforces_unique_username_and_email() {
        let repo = MemoryUserRepository::new();
        repo.insert(new_user("alice", "a@x.com")).await.unwrap();

        let err = repo.insert(new_user("alice", "other@x.com")).await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict(ConflictField::Username)));

        let err = repo.insert(new_user("other", "a@x.com")).await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict(ConflictField::Email)));
    }

    #[tokio::test]
    async fn update_checks_uniqueness_against_others_only() {
        let repo = MemoryUserRepository::new();
        let mut alice = repo.insert(new_user("alice", "a@x.com")).await.unwrap();
        repo.insert(new_user("bob", "b@x.com")).await.unwrap();

        alice.role = Role::Builder;
        let saved = repo.update(&alice).await.unwrap();
        assert_eq!(saved.role, Role::Builder);

        alice.email = "b@x.com".to_string();
        assert!(matches!(
            repo.update(&alice).await,
            Err(AuthError::Conflict(ConflictField::Email))
        ));
        let stored = repo.find_by_id(alice.id).await.unwrap().unwrap();
        assert_eq!(stored.email, "a@x.com");
    }

    #[tokio::test]
    async fn update_of_deleted_user_is_not_found() {
        let repo = MemoryUserRepository::new();
        let alice = repo.insert(new_user("alice", "a@x.com")).await.unwrap();
        assert!(repo.delete(alice.id).await.unwrap());
        assert!(!repo.delete(alice.id).await.unwrap());
        assert!(matches!(
            repo.update(&alice).await,
            Err(AuthError::UserNotFound)
        ));
    }
}
