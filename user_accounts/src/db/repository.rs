//! Credential store abstraction.
//!
//! Account flows only talk to [`UserRepository`], so the PostgreSQL store can be
//! swapped for [`MemoryUserRepository`](super::MemoryUserRepository) in tests.

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::accounts::{NewUser, Role, User, UserId};
use crate::auth::{AuthError, AuthResult, errors::map_unique_violation};

/// Trait for user record storage
///
/// Implementations must keep `username` and `email` unique and report a
/// violation as `AuthError::Conflict`.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>>;

    /// Find user by username
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>>;

    /// Find user by email
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>>;

    /// All users ordered by ID
    async fn list(&self) -> AuthResult<Vec<User>>;

    /// Insert a new user, assigning its ID and creation time
    async fn insert(&self, user: NewUser) -> AuthResult<User>;

    /// Persist every mutable field of `user`
    ///
    /// Fails with `AuthError::UserNotFound` if the record no longer exists.
    async fn update(&self, user: &User) -> AuthResult<User>;

    /// Hard delete; returns whether a record was removed
    async fn delete(&self, user_id: UserId) -> AuthResult<bool>;

    /// Check that the store is reachable
    async fn health_check(&self) -> AuthResult<()>;
}

const USER_COLUMNS: &str = "id, username, email, password_hash, role, is_approved, created_at";

/// Default PostgreSQL implementation of `UserRepository`
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: impl ToString) -> AuthResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = $1");
        let row = sqlx::query(&query)
            .bind(value.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }
}

fn user_from_row(row: &PgRow) -> AuthResult<User> {
    let role: String = row.try_get("role")?;
    let role = role
        .parse::<Role>()
        .map_err(|e| AuthError::Database(sqlx::Error::Decode(Box::new(e))))?;

    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role,
        is_approved: row.try_get("is_approved")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        self.find_one("username", username).await
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>> {
        self.find_one("email", email).await
    }

    async fn list(&self) -> AuthResult<Vec<User>> {
        let rows = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(user_from_row).collect()
    }

    async fn insert(&self, user: NewUser) -> AuthResult<User> {
        let row = sqlx::query(&format!(
            "INSERT INTO users (username, email, password_hash, role, is_approved)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.is_approved)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        user_from_row(&row)
    }

    async fn update(&self, user: &User) -> AuthResult<User> {
        let row = sqlx::query(&format!(
            "UPDATE users
             SET username = $2, email = $3, password_hash = $4, role = $5, is_approved = $6
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.is_approved)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique_violation)?
        .ok_or(AuthError::UserNotFound)?;

        user_from_row(&row)
    }

    async fn delete(&self, user_id: UserId) -> AuthResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> AuthResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
