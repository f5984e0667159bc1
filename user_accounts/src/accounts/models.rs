//! Account data models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User ID type
pub type UserId = i64;

/// Account role.
///
/// Shared by storage and the API; both use the upper-snake spelling
/// (`USER`, `MANAGER_PROJECT`, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    User,
    Admin,
    Builder,
    ManagerProject,
    ManagerCatalog,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::User,
        Role::Admin,
        Role::Builder,
        Role::ManagerProject,
        Role::ManagerCatalog,
    ];

    /// Storage and wire spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
            Role::Builder => "BUILDER",
            Role::ManagerProject => "MANAGER_PROJECT",
            Role::ManagerCatalog => "MANAGER_CATALOG",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// User model
///
/// Carries the password hash, so it is intentionally not `Serialize`;
/// convert to [`UserResponse`] before handing it to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

/// Public view of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub is_approved: bool,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_approved: user.is_approved,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Record handed to the store on insert
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub is_approved: bool,
}

/// Partial profile update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub is_approved: Option<bool>,
    #[serde(default)]
    pub role: Option<Role>,
}

impl UserUpdate {
    /// True when no recognized field was supplied.
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.is_approved.is_none()
            && self.role.is_none()
    }

    /// True when the update touches fields reserved for administrators.
    pub fn touches_privileged_fields(&self) -> bool {
        self.role.is_some() || self.is_approved.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_text() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert_eq!("manager_catalog".parse::<Role>(), Ok(Role::ManagerCatalog));
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn role_serializes_upper_snake() {
        let json = serde_json::to_string(&Role::ManagerProject).unwrap();
        assert_eq!(json, "\"MANAGER_PROJECT\"");
        let role: Role = serde_json::from_str("\"ADMIN\"").unwrap();
        assert_eq!(role, Role::Admin);
        assert!(serde_json::from_str::<Role>("\"ROOT\"").is_err());
    }

    #[test]
    fn default_role_is_user() {
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn empty_update_detection() {
        let update: UserUpdate = serde_json::from_str("{}").unwrap();
        assert!(update.is_empty());

        let update: UserUpdate = serde_json::from_str(r#"{"nickname": "bob"}"#).unwrap();
        assert!(update.is_empty());

        let update: UserUpdate = serde_json::from_str(r#"{"email": "new@x.com"}"#).unwrap();
        assert!(!update.is_empty());
        assert!(!update.touches_privileged_fields());

        let update: UserUpdate = serde_json::from_str(r#"{"role": "BUILDER"}"#).unwrap();
        assert!(update.touches_privileged_fields());
    }

    #[test]
    fn response_view_omits_password_hash() {
        let user = User {
            id: 7,
            username: "bob".to_string(),
            email: "bob@x.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: Role::User,
            is_approved: false,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "bob");
        assert_eq!(json["role"], "USER");
    }
}
