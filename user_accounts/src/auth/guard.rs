//! Role and ownership predicates over an already-resolved identity.
//!
//! Identity resolution itself (token → [`User`]) lives in
//! [`AuthManager::current_identity`](super::AuthManager::current_identity);
//! these checks do no I/O.

use super::errors::{AuthError, AuthResult};
use crate::accounts::{Role, User, UserId};

/// Require the caller to hold `role`
pub fn require_role(caller: &User, role: Role) -> AuthResult<()> {
    if caller.role == role {
        Ok(())
    } else {
        log::warn!(
            "user {} ({}) denied: requires role {}",
            caller.id,
            caller.role,
            role
        );
        Err(AuthError::Forbidden)
    }
}

/// Require the caller to own the resource belonging to `owner_id`
pub fn require_owner(caller: &User, owner_id: UserId) -> AuthResult<()> {
    if caller.id == owner_id {
        Ok(())
    } else {
        log::warn!("user {} denied access to user {}", caller.id, owner_id);
        Err(AuthError::Forbidden)
    }
}

/// Pass if the caller owns the resource or holds `role`
pub fn require_owner_or_role(caller: &User, owner_id: UserId, role: Role) -> AuthResult<()> {
    if caller.id == owner_id || caller.role == role {
        Ok(())
    } else {
        log::warn!(
            "user {} ({}) denied access to user {}",
            caller.id,
            caller.role,
            owner_id
        );
        Err(AuthError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(id: UserId, role: Role) -> User {
        User {
            id,
            username: format!("user{id}"),
            email: format!("user{id}@x.com"),
            password_hash: "hash".to_string(),
            role,
            is_approved: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn role_rule() {
        assert!(require_role(&user(1, Role::Admin), Role::Admin).is_ok());
        assert!(matches!(
            require_role(&user(1, Role::User), Role::Admin),
            Err(AuthError::Forbidden)
        ));
        // roles are not ranked
        assert!(require_role(&user(1, Role::Admin), Role::Builder).is_err());
    }

    #[test]
    fn ownership_rule() {
        assert!(require_owner(&user(7, Role::User), 7).is_ok());
        assert!(matches!(
            require_owner(&user(7, Role::Admin), 8),
            Err(AuthError::Forbidden)
        ));
    }

    #[test]
    fn owner_or_role() {
        assert!(require_owner_or_role(&user(7, Role::User), 7, Role::Admin).is_ok());
        assert!(require_owner_or_role(&user(1, Role::Admin), 7, Role::Admin).is_ok());
        assert!(require_owner_or_role(&user(1, Role::Builder), 7, Role::Admin).is_err());
    }
}
