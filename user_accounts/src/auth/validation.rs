//! Input shape checks for account payloads.

use std::sync::LazyLock;

use regex::Regex;

use super::errors::{AuthError, AuthResult};

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 50;
pub const PASSWORD_MIN_LEN: usize = 6;
pub const EMAIL_MAX_LEN: usize = 100;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$")
        .expect("email pattern is valid")
});

/// Username must be 3-50 characters
pub fn validate_username(username: &str) -> AuthResult<()> {
    let len = username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err(AuthError::invalid(format!(
            "Username must be {USERNAME_MIN_LEN}-{USERNAME_MAX_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> AuthResult<()> {
    if email.len() > EMAIL_MAX_LEN || !EMAIL_REGEX.is_match(email) {
        return Err(AuthError::invalid("Invalid email address"));
    }
    Ok(())
}

/// Validate an email and return its canonical form
///
/// The domain part is case-insensitive and is lowercased; the local part is
/// kept as given.
pub fn normalize_email(email: &str) -> AuthResult<String> {
    validate_email(email)?;
    match email.rsplit_once('@') {
        Some((local, domain)) => Ok(format!("{local}@{}", domain.to_ascii_lowercase())),
        None => Err(AuthError::invalid("Invalid email address")),
    }
}

/// Password must be at least 6 characters
pub fn validate_password(password: &str) -> AuthResult<()> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(AuthError::invalid(format!(
            "Password must be at least {PASSWORD_MIN_LEN} characters"
        )));
    }
    Ok(())
}
