//! Password hashing with Argon2id.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString, rand_core::OsRng,
    },
};

use super::{
    config::{AuthConfig, HashingParams},
    errors::{AuthError, AuthResult},
};

/// Salted, deliberately slow one-way password hasher.
///
/// Every call to [`hash`](Self::hash) draws a fresh salt, so hashing the same
/// plaintext twice yields different PHC strings that both verify.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    pepper: String,
    /// Hash with the configured cost, checked when there is no real hash
    dummy_hash: String,
}

const DUMMY_PASSWORD: &str = "dummy-password-never-matches";

impl PasswordHasher {
    /// Create a hasher from explicit cost parameters and pepper
    ///
    /// # Errors
    ///
    /// * `AuthError::HashingFailed` - The parameters are out of Argon2's range
    pub fn new(params: HashingParams, pepper: impl Into<String>) -> AuthResult<Self> {
        let params = Params::new(params.memory_kib, params.iterations, params.parallelism, None)
            .map_err(|_| AuthError::HashingFailed)?;

        let mut hasher = Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            pepper: pepper.into(),
            dummy_hash: String::new(),
        };
        hasher.dummy_hash = hasher.hash(DUMMY_PASSWORD)?;
        Ok(hasher)
    }

    /// Create a hasher from the authentication configuration
    pub fn from_config(config: &AuthConfig) -> AuthResult<Self> {
        Self::new(config.hashing, config.password_pepper.clone())
    }

    /// Hash password with Argon2id + pepper
    pub fn hash(&self, password: &str) -> AuthResult<String> {
        let peppered = self.pepper(password);
        let salt = SaltString::generate(&mut OsRng);

        Ok(self
            .argon2
            .hash_password(peppered.as_bytes(), &salt)
            .map_err(|_| AuthError::HashingFailed)?
            .to_string())
    }

    /// Verify password against hash
    ///
    /// A hash string that does not parse is treated as a mismatch.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            return false;
        };
        let peppered = self.pepper(password);

        self.argon2
            .verify_password(peppered.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Run a full verification against a throwaway hash and report a mismatch
    ///
    /// Used when no stored hash exists, so the caller spends the same time
    /// as a failed [`verify`](Self::verify).
    pub fn verify_nothing(&self, password: &str) -> bool {
        let _ = self.verify(password, &self.dummy_hash);
        false
    }

    fn pepper(&self, password: &str) -> String {
        format!("{}{}", password, self.pepper)
    }
}
