//! Authentication manager implementation.

use std::sync::Arc;

use super::{
    config::AuthConfig,
    errors::{AuthError, AuthResult, ConflictField},
    models::{
        BEARER_TOKEN_TYPE, LoginRequest, LoginResponse, RefreshResponse, RegisterRequest,
        TokenKind,
    },
    password::PasswordHasher,
    tokens::TokenService,
    validation,
};
use crate::accounts::{NewUser, User};
use crate::db::UserRepository;

/// Authentication manager
///
/// Orchestrates registration, login, token refresh and identity resolution
/// over a [`UserRepository`].
#[derive(Clone)]
pub struct AuthManager {
    repo: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
    tokens: TokenService,
}

impl AuthManager {
    /// Create a new authentication manager
    ///
    /// # Arguments
    ///
    /// * `repo` - Credential store
    /// * `config` - Token and hashing configuration
    ///
    /// # Errors
    ///
    /// * `AuthError::Invalid` - The configuration fails validation
    /// * `AuthError::HashingFailed` - The hashing parameters are unusable
    pub fn new(repo: Arc<dyn UserRepository>, config: &AuthConfig) -> AuthResult<Self> {
        config.validate().map_err(AuthError::Invalid)?;

        Ok(Self {
            repo,
            hasher: PasswordHasher::from_config(config)?,
            tokens: TokenService::new(config),
        })
    }

    /// Password hasher shared with the account flows
    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    /// Token service used by this manager
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Register a new user
    ///
    /// Role defaults to `USER` and approval to `false` unless the request sets
    /// them.
    ///
    /// # Errors
    ///
    /// * `AuthError::Invalid` - Username, email or password fails validation
    /// * `AuthError::Conflict` - Username or email already exists
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<User> {
        validation::validate_username(&request.username)?;
        let email = validation::normalize_email(&request.email)?;
        validation::validate_password(&request.password)?;

        if self.repo.find_by_username(&request.username).await?.is_some() {
            return Err(AuthError::Conflict(ConflictField::Username));
        }
        if self.repo.find_by_email(&email).await?.is_some() {
            return Err(AuthError::Conflict(ConflictField::Email));
        }

        let password_hash = self.hasher.hash(&request.password)?;

        let user = self
            .repo
            .insert(NewUser {
                username: request.username,
                email,
                password_hash,
                role: request.role.unwrap_or_default(),
                is_approved: request.is_approved.unwrap_or(false),
            })
            .await?;

        log::info!("Registered user {} ({})", user.id, user.username);
        Ok(user)
    }

    /// Login with username and password
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidCredentials` - Unknown username or wrong password;
    ///   the two cases are indistinguishable to the caller
    pub async fn login(&self, request: LoginRequest) -> AuthResult<LoginResponse> {
        let Some(user) = self.repo.find_by_username(&request.username).await? else {
            self.hasher.verify_nothing(&request.password);
            log::warn!("Login failed: unknown username {:?}", request.username);
            return Err(AuthError::InvalidCredentials);
        };

        if !self.hasher.verify(&request.password, &user.password_hash) {
            log::warn!("Login failed: wrong password for user {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = self.tokens.issue_pair(user.id)?;
        log::info!("User {} logged in", user.id);

        Ok(LoginResponse {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: BEARER_TOKEN_TYPE.to_string(),
            user_id: user.id,
            username: user.username,
            role: user.role,
        })
    }

    /// Exchange a refresh token for a new access + refresh pair
    ///
    /// The presented refresh token is not revoked and stays usable until it
    /// expires.
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidToken` - Not a valid, unexpired refresh token
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<RefreshResponse> {
        let claims = self.tokens.verify(refresh_token, Some(TokenKind::Refresh))?;
        let user_id = claims.user_id().ok_or(AuthError::InvalidToken)?;

        let tokens = self.tokens.issue_pair(user_id)?;
        log::debug!("Rotated tokens for user {user_id}");

        Ok(tokens.into())
    }

    /// Resolve the user behind an access token
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidToken` - Token invalid, expired, of the refresh
    ///   kind, or its subject no longer exists
    pub async fn current_identity(&self, access_token: &str) -> AuthResult<User> {
        let claims = self.tokens.verify(access_token, Some(TokenKind::Access))?;
        let user_id = claims.user_id().ok_or(AuthError::InvalidToken)?;

        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::Role;
    use crate::auth::config::HashingParams;
    use crate::db::MemoryUserRepository;

    fn manager() -> AuthManager {
        let mut config = AuthConfig::new("an-adequately-long-test-signing-secret");
        config.hashing = HashingParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        };
        AuthManager::new(Arc::new(MemoryUserRepository::new()), &config).unwrap()
    }

    fn register_request(username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: "secret1".to_string(),
            role: None,
            is_approved: None,
        }
    }

    #[tokio::test]
    async fn register_applies_defaults_and_hashes() {
        let auth = manager();
        let user = auth.register(register_request("bob", "bob@x.com")).await.unwrap();

        assert_eq!(user.role, Role::User);
        assert!(!user.is_approved);
        assert_ne!(user.password_hash, "secret1");
        assert!(auth.hasher().verify("secret1", &user.password_hash));
    }

    #[tokio::test]
    async fn register_honors_explicit_role_and_approval() {
        let auth = manager();
        let mut request = register_request("root", "root@x.com");
        request.role = Some(Role::Admin);
        request.is_approved = Some(true);

        let user = auth.register(request).await.unwrap();
        assert_eq!(user.role, Role::Admin);
        assert!(user.is_approved);
    }

    #[tokio::test]
    async fn register_rejects_invalid_input() {
        let auth = manager();
        let mut request = register_request("bob", "not-an-email");
        assert!(matches!(
            auth.register(request.clone()).await,
            Err(AuthError::Invalid(_))
        ));

        request.email = "bob@x.com".to_string();
        request.password = "short".to_string();
        assert!(matches!(
            auth.register(request).await,
            Err(AuthError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn refresh_token_cannot_resolve_identity() {
        let auth = manager();
        auth.register(register_request("bob", "bob@x.com")).await.unwrap();
        let login = auth
            .login(LoginRequest {
                username: "bob".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap();

        assert!(matches!(
            auth.current_identity(&login.refresh_token).await,
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            auth.refresh(&login.access_token).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn rejects_weak_configuration() {
        let config = AuthConfig::new("short");
        assert!(matches!(
            AuthManager::new(Arc::new(MemoryUserRepository::new()), &config),
            Err(AuthError::Invalid(_))
        ));
    }
}
