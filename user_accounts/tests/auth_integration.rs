//! Integration tests for the authentication flow.
//!
//! Tests registration, login, token refresh and identity resolution against
//! the in-memory credential store.

use std::sync::Arc;

use chrono::Duration;
use user_accounts::auth::{
    AuthConfig, AuthError, AuthManager, ErrorKind, HashingParams, LoginRequest, RegisterRequest,
    TokenKind,
};
use user_accounts::{MemoryUserRepository, Role, UserRepository};

const TEST_SECRET: &str = "integration-test-secret-with-enough-bytes";

fn test_config() -> AuthConfig {
    let mut config = AuthConfig::new(TEST_SECRET);
    config.hashing = HashingParams {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    };
    config
}

/// Helper to create test auth manager over a fresh store
fn setup_auth_manager() -> (AuthManager, Arc<MemoryUserRepository>) {
    let repo = Arc::new(MemoryUserRepository::new());
    let auth = AuthManager::new(repo.clone(), &test_config()).expect("valid test config");
    (auth, repo)
}

fn register_request(username: &str, email: &str, password: &str) -> RegisterRequest {
    RegisterRequest {
        username: username.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        role: None,
        is_approved: None,
    }
}

fn login_request(username: &str, password: &str) -> LoginRequest {
    LoginRequest {
        username: username.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn test_register_new_user() {
    let (auth, repo) = setup_auth_manager();

    let user = auth
        .register(register_request("bob", "bob@x.com", "secret1"))
        .await
        .expect("Registration should succeed");

    assert!(user.id > 0, "User ID should be positive");
    assert_eq!(user.role, Role::User);
    assert!(!user.is_approved, "New users start unapproved");

    let stored = repo.find_by_username("bob").await.unwrap().unwrap();
    assert_eq!(stored.id, user.id);
    assert!(!stored.password_hash.is_empty());
    assert_ne!(stored.password_hash, "secret1", "Plaintext must never be stored");
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let (auth, _) = setup_auth_manager();

    auth.register(register_request("alice", "alice@x.com", "secret1"))
        .await
        .expect("First registration should succeed");

    let err = auth
        .register(register_request("alice", "different@x.com", "secret2"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(err.client_message(), "username already taken");
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let (auth, _) = setup_auth_manager();

    auth.register(register_request("alice", "shared@x.com", "secret1"))
        .await
        .expect("First registration should succeed");

    let err = auth
        .register(register_request("carol", "shared@x.com", "secret2"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(err.client_message(), "email already taken");
}

#[tokio::test]
async fn test_register_email_domain_is_case_insensitive() {
    let (auth, _) = setup_auth_manager();

    let bob = auth
        .register(register_request("bob", "bob@X.Com", "secret1"))
        .await
        .expect("First registration should succeed");
    assert_eq!(bob.email, "bob@x.com");

    let err = auth
        .register(register_request("bob2", "bob@X.COM", "secret2"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(err.client_message(), "email already taken");
}

#[tokio::test]
async fn test_login_success() {
    let (auth, _) = setup_auth_manager();
    let user = auth
        .register(register_request("bob", "bob@x.com", "secret1"))
        .await
        .unwrap();

    let session = auth
        .login(login_request("bob", "secret1"))
        .await
        .expect("Login should succeed");

    assert_eq!(session.user_id, user.id);
    assert_eq!(session.username, "bob");
    assert_eq!(session.role, Role::User);
    assert_eq!(session.token_type, "bearer");

    let access = auth
        .tokens()
        .verify(&session.access_token, Some(TokenKind::Access))
        .unwrap();
    assert_eq!(access.sub, user.id.to_string());
    assert!(access.token_type.is_none(), "Access tokens carry no type marker");

    let refresh = auth
        .tokens()
        .verify(&session.refresh_token, Some(TokenKind::Refresh))
        .unwrap();
    assert_eq!(refresh.sub, user.id.to_string());
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let (auth, _) = setup_auth_manager();
    auth.register(register_request("alice", "alice@x.com", "secret1"))
        .await
        .unwrap();

    let wrong_password = auth
        .login(login_request("alice", "wrongpass"))
        .await
        .unwrap_err();
    let unknown_user = auth
        .login(login_request("nonexistent", "anything"))
        .await
        .unwrap_err();

    assert!(matches!(wrong_password, AuthError::InvalidCredentials));
    assert!(matches!(unknown_user, AuthError::InvalidCredentials));
    assert_eq!(wrong_password.kind(), ErrorKind::Unauthorized);
    assert_eq!(wrong_password.client_message(), unknown_user.client_message());
}

#[tokio::test]
async fn test_refresh_rotates_tokens() {
    let (auth, _) = setup_auth_manager();
    let user = auth
        .register(register_request("bob", "bob@x.com", "secret1"))
        .await
        .unwrap();
    let session = auth.login(login_request("bob", "secret1")).await.unwrap();

    let refreshed = auth
        .refresh(&session.refresh_token)
        .await
        .expect("Refresh should succeed");
    assert_eq!(refreshed.token_type, "bearer");

    let identity = auth
        .current_identity(&refreshed.access_token)
        .await
        .expect("Refreshed access token should resolve");
    assert_eq!(identity.id, user.id);

    // no revocation list: the presented refresh token is still usable
    assert!(auth.refresh(&session.refresh_token).await.is_ok());
    assert!(auth.refresh(&refreshed.refresh_token).await.is_ok());
}

#[tokio::test]
async fn test_refresh_rejects_garbage() {
    let (auth, _) = setup_auth_manager();

    for token in ["", "not-a-jwt", "a.b.c"] {
        assert!(
            matches!(auth.refresh(token).await, Err(AuthError::InvalidToken)),
            "{token:?} should be rejected"
        );
    }
}

#[tokio::test]
async fn test_expired_tokens_are_rejected() {
    let repo = Arc::new(MemoryUserRepository::new());
    let mut config = test_config();
    config.access_token_ttl = Duration::seconds(-5);
    config.refresh_token_ttl = Duration::seconds(-5);
    // negative lifetimes are refused by validation, so build the pieces directly
    let tokens = user_accounts::auth::TokenService::new(&config);

    let auth = AuthManager::new(repo, &test_config()).unwrap();
    let access = tokens.issue_access(1).unwrap();
    let refresh = tokens.issue_refresh(1).unwrap();

    assert!(matches!(
        auth.current_identity(&access).await,
        Err(AuthError::InvalidToken)
    ));
    assert!(matches!(
        auth.refresh(&refresh).await,
        Err(AuthError::InvalidToken)
    ));
}

#[tokio::test]
async fn test_deleted_user_token_is_unauthorized() {
    let (auth, repo) = setup_auth_manager();
    let user = auth
        .register(register_request("bob", "bob@x.com", "secret1"))
        .await
        .unwrap();
    let session = auth.login(login_request("bob", "secret1")).await.unwrap();

    assert!(repo.delete(user.id).await.unwrap());

    let err = auth
        .current_identity(&session.access_token)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
}

#[tokio::test]
async fn test_tokens_from_other_secret_are_rejected() {
    let (auth, _) = setup_auth_manager();
    let (other, _) = {
        let repo = Arc::new(MemoryUserRepository::new());
        let mut config = test_config();
        config.jwt_secret = "a-completely-different-signing-secret".to_string();
        (AuthManager::new(repo.clone(), &config).unwrap(), repo)
    };

    let forged = other.tokens().issue_access(1).unwrap();
    assert!(matches!(
        auth.current_identity(&forged).await,
        Err(AuthError::InvalidToken)
    ));
}
