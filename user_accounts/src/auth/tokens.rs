//! Signed, expiring bearer tokens.
//!
//! Tokens are stateless: validity is signature plus expiry, nothing is looked
//! up server-side. A token therefore stays valid until its `exp` even after the
//! user "logs out"; revocation would need a separate denylist.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use super::{
    config::AuthConfig,
    errors::{AuthError, AuthResult},
    models::{REFRESH_TOKEN_TYPE, SessionTokens, TokenClaims, TokenKind},
};
use crate::accounts::UserId;

/// Issues and verifies access/refresh tokens
#[derive(Clone)]
pub struct TokenService {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_ttl: Duration,
    refresh_token_ttl: Duration,
}

impl TokenService {
    /// Create a token service from the authentication configuration
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();
        Self {
            algorithm: config.jwt_algorithm,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            access_token_ttl: config.access_token_ttl,
            refresh_token_ttl: config.refresh_token_ttl,
        }
    }

    /// Issue an access token: `{sub, exp = now + access_ttl}`
    pub fn issue_access(&self, user_id: UserId) -> AuthResult<String> {
        self.issue(user_id, self.access_token_ttl, None)
    }

    /// Issue a refresh token: `{sub, exp = now + refresh_ttl, type: "refresh"}`
    pub fn issue_refresh(&self, user_id: UserId) -> AuthResult<String> {
        self.issue(
            user_id,
            self.refresh_token_ttl,
            Some(REFRESH_TOKEN_TYPE.to_string()),
        )
    }

    /// Issue a fresh access + refresh pair for a subject
    pub fn issue_pair(&self, user_id: UserId) -> AuthResult<SessionTokens> {
        Ok(SessionTokens {
            access_token: self.issue_access(user_id)?,
            refresh_token: self.issue_refresh(user_id)?,
        })
    }

    /// Verify a token and return its claims
    ///
    /// Rejects bad signatures, other algorithms, elapsed expiry, missing or
    /// non-numeric subjects, and, when `expected` is given, tokens of the
    /// other kind. Every failure is reported as `AuthError::InvalidToken`.
    pub fn verify(&self, token: &str, expected: Option<TokenKind>) -> AuthResult<TokenClaims> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                log::debug!("Token rejected: {e}");
                AuthError::InvalidToken
            })?
            .claims;

        let kind = claims.kind().ok_or(AuthError::InvalidToken)?;
        if expected.is_some_and(|expected| expected != kind) {
            return Err(AuthError::InvalidToken);
        }

        if claims.user_id().is_none() {
            return Err(AuthError::InvalidToken);
        }

        Ok(claims)
    }

    fn issue(
        &self,
        user_id: UserId,
        ttl: Duration,
        token_type: Option<String>,
    ) -> AuthResult<String> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or(AuthError::TokenLifetime)?;
        let claims = TokenClaims {
            sub: user_id.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            token_type,
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(AuthError::TokenEncoding)
    }
}
