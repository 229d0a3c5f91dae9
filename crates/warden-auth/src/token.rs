//! Token codec: HS256 JWT issuance and verification for both token
//! kinds, and high-entropy token identifier generation.
//!
//! Each kind is signed with its own symmetric secret, so a leaked
//! refresh secret cannot be used to mint access tokens and vice versa.
//! Verification is a pure computation (signature check plus timestamp
//! comparison) and holds no locks.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// Token kind, carried as the `kind` claim. A refresh token presented
/// where an access token is expected (or the reverse) is rejected with
/// [`AuthError::WrongKind`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims embedded in every WARDEN token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject — user ID (UUID string).
    pub sub: String,
    /// Issuer.
    pub iss: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Unique token ID. For refresh tokens this doubles as the
    /// [`RefreshSession`](warden_core::models::session::RefreshSession)
    /// row key; access-token ids are never persisted.
    pub jti: String,
    /// Token kind marker.
    pub kind: TokenKind,
    /// Role-name snapshot at issuance time. Empty for refresh tokens.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
}

fn secret_for(kind: TokenKind, config: &AuthConfig) -> &[u8] {
    match kind {
        TokenKind::Access => config.access_token_secret.as_bytes(),
        TokenKind::Refresh => config.refresh_token_secret.as_bytes(),
    }
}

fn sign(claims: &TokenClaims, config: &AuthConfig) -> Result<String, AuthError> {
    let key = EncodingKey::from_secret(secret_for(claims.kind, config));
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &key)
        .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
}

/// Issue a token of the given kind with an explicit lifetime.
///
/// `jti` is the token identifier; pass the session id for refresh
/// tokens so the store can be keyed by it.
pub fn issue_token(
    user_id: Uuid,
    kind: TokenKind,
    ttl_secs: i64,
    roles: Vec<String>,
    jti: String,
    config: &AuthConfig,
) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let claims = TokenClaims {
        sub: user_id.to_string(),
        iss: config.jwt_issuer.clone(),
        iat: now,
        exp: now + ttl_secs,
        jti,
        kind,
        roles,
    };
    sign(&claims, config)
}

/// Issue a signed access token embedding the user's current role names.
pub fn issue_access_token(
    user_id: Uuid,
    roles: Vec<String>,
    config: &AuthConfig,
) -> Result<String, AuthError> {
    issue_token(
        user_id,
        TokenKind::Access,
        config.access_token_lifetime_secs as i64,
        roles,
        generate_token_id(),
        config,
    )
}

/// Issue a signed refresh token whose `jti` is the given session id.
pub fn issue_refresh_token(
    user_id: Uuid,
    session_id: &str,
    config: &AuthConfig,
) -> Result<String, AuthError> {
    issue_token(
        user_id,
        TokenKind::Refresh,
        config.refresh_token_lifetime_secs as i64,
        Vec::new(),
        session_id.to_string(),
        config,
    )
}

/// Decode and verify a token of the expected kind.
///
/// Fails with exactly one of [`AuthError::MalformedToken`],
/// [`AuthError::BadSignature`], [`AuthError::Expired`], or
/// [`AuthError::WrongKind`]. Expiry comparison tolerates
/// `expiry_leeway_secs` of clock skew.
pub fn verify_token(
    token: &str,
    expected: TokenKind,
    config: &AuthConfig,
) -> Result<TokenClaims, AuthError> {
    let key = DecodingKey::from_secret(secret_for(expected, config));

    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = config.expiry_leeway_secs;
    validation.set_issuer(&[&config.jwt_issuer]);
    validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);

    let claims = jsonwebtoken::decode::<TokenClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
            jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::BadSignature,
            _ => AuthError::MalformedToken,
        })?;

    if claims.kind != expected {
        return Err(AuthError::WrongKind);
    }

    Ok(claims)
}

/// Generate a cryptographically random token identifier
/// (32 bytes → base64url-encoded, no padding).
pub fn generate_token_id() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rand::Rng::random(&mut rng);
    URL_SAFE_NO_PAD.encode(bytes)
}
