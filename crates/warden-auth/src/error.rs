//! Authentication and authorization error types.

use thiserror::Error;
use warden_core::error::WardenError;

/// Fine-grained failure kinds, distinguished internally for logging and
/// tests. At the [`WardenError`] boundary every authentication-stage
/// kind collapses into one opaque reason; only `Forbidden` is surfaced
/// separately, so a transport layer can map 401 vs 403.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("token is malformed")]
    MalformedToken,

    #[error("token signature is invalid")]
    BadSignature,

    #[error("token has expired")]
    Expired,

    #[error("token kind does not match the expected kind")]
    WrongKind,

    #[error("refresh session not found")]
    SessionNotFound,

    #[error("refresh session is not active")]
    SessionNotActive,

    #[error("user account is inactive")]
    UserInactive,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("missing permission: {0}")]
    Forbidden(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for WardenError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Forbidden(permission) => WardenError::AuthorizationDenied {
                reason: format!("missing permission: {permission}"),
            },
            AuthError::Crypto(msg) => WardenError::Crypto(msg),
            AuthError::MalformedToken
            | AuthError::BadSignature
            | AuthError::Expired
            | AuthError::WrongKind
            | AuthError::SessionNotFound
            | AuthError::SessionNotActive
            | AuthError::UserInactive
            | AuthError::InvalidCredentials => WardenError::AuthenticationFailed {
                // One reason for every kind, so the response body cannot
                // be used as a token oracle.
                reason: "authentication failed".into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_failures_share_one_outward_reason() {
        let expired: WardenError = AuthError::Expired.into();
        let tampered: WardenError = AuthError::BadSignature.into();
        assert_eq!(expired.to_string(), tampered.to_string());
    }

    #[test]
    fn forbidden_maps_to_authorization_denied() {
        let err: WardenError = AuthError::Forbidden("documents:create".into()).into();
        assert!(matches!(err, WardenError::AuthorizationDenied { .. }));
    }
}
