//! Authentication configuration.

/// Where the authorization guard takes a user's roles from.
///
/// `TokenSnapshot` trusts the role list embedded at issuance time: no
/// extra lookup, but a role revoked mid-lifetime stays effective until
/// the access token expires. `CurrentAssignment` re-fetches the user's
/// roles on every decision, so revocation takes effect immediately at
/// the cost of one lookup per request. Either way the user record
/// itself is checked on every decision, so deactivation is always
/// immediate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoleSource {
    TokenSnapshot,
    #[default]
    CurrentAssignment,
}

/// Configuration for the authorization engine.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret for signing access tokens.
    pub access_token_secret: String,
    /// HMAC secret for signing refresh tokens. Kept distinct from the
    /// access secret so a leak of one cannot mint the other kind.
    pub refresh_token_secret: String,
    /// Access token lifetime in seconds (default: 1800 = 30 minutes).
    pub access_token_lifetime_secs: u64,
    /// Refresh token lifetime in seconds (default: 604_800 = 7 days).
    pub refresh_token_lifetime_secs: u64,
    /// JWT issuer (`iss` claim).
    pub jwt_issuer: String,
    /// Clock-skew leeway applied to expiry comparisons, in seconds.
    pub expiry_leeway_secs: u64,
    /// Role-source policy for authorization decisions.
    pub role_source: RoleSource,
    /// Optional pepper prepended to passwords before Argon2id
    /// verification.
    pub pepper: Option<String>,
    /// Minimum password length for the registration policy.
    pub min_password_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: String::new(),
            refresh_token_secret: String::new(),
            access_token_lifetime_secs: 1800,
            refresh_token_lifetime_secs: 604_800,
            jwt_issuer: "warden".into(),
            expiry_leeway_secs: 5,
            role_source: RoleSource::default(),
            pepper: None,
            min_password_length: 8,
        }
    }
}
