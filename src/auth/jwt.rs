//! JWT Token Handler
//! Mission: Issue and verify stateless, time-bounded auth tokens

use crate::auth::models::{Claims, Role};
use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;
use uuid::Uuid;

/// Verification failure kinds. Both collapse to a 401 at the HTTP
/// boundary but are logged distinctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Token could not be parsed or its signature did not verify.
    Malformed,
    /// Token was well-formed and signed, but the embedded expiry passed.
    Expired,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Malformed => write!(f, "malformed token"),
            TokenError::Expired => write!(f, "expired token"),
        }
    }
}

impl std::error::Error for TokenError {}

/// JWT handler for token operations
pub struct JwtHandler {
    secret: String,
    expiry_hours: i64,
}

impl JwtHandler {
    /// Create a handler. Expiry is clamped to 1 hour - 7 days; the
    /// default deployment config uses 24 hours.
    pub fn new(secret: String, expiry_hours: i64) -> Self {
        Self {
            secret,
            expiry_hours: expiry_hours.clamp(1, 7 * 24),
        }
    }

    /// Issue a signed token embedding {sub, role, iat, exp}.
    ///
    /// Expiry lives inside the signed payload; there is no server-side
    /// session or revocation table.
    pub fn issue(&self, user_id: Uuid, role: Role) -> Result<String> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(chrono::Duration::hours(self.expiry_hours))
            .context("Invalid timestamp")?
            .timestamp() as usize;

        let claims = Claims {
            sub: user_id.to_string(),
            role,
            iat: now.timestamp() as usize,
            exp: expiration,
        };

        debug!(
            "Issuing JWT for user {} ({}), expires in {}h",
            user_id,
            role.as_str(),
            self.expiry_hours
        );

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to sign JWT")
    }

    /// Verify a token and extract its claims.
    ///
    /// Signature comparison is delegated to jsonwebtoken; no byte-by-byte
    /// secret comparison happens here.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        })
    }
}
