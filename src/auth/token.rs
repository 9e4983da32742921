use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::models::Role;

/// Claims embedded in the session token. `tokenVersion` is compared against
/// the user row on every request; incrementing the stored counter invalidates
/// every token minted before the increment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub role: Role,
    #[serde(rename = "tokenVersion")]
    pub token_version: i32,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Session secret not configured")]
    MissingSecret,

    #[error("Token generation error: {0}")]
    Generation(String),

    #[error("Token expired")]
    Expired,

    #[error("Token signature invalid")]
    SignatureInvalid,

    #[error("Token malformed: {0}")]
    Malformed(String),
}

/// Signs and verifies session tokens with one symmetric secret (HS256).
/// The same secret must verify everything it signs; there is no rotation.
pub struct TokenCodec {
    secret: String,
    ttl_hours: u64,
}

impl TokenCodec {
    pub fn new(security: &SecurityConfig) -> Self {
        Self {
            secret: security.session_secret.clone(),
            ttl_hours: security.session_ttl_hours,
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::hours(self.ttl_hours as i64)
    }

    /// Produce a signed token for the given identity, valid for the
    /// configured TTL starting now.
    pub fn sign(&self, user_id: Uuid, role: Role, token_version: i32) -> Result<String, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        let now = Utc::now();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            role,
            token_version,
            iat: now.timestamp(),
            exp: (now + self.ttl()).timestamp(),
        };

        let key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::default(), &claims, &key).map_err(|e| TokenError::Generation(e.to_string()))
    }

    /// Verify signature and expiry, recovering the claims. Expiry is checked
    /// first so an expired token reports `Expired` whether or not its
    /// signature would also have failed.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        // Peek at the claims without checking the MAC to classify expiry
        let mut peek = Validation::default();
        peek.insecure_disable_signature_validation();
        peek.validate_exp = true;
        peek.leeway = 0;
        let unverified = decode::<SessionClaims>(token, &DecodingKey::from_secret(&[]), &peek)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed(e.to_string()),
            })?;

        if self.secret.is_empty() {
            // Nothing signed by this codec can exist; never accept
            return Err(TokenError::SignatureInvalid);
        }

        let mut validation = Validation::default();
        validation.validate_exp = true;
        validation.leeway = 0;
        let verified = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed(e.to_string()),
        })?;

        debug_assert_eq!(unverified.claims.sub, verified.claims.sub);
        Ok(verified.claims)
    }
}
