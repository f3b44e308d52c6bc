//! Session token codec: signed, self-contained bearer tokens.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use super::claims::{Claims, Role};

/// Token decode/issue failures.
///
/// The three decode kinds are deliberately distinct: the session
/// authenticator collapses them, but logout and tests need to tell them
/// apart.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// The token string could not be parsed as a JWT.
    #[error("malformed token")]
    Malformed,

    /// The signature does not match the claims.
    #[error("bad token signature")]
    BadSignature,

    /// The token is past its expiry.
    #[error("token expired")]
    Expired,

    /// Signing failed while issuing a token.
    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Issues and verifies HS256-signed session tokens.
///
/// The signing key is fixed at construction and shared for the lifetime
/// of the process.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenCodec {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issue a token for `subject` expiring `ttl_secs` from now.
    ///
    /// A non-positive TTL produces a token that is already expired;
    /// `decode` will reject it.
    pub fn issue(&self, subject: &str, role: Role, ttl_secs: i64) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            role,
            iat: now,
            exp: now + ttl_secs,
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Parse a token, verify its signature, and check expiry.
    ///
    /// The signature is always verified first, so a tampered token
    /// reports `BadSignature` even when its claims would also be
    /// expired. Expiry uses an inclusive boundary: a token whose `exp`
    /// equals the current second is already expired.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below with inclusive-boundary semantics.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed,
            })?;

        let claims = data.claims;
        if claims.is_expired(Utc::now().timestamp()) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}
