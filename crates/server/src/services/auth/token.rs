//! Bearer-token minting and verification.
//!
//! Tokens are HS256 JWTs carrying the user ID in `sub` with an expiry set
//! from the configured TTL. The client holds the token; logout is purely
//! client-side, so there is no server-side revocation list.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use atlas_core::UserId;

/// Errors that can occur when issuing or verifying a token.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The token has expired.
    #[error("token expired")]
    Expired,

    /// The token is missing, malformed, or has a bad signature.
    #[error("invalid token")]
    Invalid,
}

/// Claims carried by an Atlas bearer token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// User ID the token identifies.
    sub: i64,
    /// Issued-at (seconds since epoch).
    iat: i64,
    /// Expiry (seconds since epoch).
    exp: i64,
}

/// Mints and verifies the signed, time-limited bearer tokens.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    /// Create a token service from the signing secret and TTL.
    #[must_use]
    pub fn new(secret: &SecretString, ttl_hours: i64) -> Self {
        let secret_bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret_bytes),
            decoding: DecodingKey::from_secret(secret_bytes),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Issue a token identifying `user_id`, valid for the configured TTL.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` if encoding fails.
    pub fn issue(&self, user_id: UserId) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.as_i64(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
            .map_err(|_| TokenError::Invalid)
    }

    /// Verify a token's signature and expiry, returning the user it identifies.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Expired` for an expired token and
    /// `TokenError::Invalid` for anything else that fails validation.
    pub fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let validation = Validation::new(Algorithm::HS256);

        let data =
            jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Invalid,
                }
            })?;

        Ok(UserId::new(data.claims.sub))
    }
}
