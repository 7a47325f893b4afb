//! Bearer token issuance and verification.
//!
//! Tokens are signed JWTs (HS256) carrying the account id, role, and a fixed
//! expiry. They are opaque to clients; the server re-checks the account on
//! every verification, so a token alone never outlives its account.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use farm_village_core::{AccountId, Role};

use crate::models::CurrentAccount;

/// Errors that can occur when issuing or verifying tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The token's expiry has passed.
    #[error("token expired")]
    Expired,

    /// The token is not a valid signed token for this server.
    #[error("malformed token")]
    Malformed,

    /// Signing failed (key misconfiguration).
    #[error("failed to sign token")]
    Signing,
}

/// JWT claims carried by a bearer token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Account id.
    sub: i32,
    /// Account role at login time.
    role: Role,
    /// Issued-at (seconds since epoch).
    iat: i64,
    /// Expiry (seconds since epoch).
    exp: i64,
}

/// Signs and verifies bearer tokens.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    /// Create a token service from the signing secret and token lifetime.
    #[must_use]
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.expose_secret().as_bytes()),
            decoding: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation,
            ttl,
        }
    }

    /// Issue a signed token for an account.
    ///
    /// Returns the token string and its expiry timestamp.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue(
        &self,
        id: AccountId,
        role: Role,
    ) -> Result<(String, DateTime<Utc>), TokenError> {
        let now = Utc::now();
        let expires_at = now + self.ttl;

        let claims = Claims {
            sub: id.as_i32(),
            role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
            .map_err(|_| TokenError::Signing)?;

        Ok((token, expires_at))
    }

    /// Verify a token's signature and expiry, returning the caller it encodes.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Expired` if the expiry has passed.
    /// Returns `TokenError::Malformed` for any other validation failure.
    pub fn verify(&self, token: &str) -> Result<CurrentAccount, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })?;

        Ok(CurrentAccount {
            id: AccountId::new(data.claims.sub),
            role: data.claims.role,
        })
    }
}
