//! Token codec: signs and verifies the two halves of a session pair.
//!
//! Access and refresh tokens are HS256-signed with independent secrets and
//! expiry policies. The codec is pure computation; persistence of refresh
//! tokens belongs to the store.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind as JwtErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::models::Role;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("invalid token")]
    Invalid,
}

/// Claims carried by both token types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: Uuid,
    /// Role at issuance time
    pub role: Role,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// Ephemeral output of issuance. Never persisted as a pair; only the
/// refresh half gets a store record.
#[derive(Debug, Clone, Serialize)]
pub struct SessionPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
struct SigningContext {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry: Duration,
}

impl SigningContext {
    fn new(secret: &str, expiry: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry,
        }
    }

    fn issue(&self, user_id: Uuid, role: Role) -> Result<String, anyhow::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            role,
            exp: (now + self.expiry).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("Failed to encode token: {}", e))
    }

    fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => match e.kind() {
                JwtErrorKind::ExpiredSignature => Err(TokenError::Expired),
                _ => Err(TokenError::Invalid),
            },
        }
    }
}

/// Two independent signing contexts behind one handle.
#[derive(Clone)]
pub struct TokenCodec {
    access: SigningContext,
    refresh: SigningContext,
}

impl TokenCodec {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            access: SigningContext::new(
                &config.access_secret,
                Duration::minutes(config.access_token_expiry_minutes),
            ),
            refresh: SigningContext::new(
                &config.refresh_secret,
                Duration::days(config.refresh_token_expiry_days),
            ),
        }
    }

    pub fn issue_access(&self, user_id: Uuid, role: Role) -> Result<String, anyhow::Error> {
        self.access.issue(user_id, role)
    }

    pub fn issue_refresh(&self, user_id: Uuid, role: Role) -> Result<String, anyhow::Error> {
        self.refresh.issue(user_id, role)
    }

    pub fn verify_access(&self, token: &str) -> Result<Claims, TokenError> {
        self.access.verify(token)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<Claims, TokenError> {
        self.refresh.verify(token)
    }

    /// Expiry to record alongside a freshly persisted refresh token.
    pub fn refresh_expiry(&self) -> DateTime<Utc> {
        Utc::now() + self.refresh.expiry
    }
}
