//! JWT access token encoding and decoding using HS256.
//!
//! The access token carries the user identity plus the id of the session it
//! was minted for, so an expired token can be re-issued from that session.

use anyhow::{Context, Result};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject - user UUID
    pub sub: String,
    /// Session UUID
    pub sid: String,
    /// User email
    pub email: String,
    /// Username
    pub name: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// Outcome of checking an access token
#[derive(Debug, Clone, PartialEq)]
pub enum TokenStatus {
    Valid(Claims),
    /// Well signed but past its `exp`
    Expired,
    Invalid,
}

/// Encode an access token for the given user and session.
pub fn encode_jwt(
    user_id: Uuid,
    session_id: Uuid,
    email: &str,
    name: &str,
    secret: &str,
    expiry_secs: u64,
) -> Result<String> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        sid: session_id.to_string(),
        email: email.to_string(),
        name: name.to_string(),
        iat: now,
        exp: now + expiry_secs as i64,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("Failed to encode JWT")
}

/// Decode and validate a JWT token.
pub fn decode_jwt(token: &str, secret: &str) -> Result<Claims> {
    let token_data: TokenData<Claims> = decode(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .context("Failed to decode JWT")?;

    Ok(token_data.claims)
}

/// Like [`decode_jwt`], but tells an expired token apart from a bad one.
pub fn verify_jwt(token: &str, secret: &str) -> TokenStatus {
    let result = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    );

    match result {
        Ok(data) => TokenStatus::Valid(data.claims),
        Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => TokenStatus::Expired,
        Err(e) => {
            tracing::debug!("Rejected access token: {}", e);
            TokenStatus::Invalid
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
