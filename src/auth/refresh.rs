//! Refresh token generation, hashing, and cookie helpers.
//!
//! The refresh token is an opaque 256-bit random value encoded as hex (64 chars).
//! Only its SHA-256 digest is stored on the session; the raw value lives in
//! the client's cookie or `x-refresh` header.
//!
//! Cookie format: `<name>=<value>; HttpOnly; SameSite=Lax; Path=/; Max-Age=<n>[; Secure]`

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use sha2::{Digest, Sha256};

/// Cookie carrying the access token after a Google sign-in
pub const ACCESS_COOKIE_NAME: &str = "accessToken";

/// Cookie carrying the refresh token after a Google sign-in
pub const REFRESH_COOKIE_NAME: &str = "refreshToken";

/// Generate a cryptographically random 256-bit token encoded as hex (64 chars).
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

/// Hash a raw token with SHA-256 and return the hex digest.
pub fn hash_token(raw_token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Build a `Set-Cookie` header value.
///
/// Fails only if `value` contains bytes that are not valid in a header.
pub fn build_cookie(name: &str, value: &str, max_age_secs: u64, is_secure: bool) -> Result<HeaderValue> {
    let secure_flag = if is_secure { "; Secure" } else { "" };
    let cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}{}",
        name, value, max_age_secs, secure_flag
    );
    HeaderValue::from_str(&cookie).context("cookie value is not a valid header")
}

/// Extract a cookie's value from a `Cookie` header value.
pub fn cookie_value(cookie_header: &str, name: &str) -> Option<String> {
    cookie_header.split(';').find_map(|part| {
        let (key, value) = part.trim().split_once('=')?;
        let value = value.trim();
        (key == name && !value.is_empty()).then(|| value.to_string())
    })
}

/// Determine whether the `Secure` flag should be set on cookies.
///
/// True when the frontend is served over HTTPS.
pub fn should_set_secure(frontend_url: Option<&str>) -> bool {
    frontend_url.is_some_and(|url| url.starts_with("https://"))
}

// ============================================================================
// Tests
// ============================================================================
