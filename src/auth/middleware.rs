//! Auth middleware for Axum routes.
//!
//! Validates the JWT access token and injects Claims into request extensions.
//! Implements deny-by-default: if `auth_config` is None, all requests are rejected.

use crate::api::handlers::{AppError, TrackerState};
use crate::auth::jwt::{verify_jwt, TokenStatus};
use crate::auth::refresh::{cookie_value, ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME};
use crate::auth::session::reissue_access_token;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};

/// Request header carrying the raw refresh token
pub const REFRESH_HEADER: &str = "x-refresh";

/// Response header carrying a re-issued access token
pub const NEW_ACCESS_TOKEN_HEADER: &str = "x-access-token";

fn cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|raw| cookie_value(raw, name))
}

/// `Authorization: Bearer <token>`, else the `accessToken` cookie
fn access_token(headers: &HeaderMap) -> Result<Option<String>, AppError> {
    match headers.get(header::AUTHORIZATION) {
        Some(value) => {
            let token = value
                .to_str()
                .ok()
                .and_then(|v| v.strip_prefix("Bearer "))
                .ok_or_else(|| {
                    AppError::Unauthorized("Invalid Authorization header format".to_string())
                })?;
            Ok(Some(token.trim().to_string()))
        }
        None => Ok(cookie(headers, ACCESS_COOKIE_NAME)),
    }
}

/// `x-refresh: <token>`, else the `refreshToken` cookie
fn refresh_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(REFRESH_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| cookie(headers, REFRESH_COOKIE_NAME))
}

/// Middleware that requires a valid access token.
///
/// # Behavior
/// 1. If `auth_config` is `None` → 403 Forbidden (deny-by-default)
/// 2. Read the access token from the Bearer header or cookie → 401 if missing
/// 3. Valid token → inject `Claims` and continue
/// 4. Expired token plus a refresh token of an active session → mint a new
///    access token, continue, and return it in `x-access-token`
/// 5. Anything else → 401
pub async fn require_auth(
    State(state): State<TrackerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_config = state.auth_config.as_ref().ok_or_else(|| {
        AppError::Forbidden("Authentication not configured - access denied".to_string())
    })?;

    let token = access_token(req.headers())?
        .ok_or_else(|| AppError::Unauthorized("Missing access token".to_string()))?;

    match verify_jwt(&token, &auth_config.jwt_secret) {
        TokenStatus::Valid(claims) => {
            req.extensions_mut().insert(claims);
            Ok(next.run(req).await)
        }
        TokenStatus::Expired => {
            let raw_refresh = refresh_token(req.headers())
                .ok_or_else(|| AppError::Unauthorized("Access token expired".to_string()))?;

            let (new_token, claims) =
                reissue_access_token(state.store.as_ref(), auth_config, &raw_refresh)
                    .await?
                    .ok_or_else(|| AppError::Unauthorized("Invalid session".to_string()))?;
            let header_value = HeaderValue::from_str(&new_token)
                .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid token header: {}", e)))?;

            tracing::debug!(user_id = %claims.sub, "Re-issued expired access token");
            req.extensions_mut().insert(claims);

            let mut response = next.run(req).await;
            response
                .headers_mut()
                .insert(NEW_ACCESS_TOKEN_HEADER, header_value);
            Ok(response)
        }
        TokenStatus::Invalid => Err(AppError::Unauthorized("Invalid token".to_string())),
    }
}

// ============================================================================
// Tests
// ============================================================================
