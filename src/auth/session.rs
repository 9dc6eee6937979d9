//! Login sessions: minting the token pair and re-issuing access tokens.

use crate::auth::jwt::{encode_jwt, Claims};
use crate::auth::refresh::{generate_token, hash_token};
use crate::neo4j::models::{SessionNode, UserNode};
use crate::neo4j::traits::DocumentStore;
use crate::AuthConfig;
use anyhow::Result;
use chrono::{Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Token pair handed out at sign-in
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedSession {
    pub access_token: String,
    pub refresh_token: String,
    pub session: SessionNode,
}

/// Open a session for `user` and mint its access and refresh tokens.
pub async fn issue_session(
    store: &dyn DocumentStore,
    config: &AuthConfig,
    user: &UserNode,
    user_agent: &str,
) -> Result<IssuedSession> {
    let now = Utc::now();
    let refresh_token = generate_token();
    let session = SessionNode {
        id: Uuid::new_v4(),
        user_id: user.id,
        valid: true,
        user_agent: user_agent.to_string(),
        refresh_token_hash: hash_token(&refresh_token),
        created_at: now,
        expires_at: now + Duration::seconds(config.refresh_token_expiry_secs as i64),
    };
    store.create_session(&session).await?;

    let access_token = encode_jwt(
        user.id,
        session.id,
        &user.email,
        &user.username,
        &config.jwt_secret,
        config.access_token_expiry_secs,
    )?;

    tracing::info!(user_id = %user.id, session_id = %session.id, "Session opened");
    Ok(IssuedSession {
        access_token,
        refresh_token,
        session,
    })
}

/// Mint a fresh access token from a raw refresh token.
///
/// Returns `None` when the token matches no session, the session was
/// logged out or has expired, or its user no longer exists.
pub async fn reissue_access_token(
    store: &dyn DocumentStore,
    config: &AuthConfig,
    raw_refresh_token: &str,
) -> Result<Option<(String, Claims)>> {
    let Some(session) = store
        .get_session_by_refresh_hash(&hash_token(raw_refresh_token))
        .await?
    else {
        return Ok(None);
    };
    if !session.is_active(Utc::now()) {
        tracing::debug!(session_id = %session.id, "Refresh rejected: session inactive");
        return Ok(None);
    }
    let Some(user) = store.get_user_by_id(session.user_id).await? else {
        return Ok(None);
    };

    let token = encode_jwt(
        user.id,
        session.id,
        &user.email,
        &user.username,
        &config.jwt_secret,
        config.access_token_expiry_secs,
    )?;
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user.id.to_string(),
        sid: session.id.to_string(),
        email: user.email,
        name: user.username,
        iat: now,
        exp: now + config.access_token_expiry_secs as i64,
    };
    Ok(Some((token, claims)))
}
