//! AuthUser extractor for Axum handlers.
//!
//! Extracts the authenticated user's identity from request extensions
//! (populated by the `require_auth` middleware).

use crate::api::handlers::{AppError, TrackerState};
use crate::auth::jwt::Claims;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

/// Authenticated user identity extracted from JWT claims.
///
/// ```rust,ignore
/// async fn my_handler(user: AuthUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub session_id: Uuid,
    pub email: String,
    /// Username, which is also the roadmap owner key
    pub name: String,
}

impl AuthUser {
    fn from_claims(claims: &Claims) -> Result<Self, AppError> {
        let user_id: Uuid = claims
            .sub
            .parse()
            .map_err(|_| AppError::Unauthorized("Invalid user ID in token".to_string()))?;
        let session_id: Uuid = claims
            .sid
            .parse()
            .map_err(|_| AppError::Unauthorized("Invalid session ID in token".to_string()))?;

        Ok(Self {
            user_id,
            session_id,
            email: claims.email.clone(),
            name: claims.name.clone(),
        })
    }
}

impl FromRequestParts<TrackerState> for AuthUser {
    type Rejection = AppError;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &TrackerState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        async {
            let claims = parts.extensions.get::<Claims>().ok_or_else(|| {
                AppError::Unauthorized("Authentication required - no claims in request".to_string())
            })?;

            Self::from_claims(claims)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: String, sid: String) -> Claims {
        Claims {
            sub,
            sid,
            email: "alice@example.com".to_string(),
            name: "alice".to_string(),
            iat: 0,
            exp: 0,
        }
    }

    #[test]
    fn test_auth_user_from_valid_claims() {
        let user_id = Uuid::new_v4();
        let session_id = Uuid::new_v4();
        let user = AuthUser::from_claims(&claims(user_id.to_string(), session_id.to_string())).unwrap();
        assert_eq!(user.user_id, user_id);
        assert_eq!(user.session_id, session_id);
        assert_eq!(user.name, "alice");
    }

    #[test]
    fn test_auth_user_from_invalid_ids() {
        let valid = Uuid::new_v4().to_string();
        assert!(AuthUser::from_claims(&claims("not-a-uuid".into(), valid.clone())).is_err());
        assert!(AuthUser::from_claims(&claims(valid, "".into())).is_err());
    }
}
