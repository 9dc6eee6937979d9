//! Authentication route handlers - registration, password login, Google OAuth,
//! profile and journey settings.
//!
//! Endpoints:
//! - `POST /api/register`                 - Create a password account
//! - `POST /api/login`                    - Email/password login, opens a session
//! - `GET  /api/session/oauth/google/url` - Returns the Google consent URL
//! - `GET  /api/session/oauth/google`     - OAuth callback: cookies + redirect
//! - `GET  /api/find-me`                  - The authenticated user (protected)
//! - `PUT  /api/new-journey`              - Set journey end date and hours (protected)
//! - `GET  /api/log-out`                  - Invalidate the current session (protected)

use crate::api::handlers::{AppError, TrackerState};
use crate::auth::extractor::AuthUser;
use crate::auth::refresh::{build_cookie, should_set_secure, ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME};
use crate::auth::session::{issue_session, IssuedSession};
use crate::neo4j::models::UserNode;
use crate::stats::parse_journey_end;
use crate::AuthConfig;
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Redirect},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum password length for registration and login
pub const MIN_PASSWORD_LEN: usize = 8;

// ============================================================================
// Request / Response types
// ============================================================================

/// Request body for POST /api/register
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for POST /api/login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response for GET /api/session/oauth/google/url
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUrlResponse {
    pub auth_url: String,
}

/// Query of the Google OAuth callback
#[derive(Deserialize)]
pub struct GoogleCallbackQuery {
    pub code: Option<String>,
}

/// Request body for PUT /api/new-journey
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJourneyRequest {
    pub journey_duration: String,
    pub allocated_time: f64,
}

fn auth_config(state: &TrackerState) -> Result<&AuthConfig, AppError> {
    state
        .auth_config
        .as_ref()
        .ok_or_else(|| AppError::Forbidden("Authentication not configured".to_string()))
}

fn user_agent(headers: &HeaderMap) -> &str {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

fn validate_email(email: &str) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if valid {
        Ok(email)
    } else {
        Err(AppError::BadRequest("Invalid email format!".to_string()))
    }
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.trim().len() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(
            "Password is too short - Should be 8 chars minimum...".to_string(),
        ));
    }
    Ok(())
}

/// Roadmaps are owned by username, so two accounts can never share one.
async fn ensure_username_free(state: &TrackerState, username: &str) -> Result<(), AppError> {
    if state.store.get_user_by_username(username).await?.is_some() {
        return Err(AppError::Conflict("Username is already taken".to_string()));
    }
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/register - Create a password account.
pub async fn register(
    State(state): State<TrackerState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserNode>), AppError> {
    let auth_config = auth_config(&state)?;
    if !auth_config.allow_registration {
        return Err(AppError::Forbidden("Registration is disabled".to_string()));
    }

    let username = req.username.trim();
    if username.is_empty() {
        return Err(AppError::BadRequest("Username is required".to_string()));
    }
    let email = validate_email(&req.email)?;
    validate_password(&req.password)?;

    if state.store.get_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict(
            "An account with this email already exists".to_string(),
        ));
    }
    ensure_username_free(&state, username).await?;

    let password_hash = bcrypt::hash(req.password.trim(), auth_config.bcrypt_cost)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to hash password: {}", e)))?;

    let user = UserNode {
        id: Uuid::new_v4(),
        username: username.to_string(),
        email,
        password_hash: Some(password_hash),
        picture: None,
        journey_duration: None,
        allocated_time: 0.0,
        created_at: Utc::now(),
    };
    state.store.create_user(&user).await?;
    tracing::info!(user_id = %user.id, "Registered user");

    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /api/login - Email/password authentication.
///
/// Error messages never reveal whether the email exists.
pub async fn login(
    State(state): State<TrackerState>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> Result<(StatusCode, Json<IssuedSession>), AppError> {
    let auth_config = auth_config(&state)?;
    let email = validate_email(&req.email)?;
    validate_password(&req.password)?;

    let wrong_credentials = || AppError::Unauthorized("wrong credentials".to_string());

    let user = state
        .store
        .get_user_by_email(&email)
        .await?
        .ok_or_else(wrong_credentials)?;
    let password_hash = user
        .password_hash
        .as_deref()
        .ok_or_else(wrong_credentials)?;
    if !bcrypt::verify(req.password.trim(), password_hash).unwrap_or(false) {
        return Err(wrong_credentials());
    }

    let issued = issue_session(state.store.as_ref(), auth_config, &user, user_agent(&headers)).await?;
    Ok((StatusCode::CREATED, Json(issued)))
}

/// GET /api/session/oauth/google/url - Returns the Google consent URL.
pub async fn google_url(State(state): State<TrackerState>) -> Result<Json<AuthUrlResponse>, AppError> {
    auth_config(&state)?;
    let client = state
        .google
        .as_ref()
        .ok_or_else(|| AppError::Forbidden("Google sign-in is not configured".to_string()))?;

    Ok(Json(AuthUrlResponse {
        auth_url: client.auth_url(),
    }))
}

/// GET /api/session/oauth/google - OAuth callback.
///
/// 1. Exchanges the code for Google user info
/// 2. Upserts the user by email; a new account needs a free username
/// 3. Opens a session, sets both token cookies and redirects to the dashboard
pub async fn google_callback(
    State(state): State<TrackerState>,
    headers: HeaderMap,
    Query(query): Query<GoogleCallbackQuery>,
) -> Result<impl IntoResponse, AppError> {
    let auth_config = auth_config(&state)?;
    let client = state
        .google
        .as_ref()
        .ok_or_else(|| AppError::Forbidden("Google sign-in is not configured".to_string()))?;
    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing authorization code".to_string()))?;

    let google_user = client
        .exchange_code(&code)
        .await
        .map_err(|e| AppError::BadRequest(format!("OAuth code exchange failed: {}", e)))?;
    if !google_user.email_verified {
        return Err(AppError::Unauthorized(
            "Google account is not verified".to_string(),
        ));
    }

    let email = google_user.email.to_lowercase();
    let username = google_user.name.trim();
    if state.store.get_user_by_email(&email).await?.is_none() {
        if username.is_empty() {
            return Err(AppError::BadRequest("Google account has no name".to_string()));
        }
        ensure_username_free(&state, username).await?;
    }

    let user = state
        .store
        .upsert_google_user(&email, username, google_user.picture.as_deref())
        .await?;
    let issued = issue_session(state.store.as_ref(), auth_config, &user, user_agent(&headers)).await?;

    let secure = should_set_secure(auth_config.frontend_url.as_deref());
    let access_cookie = build_cookie(
        ACCESS_COOKIE_NAME,
        &issued.access_token,
        auth_config.refresh_token_expiry_secs,
        secure,
    )?;
    let refresh_cookie = build_cookie(
        REFRESH_COOKIE_NAME,
        &issued.refresh_token,
        auth_config.refresh_token_expiry_secs,
        secure,
    )?;

    let target = format!(
        "{}/dashboard/overview",
        auth_config
            .frontend_url
            .as_deref()
            .unwrap_or("")
            .trim_end_matches('/')
    );

    Ok((
        AppendHeaders([
            (header::SET_COOKIE, access_cookie),
            (header::SET_COOKIE, refresh_cookie),
        ]),
        Redirect::to(&target),
    ))
}

/// GET /api/find-me - Returns the authenticated user.
pub async fn find_me(
    State(state): State<TrackerState>,
    user: AuthUser,
) -> Result<Json<UserNode>, AppError> {
    let user_node = state
        .store
        .get_user_by_id(user.user_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "User was not found with provided ID: {}",
                user.user_id
            ))
        })?;

    Ok(Json(user_node))
}

/// PUT /api/new-journey - Set the journey end date and hour budget.
pub async fn new_journey(
    State(state): State<TrackerState>,
    user: AuthUser,
    Json(req): Json<NewJourneyRequest>,
) -> Result<Json<UserNode>, AppError> {
    let journey = req.journey_duration.trim();
    if parse_journey_end(journey).is_none() {
        return Err(AppError::BadRequest(format!(
            "Invalid journey end date: {}",
            journey
        )));
    }
    if !req.allocated_time.is_finite() || req.allocated_time < 0.0 {
        return Err(AppError::BadRequest(
            "allocatedTime must not be negative".to_string(),
        ));
    }

    let updated = state
        .store
        .update_user_journey(user.user_id, journey, req.allocated_time)
        .await?
        .ok_or_else(|| AppError::NotFound("User was not found".to_string()))?;

    Ok(Json(updated))
}

/// GET /api/log-out - Invalidate the caller's session and clear the cookies.
pub async fn log_out(
    State(state): State<TrackerState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let auth_config = auth_config(&state)?;
    if !state.store.invalidate_session(user.session_id).await? {
        tracing::debug!(session_id = %user.session_id, "Log-out for unknown session");
    }

    let secure = should_set_secure(auth_config.frontend_url.as_deref());
    Ok((
        StatusCode::CREATED,
        AppendHeaders([
            (header::SET_COOKIE, build_cookie(ACCESS_COOKIE_NAME, "", 0, secure)?),
            (header::SET_COOKIE, build_cookie(REFRESH_COOKIE_NAME, "", 0, secure)?),
        ]),
        Json(()),
    ))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::create_router;
    use crate::auth::jwt::{decode_jwt, encode_jwt};
    use crate::test_helpers::{
        call, json_request, mock_server_state, test_auth_config, test_bearer_token, test_user,
        TEST_SECRET,
    };
    use serde_json::json;

    fn app() -> (axum::Router, TrackerState) {
        let state = mock_server_state(Some(test_auth_config()));
        (create_router(state.clone()), state)
    }

    async fn register_alice(app: &axum::Router) -> serde_json::Value {
        let (status, _, body) = call(
            app,
            json_request(
                "POST",
                "/api/register",
                None,
                Some(json!({"username": "alice", "email": "Alice@Example.com", "password": "password123"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let (app, state) = app();

        let user = register_alice(&app).await;
        assert_eq!(user["username"], "alice");
        assert_eq!(user["email"], "alice@example.com");
        assert!(user.get("passwordHash").is_none());

        let (status, _, body) = call(
            &app,
            json_request(
                "POST",
                "/api/login",
                None,
                Some(json!({"email": "alice@example.com", "password": "password123"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let claims = decode_jwt(body["accessToken"].as_str().unwrap(), TEST_SECRET).unwrap();
        assert_eq!(claims.name, "alice");
        assert_eq!(claims.sid, body["session"]["id"].as_str().unwrap());
        assert_eq!(body["refreshToken"].as_str().unwrap().len(), 64);

        let session_id: Uuid = claims.sid.parse().unwrap();
        assert!(state.store.get_session(session_id).await.unwrap().unwrap().valid);
    }

    #[tokio::test]
    async fn test_register_validation() {
        let (app, _) = app();

        let cases = [
            json!({"username": " ", "email": "a@example.com", "password": "password123"}),
            json!({"username": "a", "email": "not-an-email", "password": "password123"}),
            json!({"username": "a", "email": "a@example.com", "password": "short"}),
        ];
        for body in cases {
            let (status, _, _) = call(&app, json_request("POST", "/api/register", None, Some(body))).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let (app, _) = app();
        register_alice(&app).await;

        let (status, _, _) = call(
            &app,
            json_request(
                "POST",
                "/api/register",
                None,
                Some(json!({"username": "alice2", "email": "alice@example.com", "password": "password123"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let (app, state) = app();
        register_alice(&app).await;

        let (status, _, body) = call(
            &app,
            json_request(
                "POST",
                "/api/register",
                None,
                Some(json!({"username": " alice ", "email": "mallory@example.com", "password": "password123"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Username is already taken");

        let (status, _, _) = call(
            &app,
            json_request(
                "POST",
                "/api/login",
                None,
                Some(json!({"email": "mallory@example.com", "password": "password123"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(state
            .store
            .get_user_by_email("mallory@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_register_disabled() {
        let mut config = test_auth_config();
        config.allow_registration = false;
        let app = create_router(mock_server_state(Some(config)));

        let (status, _, _) = call(
            &app,
            json_request(
                "POST",
                "/api/register",
                None,
                Some(json!({"username": "a", "email": "a@example.com", "password": "password123"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_login_wrong_credentials() {
        let (app, _) = app();
        register_alice(&app).await;

        for (email, password) in [
            ("alice@example.com", "wrong-password"),
            ("nobody@example.com", "password123"),
        ] {
            let (status, _, body) = call(
                &app,
                json_request(
                    "POST",
                    "/api/login",
                    None,
                    Some(json!({"email": email, "password": password})),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["error"], "wrong credentials");
        }
    }

    #[tokio::test]
    async fn test_google_url() {
        let (app, _) = app();
        let (status, _, body) = call(
            &app,
            json_request("GET", "/api/session/oauth/google/url", None, None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["authUrl"]
            .as_str()
            .unwrap()
            .starts_with("https://accounts.google.com/o/oauth2/v2/auth"));

        let mut config = test_auth_config();
        config.google_client_id = None;
        let app = create_router(mock_server_state(Some(config)));
        let (status, _, _) = call(
            &app,
            json_request("GET", "/api/session/oauth/google/url", None, None),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_google_callback_requires_code() {
        let (app, _) = app();
        let (status, _, _) = call(
            &app,
            json_request("GET", "/api/session/oauth/google", None, None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    /// Router whose Google client talks to a local stub answering `profile`
    async fn google_app(
        profile: serde_json::Value,
    ) -> (axum::Router, TrackerState, wiremock::MockServer) {
        use crate::api::handlers::ServerState;
        use crate::auth::google::GoogleOAuthClient;
        use crate::neo4j::mock::MockStore;
        use crate::test_helpers::mock_app_state_with;
        use std::sync::Arc;
        use tokio_util::sync::CancellationToken;
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let google = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"access_token": "g-token"})),
            )
            .mount(&google)
            .await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile))
            .mount(&google)
            .await;

        let config = test_auth_config();
        let mut server_state = ServerState::new(
            mock_app_state_with(MockStore::new(), Some(config.clone())),
            CancellationToken::new(),
        );
        server_state.google = GoogleOAuthClient::from_config(&config).map(|c| {
            c.with_endpoints(
                format!("{}/token", google.uri()),
                format!("{}/userinfo", google.uri()),
            )
        });
        let state = Arc::new(server_state);
        (create_router(state.clone()), state, google)
    }

    #[tokio::test]
    async fn test_google_callback_sets_cookies_and_redirects() {
        let (app, state, _google) = google_app(json!({
            "email": "gina@example.com",
            "verified_email": true,
            "name": "gina",
            "picture": "https://example.com/gina.png"
        }))
        .await;

        let (status, headers, _) = call(
            &app,
            json_request("GET", "/api/session/oauth/google?code=abc", None, None),
        )
        .await;
        assert!(status.is_redirection());
        assert_eq!(
            headers.get(header::LOCATION).unwrap(),
            "http://localhost:3000/dashboard/overview"
        );
        let cookies: Vec<&str> = headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        assert_eq!(cookies.len(), 2);
        assert!(cookies.iter().any(|c| c.starts_with("accessToken=")));
        assert!(cookies.iter().any(|c| c.starts_with("refreshToken=")));

        let user = state
            .store
            .get_user_by_email("gina@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.username, "gina");
        assert_eq!(user.picture.as_deref(), Some("https://example.com/gina.png"));
    }

    #[tokio::test]
    async fn test_google_callback_rejects_taken_username() {
        let (app, state, _google) = google_app(json!({
            "email": "impostor@example.com",
            "email_verified": true,
            "name": "alice"
        }))
        .await;
        register_alice(&app).await;

        let (status, _, body) = call(
            &app,
            json_request("GET", "/api/session/oauth/google?code=abc", None, None),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Username is already taken");
        assert!(state
            .store
            .get_user_by_email("impostor@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_google_sign_in_keeps_existing_username() {
        let (app, state, _google) = google_app(json!({
            "email": "alice@example.com",
            "email_verified": true,
            "name": "Alice Liddell"
        }))
        .await;
        register_alice(&app).await;

        let (status, _, _) = call(
            &app,
            json_request("GET", "/api/session/oauth/google?code=abc", None, None),
        )
        .await;
        assert!(status.is_redirection());
        let user = state
            .store
            .get_user_by_email("alice@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn test_find_me_and_new_journey() {
        let (app, state) = app();
        let user = test_user("alice");
        state.store.create_user(&user).await.unwrap();
        let bearer = test_bearer_token(&user);

        let (status, _, body) = call(&app, json_request("GET", "/api/find-me", Some(&bearer), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], user.id.to_string());

        let (status, _, body) = call(
            &app,
            json_request(
                "PUT",
                "/api/new-journey",
                Some(&bearer),
                Some(json!({"journeyDuration": "2026-12-31", "allocatedTime": 120.5})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["journeyDuration"], "2026-12-31");
        assert_eq!(body["allocatedTime"], 120.5);

        for bad in [
            json!({"journeyDuration": "someday", "allocatedTime": 10}),
            json!({"journeyDuration": "2026-12-31", "allocatedTime": -1}),
        ] {
            let (status, _, _) =
                call(&app, json_request("PUT", "/api/new-journey", Some(&bearer), Some(bad))).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn test_find_me_unknown_user() {
        let (app, _) = app();
        let ghost = test_user("ghost");
        let (status, _, _) = call(
            &app,
            json_request("GET", "/api/find-me", Some(&test_bearer_token(&ghost)), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_log_out_invalidates_session() {
        let (app, state) = app();
        let user = test_user("alice");
        state.store.create_user(&user).await.unwrap();
        let issued = issue_session(state.store.as_ref(), &test_auth_config(), &user, "test")
            .await
            .unwrap();
        let bearer = format!("Bearer {}", issued.access_token);

        let (status, headers, body) =
            call(&app, json_request("GET", "/api/log-out", Some(&bearer), None)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body.is_null());
        assert_eq!(headers.get_all(header::SET_COOKIE).iter().count(), 2);

        let session = state.store.get_session(issued.session.id).await.unwrap().unwrap();
        assert!(!session.valid);
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let (app, _) = app();
        let (status, _, _) = call(&app, json_request("GET", "/api/find-me", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let token = encode_jwt(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "x@example.com",
            "x",
            "some-other-secret-that-is-32-chars!",
            60,
        )
        .unwrap();
        let (status, _, _) = call(
            &app,
            json_request("GET", "/api/find-me", Some(&format!("Bearer {}", token)), None),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
