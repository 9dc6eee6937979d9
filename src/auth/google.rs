//! Sign-in with Google
//!
//! The browser is sent to the consent page, Google calls back with a one-time
//! `code`, and the server trades that code for the account's profile.

use anyhow::{bail, Context, Result};
use reqwest::Response;
use serde::Deserialize;

use crate::AuthConfig;

/// Google profile of the account that signed in
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleUserInfo {
    pub email: String,
    /// Display name, used as the username
    pub name: String,
    pub picture: Option<String>,
    /// The v3 endpoint answers `email_verified`, the v2 one `verified_email`
    #[serde(default, alias = "verified_email")]
    pub email_verified: bool,
}

/// Client for Google's authorization-code exchange
pub struct GoogleOAuthClient {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    token_url: String,
    userinfo_url: String,
    http_client: reqwest::Client,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

impl GoogleOAuthClient {
    /// Create a Google OAuth client, or `None` when Google sign-in is not configured.
    pub fn from_config(config: &AuthConfig) -> Option<Self> {
        if !config.has_google() {
            return None;
        }
        Some(Self {
            client_id: config.google_client_id.clone()?,
            client_secret: config.google_client_secret.clone()?,
            redirect_uri: config.google_redirect_uri.clone()?,
            token_url: GOOGLE_TOKEN_URL.to_string(),
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
            http_client: reqwest::Client::new(),
        })
    }

    /// Point the code exchange at other token and userinfo endpoints.
    pub fn with_endpoints(mut self, token_url: impl Into<String>, userinfo_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self.userinfo_url = userinfo_url.into();
        self
    }

    /// Consent page URL; Google answers on `redirect_uri?code=...`
    pub fn auth_url(&self) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            GOOGLE_AUTH_URL,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(
                "https://www.googleapis.com/auth/userinfo.profile https://www.googleapis.com/auth/userinfo.email"
            ),
        )
    }

    /// Trade the callback `code` for the account's profile
    pub async fn exchange_code(&self, code: &str) -> Result<GoogleUserInfo> {
        let token_response = self
            .http_client
            .post(&self.token_url)
            .form(&[
                ("code", code),
                ("client_id", &self.client_id),
                ("client_secret", &self.client_secret),
                ("redirect_uri", &self.redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .context("Failed to request Google token")?;

        let token: TokenResponse = ensure_success(token_response, "token exchange")
            .await?
            .json()
            .await
            .context("Failed to parse Google token response")?;

        let userinfo_response = self
            .http_client
            .get(&self.userinfo_url)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .context("Failed to request Google userinfo")?;

        ensure_success(userinfo_response, "userinfo fetch")
            .await?
            .json()
            .await
            .context("Failed to parse Google userinfo response")
    }
}

async fn ensure_success(response: Response, step: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    bail!("Google {} failed ({}): {}", step, status, body)
}

// ============================================================================
// Tests
// ============================================================================
