//! Task Master
//!
//! Backend for a personal learning tracker:
//! - Roadmap note trees stored as flat records with materialized paths
//! - Daily task board with day-finish archiving into history
//! - Progress statistics over the history
//! - A quiz bot that remembers questions per topic
//! - Password and Google OAuth sign-in with JWT access tokens

pub mod api;
pub mod auth;
pub mod bot;
pub mod neo4j;
pub mod roadmap;
pub mod stats;
pub mod tasks;

#[cfg(test)]
pub(crate) mod test_helpers;

use anyhow::Result;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: ServerYamlConfig,
    pub neo4j: Neo4jYamlConfig,
    /// Auth section - if absent, auth_config will be None (deny-by-default)
    pub auth: Option<AuthConfig>,
}

/// Server configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerYamlConfig {
    pub port: u16,
    /// Deadline for a single roadmap mutation
    pub mutation_timeout_secs: u64,
}

impl Default for ServerYamlConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            mutation_timeout_secs: 10,
        }
    }
}

/// Neo4j configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Neo4jYamlConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
}

impl Default for Neo4jYamlConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".into(),
            user: "neo4j".into(),
            password: "task-master".into(),
        }
    }
}

/// Authentication configuration.
///
/// Password sign-in is always available once this section exists. Google
/// sign-in is enabled when all three `google_*` fields are set.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// JWT signing secret (HS256)
    pub jwt_secret: String,
    /// Access token lifetime in seconds (default: 86400 = 1 day)
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
    /// Refresh token lifetime in seconds (default: 2592000 = 30 days)
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry_secs: u64,
    /// bcrypt work factor for new password hashes
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
    /// Frontend URL for CORS and the post-OAuth redirect (e.g. "http://localhost:3000")
    pub frontend_url: Option<String>,
    /// Allow new user registration via POST /api/register (default: true)
    #[serde(default = "default_allow_registration")]
    pub allow_registration: bool,

    #[serde(default)]
    pub google_client_id: Option<String>,
    #[serde(default)]
    pub google_client_secret: Option<String>,
    #[serde(default)]
    pub google_redirect_uri: Option<String>,
}

fn default_access_token_expiry() -> u64 {
    86400
}

fn default_refresh_token_expiry() -> u64 {
    2_592_000
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

fn default_allow_registration() -> bool {
    true
}

impl AuthConfig {
    /// Returns true if every Google OAuth field is present and non-empty.
    pub fn has_google(&self) -> bool {
        [
            &self.google_client_id,
            &self.google_client_secret,
            &self.google_redirect_uri,
        ]
        .iter()
        .all(|f| f.as_deref().is_some_and(|s| !s.is_empty()))
    }
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,
    pub server_port: u16,
    pub mutation_timeout: Duration,
    /// Auth config - None means deny-by-default (no auth section in YAML)
    pub auth_config: Option<AuthConfig>,
}

impl Config {
    /// Load configuration from environment variables and `config.yaml` in CWD.
    pub fn from_env() -> Result<Self> {
        Self::from_yaml_and_env(None)
    }

    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let yaml = Self::load_yaml(yaml_path);

        let auth_config = yaml.auth.map(|mut auth| {
            if let Ok(url) = std::env::var("FRONTEND_URL") {
                auth.frontend_url = Some(url);
            }
            auth
        });

        Ok(Self {
            neo4j_uri: std::env::var("NEO4J_URI").unwrap_or(yaml.neo4j.uri),
            neo4j_user: std::env::var("NEO4J_USER").unwrap_or(yaml.neo4j.user),
            neo4j_password: std::env::var("NEO4J_PASSWORD").unwrap_or(yaml.neo4j.password),
            server_port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(yaml.server.port),
            mutation_timeout: Duration::from_secs(yaml.server.mutation_timeout_secs),
            auth_config,
        })
    }

    /// Try to load and parse a YAML config file. Returns defaults on any failure.
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new("config.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn neo4j::DocumentStore>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Connect to Neo4j and build the application state
    pub async fn new(config: Config) -> Result<Self> {
        let store = Arc::new(
            neo4j::client::Neo4jClient::new(
                &config.neo4j_uri,
                &config.neo4j_user,
                &config.neo4j_password,
            )
            .await?,
        );

        Ok(Self {
            store,
            config: Arc::new(config),
        })
    }
}

/// Connect to the store, bind the port and serve until Ctrl+C.
pub async fn start_server(config: Config) -> Result<()> {
    let port = config.server_port;
    let state = AppState::new(config).await?;
    tracing::info!("Connected to Neo4j");

    if state.config.auth_config.is_none() {
        tracing::warn!("No auth section configured: every protected route will answer 403");
    }

    let shutdown = CancellationToken::new();
    let server_state = Arc::new(api::handlers::ServerState::new(state, shutdown.clone()));
    let app = api::create_router(server_state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("Listening on http://0.0.0.0:{}", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Waits for Ctrl+C, then cancels roadmap mutations still in flight
async fn shutdown_signal(shutdown: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("Shutdown signal received");
    }
    shutdown.cancel();
}

// ============================================================================
// Tests
// ============================================================================
