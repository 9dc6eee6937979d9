//! Task Master - Main Server
//!
//! Learning tracker backend with roadmap trees, a daily task board and a quiz bot.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use task_master::{roadmap::RoadmapManager, AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "task-master")]
#[command(about = "Learning tracker server")]
struct Cli {
    /// Path to a YAML config file (environment variables still win)
    #[arg(short, long, global = true, env = "TASK_MASTER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to listen on (overrides config.yaml and SERVER_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print a user's roadmap tree as JSON
    Tree {
        /// Owner of the roadmap
        username: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,task_master=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_yaml_and_env(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server_port = port;
            }
            task_master::start_server(config).await
        }
        Commands::Tree { username } => print_tree(config, &username).await,
    }
}

async fn print_tree(config: Config, username: &str) -> Result<()> {
    let state = AppState::new(config).await?;
    tracing::info!("Connected to Neo4j");

    let roadmap = RoadmapManager::new(state.store.clone());
    match roadmap.tree(username).await? {
        Some(tree) => println!("{}", serde_json::to_string_pretty(&tree)?),
        None => tracing::info!("{} has no roadmap yet", username),
    }

    Ok(())
}
