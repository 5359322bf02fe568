//! Collection Server CLI
//!
//! Runs the HTTP services and helps prepare their configuration.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use schema_collections::auth::{hash_password, BasicAuth};
use schema_collections::files::JsonFileStore;
use schema_collections::patients::PatientQueue;
use schema_collections::shopping::ShoppingList;
use schema_collections::{router, AppState, CollectionStore, ServiceConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "collection-server")]
#[command(about = "Dynamic-schema collection store, shopping list and patient queue")]
struct Cli {
    /// Path to a config file (TOML)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Override the configured host
        #[arg(long)]
        host: Option<String>,
        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Hash a password for the [auth] section
    HashPassword {
        password: String,
    },

    /// Inspect or write the effective configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the effective configuration to a file
    Init {
        #[arg(short, long, default_value = "collections.toml")]
        output: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = ServiceConfig::load_from(cli.config.as_deref())
        .context("failed to load configuration")?;

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config).await
        }

        Commands::HashPassword { password } => {
            println!("{}", hash_password(&password)?);
            Ok(())
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                print!("{}", config.to_toml()?);
                Ok(())
            }
            ConfigAction::Init { output } => {
                config.save(&output)?;
                println!("✅ Configuration written to {}", output);
                Ok(())
            }
        },
    }
}

async fn serve(config: ServiceConfig) -> anyhow::Result<()> {
    let shopping = ShoppingList::new(JsonFileStore::new(&config.storage.shopping_list_file))?;
    shopping.init().await?;
    let patients = PatientQueue::new(JsonFileStore::new(&config.storage.patients_file))?;

    let state = AppState {
        collections: Arc::new(CollectionStore::new()),
        shopping: Arc::new(shopping),
        patients: Arc::new(patients),
        auth: BasicAuth::from_config(&config.auth)?.map(Arc::new),
    };

    let addr = config.bind_addr().context("invalid listen address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!(%addr, auth = state.auth.is_some(), "Collection server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Collection server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
