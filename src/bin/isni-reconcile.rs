//! Reconciliation service binary.
//!
//! Usage: isni-reconcile serve --bind 0.0.0.0:5000

use clap::{Parser, Subcommand};
use isni_reconcile::error::Result;
use isni_reconcile::server::{create_router, AppState};
use isni_reconcile::IsniClient;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "isni-reconcile", about = "ISNI reconciliation service", version)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the reconciliation HTTP service
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0:5000")]
        bind: SocketAddr,
        /// Disable the in-memory response cache
        #[arg(long)]
        no_cache: bool,
    },
    /// Run a single reconciliation query and print the candidates as JSON
    Search {
        /// Name to reconcile
        query: String,
        /// Search field id (falls back to name search if unknown)
        #[arg(short, long, default_value = "/isni/name")]
        field: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Serve { bind, no_cache } => {
            let client = if no_cache {
                IsniClient::new()
            } else {
                IsniClient::new().with_cache()
            };
            let app = create_router(AppState { client });

            tracing::info!("listening on {bind}");
            let listener = tokio::net::TcpListener::bind(bind).await?;
            axum::serve(listener, app).await?;
        }
        Commands::Search { query, field } => {
            let client = IsniClient::new();
            let candidates = client.search(&query, &field).await;
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({ "result": candidates }))
                    .unwrap_or_default()
            );
        }
    }

    Ok(())
}
