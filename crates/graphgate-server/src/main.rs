//! Binary entry point for the graphgate HTTP gateway.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use graphgate_core::GatewayConfig;
use graphgate_graph::{GraphClient, GraphConfig};
use graphgate_server::{create_router, AppState};

#[derive(Parser)]
#[command(name = "graphgate")]
#[command(about = "HTTP CRUD gateway over a Neo4j property graph")]
struct Cli {
    /// Config file prefix (default: graphgate).
    #[arg(short, long, default_value = "graphgate")]
    config: String,

    /// Override the listen port from config.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).json().init();

    let cli = Cli::parse();
    let mut config = GatewayConfig::load(&cli.config)?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    // One pooled client for the whole process; sessions are drawn per request.
    let graph = GraphClient::connect(&GraphConfig::from(&config.neo4j)).await?;
    let app = create_router(AppState::new(graph));

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown requested");
}
