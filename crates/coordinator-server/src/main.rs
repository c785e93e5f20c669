//! Coordinator server entrypoint: loads configuration, bootstraps every
//! adapter, and serves the chat/indexing surface over HTTP and WebSocket.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use coordinator_infrastructure::config::CoordinatorConfig;
use coordinator_infrastructure::logging::init_logging;

/// The coordinator: fuses the indexing pipeline, the tool-call chat
/// orchestrator, and sub-agent spawning behind one process.
#[derive(Parser)]
#[command(name = "coordinator-server")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Path to an optional TOML configuration file, overlaid by environment
    /// variables (the environment always wins).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind the HTTP/WebSocket listener to.
    #[arg(long, default_value = "0.0.0.0:8787")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = CoordinatorConfig::load(cli.config.as_deref())?;
    let state = coordinator_server::bootstrap(config).await?;
    let app = coordinator_server::routes::router(state);

    let bind = cli.bind;
    info!(%bind, "listening");
    let listener = tokio::net::TcpListener::bind(bind).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
