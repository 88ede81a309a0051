use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use home_energy_api::auth::SessionRegistry;
use home_energy_api::database::Store;
use home_energy_api::AppState;

#[derive(Parser)]
#[command(name = "home-energy-api")]
#[command(about = "REST backend for home energy management")]
#[command(version)]
struct Cli {
    #[arg(long, help = "Address to bind (overrides HOME_ENERGY_API_HOST)")]
    host: Option<String>,

    #[arg(long, help = "Port to listen on (overrides HOME_ENERGY_API_PORT)")]
    port: Option<u16>,

    #[arg(long, help = "Path of the JSON data file (overrides HOME_ENERGY_DATABASE)")]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up HOME_ENERGY_DATABASE etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("home_energy_api=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = home_energy_api::config::config().clone();
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(path) = cli.database {
        config.storage.path = path;
    }
    info!("Starting Home Energy API in {:?} mode", config.environment);

    let store = Store::open(&config.storage.path, config.storage.pretty)
        .with_context(|| format!("failed to open {}", config.storage.path.display()))?;
    let state = AppState::new(store, SessionRegistry::new(config.security.token_bytes));

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!(addr = %bind_addr, data_file = %config.storage.path.display(), "Listening");

    axum::serve(listener, home_energy_api::app(state)).await?;
    Ok(())
}
