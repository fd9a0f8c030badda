use std::net::SocketAddr;

use announce_ai::{server, ServerConfig};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "announce-server")]
#[command(about = "School announcement drafting service", long_about = None)]
struct Cli {
    /// Address to listen on (overrides ANNOUNCE_BIND_ADDR)
    #[arg(short, long)]
    bind: Option<SocketAddr>,
    /// Text-generation endpoint (overrides ANNOUNCE_MODEL_URL)
    #[arg(long)]
    model_url: Option<String>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let mut config = ServerConfig::from_env()?;
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }
    if let Some(model_url) = cli.model_url {
        config.model_url = model_url;
    }
    tracing::info!(?config, "starting");

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutting down gracefully");
        }
        signal.cancel();
    });

    server::serve(config, shutdown).await?;
    Ok(())
}
