//! scribed - content generation server daemon

use anyhow::Result;
use clap::Parser;
use scribed::{Config, Server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Content generation server daemon
#[derive(Parser, Debug)]
#[command(name = "scribed", version, about = "Content generation server")]
struct Args {
    /// Listen address (overrides config)
    #[arg(long)]
    bind: Option<std::net::SocketAddr>,

    /// SQLite database path (overrides config; in-memory when unset)
    #[arg(long)]
    database: Option<String>,

    /// Config file path
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scribed=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(database) = args.database {
        config.database = Some(database);
    }

    // Create and run server
    let server = Server::new(config).await?;
    server.run().await?;

    Ok(())
}
