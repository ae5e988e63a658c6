//! scribed - content generation server daemon
//!
//! An HTTP daemon that turns a title, outline, and keywords into an
//! illustrated article or short novel via hosted generation endpoints,
//! and serves everything generated so far.

pub mod api;
pub mod compose;
pub mod content;
pub mod db;
pub mod gateway;
pub mod generate;
pub mod record;
pub mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

use db::Database;
use gateway::GatewayClient;
use generate::Generator;
use record::Recorder;
use store::ContentStore;

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = "scribed.toml";

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Listen address
    pub bind_addr: SocketAddr,
    /// SQLite database path; in-memory when unset
    pub database: Option<String>,
    /// Base URL of the hosted model gateway
    pub gateway_url: String,
    /// Optional bearer token for the gateway
    pub gateway_api_key: Option<String>,
    /// Model used for chat completions
    pub text_model: String,
    /// Model used for image generation
    pub image_model: String,
    /// Images requested per generation
    pub image_count: u32,
    /// Recording endpoint; recording disabled when unset
    pub record_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".parse().unwrap(),
            database: None,
            gateway_url: "https://api.openai.com/v1".to_string(),
            gateway_api_key: None,
            text_model: "gpt-4o".to_string(),
            image_model: "dall-e-3".to_string(),
            image_count: 1,
            record_url: None,
        }
    }
}

impl Config {
    /// Load configuration: defaults, then a TOML file, then `SCRIBED_*`
    /// environment variables
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.unwrap_or(CONFIG_FILE)))
            .merge(Env::prefixed("SCRIBED_"))
            .extract()?;
        Ok(config)
    }
}

/// The scribed server instance
pub struct Server {
    config: Config,
    db: Arc<Database>,
    store: Arc<ContentStore>,
    generator: Arc<Generator>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Server {
    /// Create a new server instance
    pub async fn new(config: Config) -> Result<Self> {
        let db = Arc::new(Database::new(config.database.as_deref()).await?);
        let store = Arc::new(ContentStore::load(db.pool().clone()).await?);
        let gateway = Arc::new(GatewayClient::new(&config));
        let recorder = Arc::new(Recorder::new(config.record_url.clone()));
        let generator = Arc::new(Generator::new(
            gateway,
            store.clone(),
            recorder,
            config.image_count,
        ));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            config,
            db,
            store,
            generator,
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Get the database handle
    pub fn db(&self) -> Arc<Database> {
        self.db.clone()
    }

    /// Get the content store
    pub fn store(&self) -> Arc<ContentStore> {
        self.store.clone()
    }

    /// Build the router
    fn router(&self) -> axum::Router {
        api::router(self.db.clone(), self.store.clone(), self.generator.clone())
    }

    /// Run the server until shutdown
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        let local_addr = listener.local_addr()?;
        info!("scribed listening on {}", local_addr);

        let router = self.router();
        let mut shutdown_rx = self.shutdown_rx.clone();

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown_rx.changed().await.ok();
            })
            .await?;

        info!("scribed shutdown complete");
        Ok(())
    }

    /// Signal the server to shutdown
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Get the configured bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }
}
