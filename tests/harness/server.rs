//! TestServer - True end-to-end test harness
//!
//! Spawns the actual scribed binary on a random port with an on-disk SQLite
//! database. Uses a temporary directory for each test instance to ensure
//! isolation while exercising the complete server binary including CLI
//! parsing. Gateway and recording endpoints are pointed at a MockGateway.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use tempfile::TempDir;

use super::gateway::MockGateway;

/// Test harness that spawns the actual scribed binary on a random port
/// Uses on-disk SQLite in a temp directory for realistic testing
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    child: Child,
    /// Temp directory for the database (cleaned up on drop); None when the
    /// caller supplied its own database path
    _temp_dir: Option<TempDir>,
    /// Path to the database file
    pub db_path: PathBuf,
}

impl TestServer {
    /// Start a new test server instance wired to the given mock gateway
    pub async fn start(gateway: &MockGateway) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("test.db");
        Self::spawn(gateway, db_path, Some(temp_dir)).await
    }

    /// Start a test server against an existing database path (for restart
    /// scenarios); the caller owns the path's lifetime
    pub async fn start_with_db(gateway: &MockGateway, db_path: &Path) -> Result<Self> {
        Self::spawn(gateway, db_path.to_path_buf(), None).await
    }

    async fn spawn(
        gateway: &MockGateway,
        db_path: PathBuf,
        temp_dir: Option<TempDir>,
    ) -> Result<Self> {
        // Find a random available port
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        drop(listener);

        // Find the binary path
        let binary_path = find_binary_path()?;

        // Spawn the server process
        let child = Command::new(&binary_path)
            .arg("--bind")
            .arg(addr.to_string())
            .arg("--database")
            .arg(db_path.to_string_lossy().as_ref())
            .env("SCRIBED_GATEWAY_URL", gateway.base_url())
            .env("SCRIBED_RECORD_URL", gateway.record_url())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                anyhow::anyhow!("Failed to spawn scribed binary at {:?}: {}", binary_path, e)
            })?;

        // Wait for server to be ready
        let client = Client::builder().timeout(Duration::from_secs(5)).build()?;

        // Poll until server is ready (max 5 seconds to handle resource contention)
        let mut ready = false;
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            if client
                .get(format!("http://{}/health", addr))
                .send()
                .await
                .is_ok()
            {
                ready = true;
                break;
            }
        }

        if !ready {
            panic!("Server failed to start within 5 seconds");
        }

        Ok(Self {
            addr,
            client,
            child,
            _temp_dir: temp_dir,
            db_path,
        })
    }

    /// Get the base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .get(format!("{}{}", self.base_url(), path))
            .send()
            .await?)
    }

    /// Make a POST request with JSON body
    pub async fn post<T: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(format!("{}{}", self.base_url(), path))
            .json(body)
            .send()
            .await?)
    }
}

/// Find the scribed binary path
fn find_binary_path() -> Result<PathBuf> {
    // Check common locations
    let candidates = [
        // Debug build (most common for tests)
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("target/debug/scribed"),
        // Release build
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("target/release/scribed"),
        // Workspace root debug
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../target/debug/scribed"),
        // Workspace root release
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../target/release/scribed"),
    ];

    for path in &candidates {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    anyhow::bail!(
        "Could not find scribed binary. Run 'cargo build' first. Searched: {:?}",
        candidates
    )
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Kill the server process
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
