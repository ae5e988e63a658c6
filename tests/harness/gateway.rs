//! MockGateway - In-process model gateway stand-in
//!
//! Serves the chat-completion and image-generation endpoints the daemon
//! calls, plus a recording endpoint, on a random local port. Responses are
//! canned and adjustable per test; every recording payload is captured for
//! assertions.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Adjustable behavior and captured traffic
#[derive(Default)]
struct GatewayState {
    /// Prose returned by the chat endpoint
    prose: Mutex<String>,
    /// Image URLs returned by the image endpoint
    image_urls: Mutex<Vec<String>>,
    /// Fail the chat endpoint with a 500
    fail_chat: AtomicBool,
    /// Fail the image endpoint with a 500
    fail_images: AtomicBool,
    /// Return a shape the daemon cannot parse from the chat endpoint
    malformed_chat: AtomicBool,
    /// Delay applied before the chat response, in milliseconds
    chat_delay_ms: AtomicU64,
    /// Captured recording payloads
    recorded: Mutex<Vec<serde_json::Value>>,
}

/// Mock model gateway plus recording endpoint
pub struct MockGateway {
    pub addr: SocketAddr,
    state: Arc<GatewayState>,
    handle: JoinHandle<()>,
}

impl MockGateway {
    /// Start the mock on a random port
    pub async fn start() -> Result<Self> {
        let state = Arc::new(GatewayState {
            prose: Mutex::new("生成された本文。".to_string()),
            image_urls: Mutex::new(vec!["https://images.example/0.png".to_string()]),
            ..Default::default()
        });

        let router = Router::new()
            .route("/chat/completions", post(chat_completions))
            .route("/images/generations", post(image_generations))
            .route("/record", post(record))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self {
            addr,
            state,
            handle,
        })
    }

    /// Base URL for the daemon's `gateway_url` config
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// URL for the daemon's `record_url` config
    pub fn record_url(&self) -> String {
        format!("http://{}/record", self.addr)
    }

    /// Set the prose the chat endpoint returns
    pub fn set_prose(&self, prose: &str) {
        *self.state.prose.lock().unwrap() = prose.to_string();
    }

    /// Set the image URLs the image endpoint returns
    pub fn set_image_urls(&self, urls: &[&str]) {
        *self.state.image_urls.lock().unwrap() =
            urls.iter().map(|u| u.to_string()).collect();
    }

    /// Make the chat endpoint fail with a 500
    pub fn set_chat_failure(&self, fail: bool) {
        self.state.fail_chat.store(fail, Ordering::SeqCst);
    }

    /// Make the image endpoint fail with a 500
    pub fn set_image_failure(&self, fail: bool) {
        self.state.fail_images.store(fail, Ordering::SeqCst);
    }

    /// Make the chat endpoint return an unparsable shape
    pub fn set_chat_malformed(&self, malformed: bool) {
        self.state.malformed_chat.store(malformed, Ordering::SeqCst);
    }

    /// Delay chat responses (for exercising the busy flag)
    pub fn set_chat_delay(&self, delay: Duration) {
        self.state
            .chat_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// All payloads received by the recording endpoint
    pub fn recorded(&self) -> Vec<serde_json::Value> {
        self.state.recorded.lock().unwrap().clone()
    }
}

impl Drop for MockGateway {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn chat_completions(State(state): State<Arc<GatewayState>>) -> impl IntoResponse {
    let delay = state.chat_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    if state.fail_chat.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "model overloaded"})),
        );
    }

    if state.malformed_chat.load(Ordering::SeqCst) {
        return (
            StatusCode::OK,
            Json(serde_json::json!({"unexpected": "shape"})),
        );
    }

    let prose = state.prose.lock().unwrap().clone();
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "choices": [
                {"message": {"role": "assistant", "content": prose}}
            ]
        })),
    )
}

async fn image_generations(State(state): State<Arc<GatewayState>>) -> impl IntoResponse {
    if state.fail_images.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "image model overloaded"})),
        );
    }

    let data: Vec<serde_json::Value> = state
        .image_urls
        .lock()
        .unwrap()
        .iter()
        .map(|url| serde_json::json!({"url": url}))
        .collect();
    (StatusCode::OK, Json(serde_json::json!({"data": data})))
}

async fn record(
    State(state): State<Arc<GatewayState>>,
    Json(payload): Json<serde_json::Value>,
) -> impl IntoResponse {
    state.recorded.lock().unwrap().push(payload);
    StatusCode::OK
}
