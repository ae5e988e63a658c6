//! Hosted model gateway integration
//!
//! Provides:
//! - LLM chat completions (OpenAI-compatible)
//! - Image generation
//!
//! Both calls go through one base URL. A bearer token is attached when an
//! API key is configured; hosted gateways with ambient authentication work
//! without one.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::Config;

/// Gateway call errors, by failure class
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("gateway returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("unexpected response shape: {0}")]
    Malformed(String),
}

/// Chat message for the LLM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: &str) -> Self {
        Self {
            role: "system".to_string(),
            content: content.to_string(),
        }
    }

    pub fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

/// Chat completion request
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Image generation request
#[derive(Debug, Serialize)]
struct ImageRequest {
    model: String,
    prompt: String,
    n: u32,
    size: String,
}

/// Image generation response
#[derive(Debug, Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: String,
}

/// Client for the hosted model gateway
#[derive(Debug)]
pub struct GatewayClient {
    /// HTTP client
    client: Client,
    /// API base URL
    base_url: String,
    /// Optional API key
    api_key: Option<String>,
    /// Model for chat completions
    text_model: String,
    /// Model for image generation
    image_model: String,
}

impl GatewayClient {
    /// Create a new gateway client from server configuration
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .expect("failed to build HTTP client"),
            base_url: config.gateway_url.trim_end_matches('/').to_string(),
            api_key: config.gateway_api_key.clone(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
        }
    }

    /// Send a chat completion request and return the generated prose
    pub async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String, GatewayError> {
        let request = ChatRequest {
            model: self.text_model.clone(),
            messages,
            max_tokens: 4096,
            temperature: 0.7,
        };

        debug!("Sending chat request for model {}", request.model);

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("Chat completion error: {} - {}", status, body);
            return Err(GatewayError::Status(status));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;

        chat_response
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| GatewayError::Malformed("no choices in response".to_string()))
    }

    /// Generate `n` images and return their references in order
    pub async fn generate_images(
        &self,
        prompt: &str,
        n: u32,
    ) -> Result<Vec<String>, GatewayError> {
        let request = ImageRequest {
            model: self.image_model.clone(),
            prompt: prompt.to_string(),
            n,
            size: "1024x1024".to_string(),
        };

        debug!("Sending image generation request for model {}", request.model);

        let mut builder = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("Image generation error: {} - {}", status, body);
            return Err(GatewayError::Status(status));
        }

        let image_response: ImageResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;

        Ok(image_response.data.into_iter().map(|d| d.url).collect())
    }
}
