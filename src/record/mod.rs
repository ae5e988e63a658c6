//! Recording notification
//!
//! After a successful generation the full content item is posted to an
//! external recording endpoint. Delivery is best-effort: failures are
//! logged and never affect the generation result. The response body is
//! not consumed.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use crate::content::ContentItem;

/// Best-effort client for the recording endpoint
#[derive(Debug)]
pub struct Recorder {
    client: Client,
    /// Target URL; recording is disabled when unset
    endpoint: Option<String>,
}

impl Recorder {
    /// Create a new recorder
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("failed to build HTTP client"),
            endpoint,
        }
    }

    /// Whether a recording endpoint is configured
    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Post the item to the recording endpoint, swallowing failures
    pub async fn record(&self, item: &ContentItem) {
        let Some(url) = &self.endpoint else {
            return;
        };

        match self.client.post(url).json(item).send().await {
            Ok(response) if response.status().is_success() => {
                debug!("Recorded content {}", item.id);
            }
            Ok(response) => {
                warn!(
                    "Recording endpoint returned status {} for content {}",
                    response.status(),
                    item.id
                );
            }
            Err(e) => {
                warn!("Recording call failed for content {}: {}", item.id, e);
            }
        }
    }
}
