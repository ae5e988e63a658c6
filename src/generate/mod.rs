//! Content generation pipeline
//!
//! Drives one generation request end to end:
//! 1. Validate the user input
//! 2. LLM chat completion produces the prose (system prompt per content type)
//! 3. Image generation produces illustrations from title and keywords
//! 4. Prose and images are assembled into display blocks
//! 5. The finished item is appended to the store, then the recording
//!    endpoint is notified best-effort
//!
//! The two gateway calls are sequential: the image request is only issued
//! after the text response has been received and parsed. A single busy flag
//! allows at most one generation in flight per process.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

use crate::compose;
use crate::content::{parse_keywords, ContentItem, ContentType};
use crate::gateway::{ChatMessage, GatewayClient, GatewayError};
use crate::record::Recorder;
use crate::store::{ContentStore, StoreError};

/// System prompt for blog article generation
const ARTICLE_SYSTEM_PROMPT: &str = "SEO最適化された詳細なブログ記事を生成してください。タイトル、記事の内容、キーワードを考慮し、読者を引き付ける魅力的で豊富な内容を作成してください。少なくとも1000字以上の記事を生成し、実例や統計データを含めて、より深い洞察を提供してください。記事の構成は、はじめに、本文（主要なポイント3つ程度）、まとめの形式で作成してください。また、メタディスクリプションとOGPの説明文も含めてください。";

/// System prompt for short novel generation
const NOVEL_SYSTEM_PROMPT: &str = "魅力的な短編小説を生成してください。タイトル、あらすじ、キーワードを考慮し、読者を引き付ける物語を作成してください。キャラクターの発展、プロットの展開、テーマの探求を含め、印象的な短編小説を書いてください。";

/// One generation request, as submitted by the user
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub title: String,
    /// Outline for articles, synopsis for novels
    pub outline: String,
    /// Raw comma-separated keywords
    #[serde(default)]
    pub keywords: String,
    pub content_type: ContentType,
}

/// Generation pipeline errors, by failure class
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("a generation is already in progress")]
    Busy,

    #[error("{0}")]
    Validation(&'static str),

    #[error("generation failed: {0}")]
    Gateway(#[from] GatewayError),

    #[error("failed to store generated content: {0}")]
    Storage(#[from] StoreError),
}

/// Generation orchestrator
pub struct Generator {
    gateway: Arc<GatewayClient>,
    store: Arc<ContentStore>,
    recorder: Arc<Recorder>,
    /// Guards against re-entrant generation requests
    busy: AtomicBool,
    /// Number of images requested per generation
    image_count: u32,
}

impl Generator {
    /// Create a new generator
    pub fn new(
        gateway: Arc<GatewayClient>,
        store: Arc<ContentStore>,
        recorder: Arc<Recorder>,
        image_count: u32,
    ) -> Self {
        Self {
            gateway,
            store,
            recorder,
            busy: AtomicBool::new(false),
            image_count,
        }
    }

    /// Whether a generation is currently in flight
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Run one generation request to completion
    pub async fn generate(&self, request: GenerateRequest) -> Result<ContentItem, GenerateError> {
        validate(&request)?;

        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(GenerateError::Busy);
        }

        let result = self.run(request).await;
        self.busy.store(false, Ordering::SeqCst);

        if let Err(e) = &result {
            error!("Content generation failed: {}", e);
        }
        result
    }

    async fn run(&self, request: GenerateRequest) -> Result<ContentItem, GenerateError> {
        info!(
            "Generating {} '{}'",
            request.content_type.as_str(),
            request.title
        );

        let messages = vec![
            ChatMessage::system(system_prompt(request.content_type)),
            ChatMessage::user(&user_prompt(&request)),
        ];
        let prose = self.gateway.chat(messages).await?;

        // Image generation only starts once the prose has been received
        let images = self
            .gateway
            .generate_images(
                &image_prompt(&request.title, &request.keywords),
                self.image_count,
            )
            .await?;

        let blocks = compose::assemble(&prose, &images);
        let item = ContentItem::new(
            &request.title,
            parse_keywords(&request.keywords),
            request.content_type,
            blocks,
        );

        self.store.append(item.clone()).await?;
        self.recorder.record(&item).await;

        info!("Generated content {} ({} blocks)", item.id, item.content.len());
        Ok(item)
    }
}

/// Precondition check before any external call is issued
fn validate(request: &GenerateRequest) -> Result<(), GenerateError> {
    if request.title.trim().is_empty() {
        return Err(GenerateError::Validation("title must not be empty"));
    }
    if request.outline.trim().is_empty() {
        return Err(GenerateError::Validation("outline must not be empty"));
    }
    Ok(())
}

fn system_prompt(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Article => ARTICLE_SYSTEM_PROMPT,
        ContentType::Novel => NOVEL_SYSTEM_PROMPT,
    }
}

/// Labeled user payload: title, outline-or-synopsis, keywords
fn user_prompt(request: &GenerateRequest) -> String {
    let outline_label = match request.content_type {
        ContentType::Novel => "あらすじ",
        ContentType::Article => "内容",
    };
    format!(
        "タイトル: {}\n{}: {}\nキーワード: {}",
        request.title, outline_label, request.outline, request.keywords
    )
}

fn image_prompt(title: &str, keywords: &str) -> String {
    format!("{}に関連する画像。キーワード: {}", title, keywords)
}
