//! Content store
//!
//! Owns the ordered list of generated works, newest first, and mirrors it
//! to durable storage: a single key in the `kv_store` table holding the
//! whole list as JSON, fully rewritten on every append. Loaded once at
//! startup; callers never touch the table directly.
//!
//! Single-writer semantics: one daemon per database file. Concurrent
//! writers would race on the full-value overwrite (last writer wins).

use sqlx::SqlitePool;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::content::ContentItem;

/// Fixed storage key for the serialized content list
const STORE_KEY: &str = "posted_contents";

/// Content store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to serialize content list: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Durable store of generated content, newest first
pub struct ContentStore {
    pool: SqlitePool,
    items: RwLock<Vec<ContentItem>>,
}

impl ContentStore {
    /// Load the store from the database. An absent key or a value that no
    /// longer deserializes both start an empty list; the latter is logged.
    pub async fn load(pool: SqlitePool) -> Result<Self, StoreError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv_store WHERE key = ?")
            .bind(STORE_KEY)
            .fetch_optional(&pool)
            .await?;

        let items = match row {
            Some((value,)) => match serde_json::from_str::<Vec<ContentItem>>(&value) {
                Ok(items) => items,
                Err(e) => {
                    warn!("Stored content list is malformed, starting empty: {}", e);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        debug!("Loaded {} stored content items", items.len());

        Ok(Self {
            pool,
            items: RwLock::new(items),
        })
    }

    /// Prepend an item and rewrite the full list to durable storage.
    /// Returns the updated list, newest first.
    pub async fn append(&self, item: ContentItem) -> Result<Vec<ContentItem>, StoreError> {
        let mut items = self.items.write().await;

        let mut updated = Vec::with_capacity(items.len() + 1);
        updated.push(item);
        updated.extend(items.iter().cloned());

        let value = serde_json::to_string(&updated)?;
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(STORE_KEY)
        .bind(&value)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        *items = updated.clone();
        debug!("Stored content list now holds {} items", updated.len());

        Ok(updated)
    }

    /// All stored items, newest first
    pub async fn list(&self) -> Vec<ContentItem> {
        self.items.read().await.clone()
    }

    /// Look up one item by ID
    pub async fn get(&self, id: &str) -> Option<ContentItem> {
        self.items.read().await.iter().find(|i| i.id == id).cloned()
    }

    /// Number of stored items
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    /// Whether the store holds no items
    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}
