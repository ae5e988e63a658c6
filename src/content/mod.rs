//! Content domain types
//!
//! A `ContentItem` is one generated work (blog article or short novel)
//! together with its metadata and assembled display blocks.

use serde::{Deserialize, Serialize};

use crate::compose::DisplayBlock;

/// Kind of content to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// SEO blog article
    #[default]
    Article,
    /// Short novel
    Novel,
}

impl ContentType {
    /// Lowercase name, as used in URLs and serialized JSON
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Article => "article",
            ContentType::Novel => "novel",
        }
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<ContentType> {
        match s.to_lowercase().as_str() {
            "article" | "blog" => Some(ContentType::Article),
            "novel" | "story" => Some(ContentType::Novel),
            _ => None,
        }
    }
}

/// One generated work, as persisted and served to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    /// Derived path `/{type}s/{id}`, informational only
    pub url: String,
    pub title: String,
    pub content: Vec<DisplayBlock>,
    pub keywords: Vec<String>,
    /// Creation timestamp, RFC 3339
    pub date: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
}

impl ContentItem {
    /// Build a new item with a fresh ID and timestamp
    pub fn new(
        title: &str,
        keywords: Vec<String>,
        content_type: ContentType,
        content: Vec<DisplayBlock>,
    ) -> Self {
        let id = generate_id();
        let url = format!("/{}s/{}", content_type.as_str(), id);

        Self {
            id,
            url,
            title: title.to_string(),
            content,
            keywords,
            date: chrono::Utc::now().to_rfc3339(),
            content_type,
        }
    }
}

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate an opaque content ID: base-36 creation time (milliseconds)
/// followed by a random base-36 suffix
pub fn generate_id() -> String {
    use rand::Rng;

    let millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
    let mut id = to_base36(millis);

    let mut rng = rand::rng();
    for _ in 0..11 {
        id.push(BASE36[rng.random_range(0..36)] as char);
    }
    id
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).expect("base36 digits are ASCII")
}

/// Split a raw comma-separated keyword string into trimmed keywords.
/// Empty input yields an empty list; empty segments are kept as-is.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(',').map(|k| k.trim().to_string()).collect()
}
