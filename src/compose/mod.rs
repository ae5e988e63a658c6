//! Content assembly
//!
//! Merges a block of generated prose with a list of generated image
//! references into one ordered display sequence. Images are spread through
//! the paragraphs at a fixed spacing derived from the two counts.

use serde::{Deserialize, Serialize};

/// One unit of rendered output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DisplayBlock {
    /// A paragraph of generated prose
    Text { content: String },
    /// A generated illustration with accessibility text
    Image { src: String, alt: String },
}

/// Alt-text label prefix for placed images ("related image")
const IMAGE_ALT_LABEL: &str = "関連画像";

/// Interleave prose paragraphs with image references.
///
/// Paragraphs split on blank-line (`\n\n`) boundaries. After the paragraph
/// at index `i`, an image is placed when `i % spacing == 0` and images
/// remain, where `spacing = max(1, paragraphs / (images + 1))`. Images are
/// consumed in input order; alt text is a 1-based placement label.
pub fn assemble(prose: &str, images: &[String]) -> Vec<DisplayBlock> {
    if prose.is_empty() {
        return Vec::new();
    }

    let paragraphs: Vec<&str> = prose.split("\n\n").collect();
    let spacing = std::cmp::max(1, paragraphs.len() / (images.len() + 1));

    let mut blocks = Vec::with_capacity(paragraphs.len() + images.len());
    let mut placed = 0;

    for (i, paragraph) in paragraphs.iter().enumerate() {
        blocks.push(DisplayBlock::Text {
            content: (*paragraph).to_string(),
        });

        if i % spacing == 0 && placed < images.len() {
            blocks.push(DisplayBlock::Image {
                src: images[placed].clone(),
                alt: format!("{} {}", IMAGE_ALT_LABEL, placed + 1),
            });
            placed += 1;
        }
    }

    blocks
}
