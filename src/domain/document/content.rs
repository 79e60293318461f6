//! Flattened plain-text rendering of a document.

use serde::Serialize;

use super::tree::BlockTree;
use crate::domain::foundation::{DocumentId, ValidationError};

pub const DEFAULT_MAX_BLOCKS: i64 = 2000;
pub const DEFAULT_MAX_CHARS: i64 = 20000;

/// Bounds applied while rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderLimits {
    max_blocks: usize,
    max_chars: usize,
}

impl RenderLimits {
    pub fn new(max_blocks: i64, max_chars: i64) -> Result<Self, ValidationError> {
        if max_blocks < 1 {
            return Err(ValidationError::out_of_range("max_blocks", 1, i64::MAX, max_blocks));
        }
        if max_chars < 1 {
            return Err(ValidationError::out_of_range("max_chars", 1, i64::MAX, max_chars));
        }
        Ok(Self {
            max_blocks: usize::try_from(max_blocks).unwrap_or(usize::MAX),
            max_chars: usize::try_from(max_chars).unwrap_or(usize::MAX),
        })
    }

    pub fn max_blocks(&self) -> usize {
        self.max_blocks
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }
}

impl Default for RenderLimits {
    fn default() -> Self {
        Self {
            max_blocks: DEFAULT_MAX_BLOCKS as usize,
            max_chars: DEFAULT_MAX_CHARS as usize,
        }
    }
}

/// Rendered text of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentContent {
    pub document_id: DocumentId,
    /// Blocks in the document, excluding the page block.
    pub block_count: usize,
    /// Characters of block text included in `content` (separators excluded).
    pub text_length: usize,
    pub content: String,
    pub truncated: bool,
}

/// Renders non-empty block texts in document order, one per line.
///
/// Stops after `max_blocks` blocks or once `max_chars` characters of text
/// have been taken; the block that crosses the character limit is cut.
pub fn render_content(
    document_id: DocumentId,
    tree: &BlockTree,
    limits: RenderLimits,
) -> DocumentContent {
    let texts = tree.preorder().map(|block| block.text.as_str());
    build(document_id, texts, tree.len(), limits)
}

/// Applies the same limits to the service's own plain-text rendering,
/// treating each line as one block.
pub fn render_plain_text(document_id: DocumentId, raw: &str, limits: RenderLimits) -> DocumentContent {
    let lines: Vec<&str> = raw.lines().collect();
    let block_count = lines.len();
    build(document_id, lines.into_iter(), block_count, limits)
}

fn build<'a>(
    document_id: DocumentId,
    texts: impl Iterator<Item = &'a str>,
    block_count: usize,
    limits: RenderLimits,
) -> DocumentContent {
    let mut lines: Vec<String> = Vec::new();
    let mut total_chars = 0usize;
    let mut truncated = block_count > limits.max_blocks();

    for text in texts.take(limits.max_blocks()) {
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        let remaining = limits.max_chars() - total_chars;
        if remaining == 0 {
            truncated = true;
            break;
        }
        let char_count = text.chars().count();
        if char_count > remaining {
            lines.push(text.chars().take(remaining).collect());
            total_chars += remaining;
            truncated = true;
            break;
        }
        lines.push(text.to_string());
        total_chars += char_count;
    }

    DocumentContent {
        document_id,
        block_count,
        text_length: total_chars,
        content: lines.join("\n"),
        truncated,
    }
}
