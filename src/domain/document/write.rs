//! Write requests and insertion position policy.

use serde::Serialize;

use crate::domain::foundation::{DocumentId, ValidationError};

/// Index value meaning "append after the last block".
pub const APPEND_INDEX: i64 = -1;

/// Where new blocks go among the document's top-level blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertPosition {
    /// After the last existing block.
    End,
    /// Before the block currently at this position.
    At(usize),
}

impl InsertPosition {
    /// Resolves a caller index against the current top-level block count.
    ///
    /// `-1` and any index at or past the end append; other indexes insert
    /// in place.
    pub fn resolve(index: i64, existing: usize) -> Result<Self, ValidationError> {
        if index == APPEND_INDEX {
            return Ok(InsertPosition::End);
        }
        if index < 0 {
            return Err(ValidationError::out_of_range("index", APPEND_INDEX, i64::MAX, index));
        }
        match usize::try_from(index) {
            Ok(i) if i < existing => Ok(InsertPosition::At(i)),
            _ => Ok(InsertPosition::End),
        }
    }

    /// Zero-based position the first new block ends up at.
    pub fn offset(&self, existing: usize) -> usize {
        match self {
            InsertPosition::End => existing,
            InsertPosition::At(i) => (*i).min(existing),
        }
    }
}

/// A validated request to write text into a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRequest {
    pub document_id: DocumentId,
    /// One entry per paragraph block to create, in caller order.
    pub paragraphs: Vec<String>,
    /// Raw caller index; resolved once the block count is known.
    pub index: i64,
    /// Characters of the original content.
    pub content_length: usize,
}

impl WriteRequest {
    /// Validates the request and splits the content into paragraphs.
    pub fn new(document_id: DocumentId, content: &str, index: i64) -> Result<Self, ValidationError> {
        if index < APPEND_INDEX {
            return Err(ValidationError::out_of_range("index", APPEND_INDEX, i64::MAX, index));
        }
        let paragraphs = split_paragraphs(content);
        if paragraphs.is_empty() {
            return Err(ValidationError::empty_field("content"));
        }
        Ok(Self {
            document_id,
            paragraphs,
            index,
            content_length: content.chars().count(),
        })
    }
}

/// Splits text on line breaks, dropping blank lines.
pub fn split_paragraphs(content: &str) -> Vec<String> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}
