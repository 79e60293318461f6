//! Block value objects.

use serde::Serialize;

use crate::domain::foundation::BlockId;

/// Deepest heading level the docx block model supports.
pub const MAX_HEADING_LEVEL: u8 = 9;

/// Block type, reduced to what traversal and outlining care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// The document's own page block.
    Page,
    /// Plain text paragraph.
    Paragraph,
    /// Heading with a level in `1..=9`.
    Heading(u8),
    /// Lists, code, quotes, tables and everything else.
    Other,
}

impl BlockKind {
    /// Maps a Feishu `block_type` number.
    ///
    /// `1` is the page, `2` text, `3..=11` heading1..heading9.
    pub fn from_feishu_type(block_type: i64) -> Self {
        match block_type {
            1 => BlockKind::Page,
            2 => BlockKind::Paragraph,
            3..=11 => BlockKind::Heading((block_type - 2) as u8),
            _ => BlockKind::Other,
        }
    }

    /// Creates a heading kind, `None` when the level is outside `1..=9`.
    pub fn heading(level: u8) -> Option<Self> {
        (1..=MAX_HEADING_LEVEL)
            .contains(&level)
            .then_some(BlockKind::Heading(level))
    }

    pub fn heading_level(&self) -> Option<u8> {
        match self {
            BlockKind::Heading(level) => Some(*level),
            _ => None,
        }
    }
}

/// One block of a document as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub block_id: BlockId,
    /// `None` for the page block.
    pub parent_id: Option<BlockId>,
    pub kind: BlockKind,
    /// Plain-text rendering of the inline runs.
    pub text: String,
    /// Child ids in rendering order.
    pub children: Vec<BlockId>,
}

impl Block {
    pub fn new(block_id: BlockId, kind: BlockKind) -> Self {
        Self {
            block_id,
            parent_id: None,
            kind,
            text: String::new(),
            children: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent_id: BlockId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_children(mut self, children: Vec<BlockId>) -> Self {
        self.children = children;
        self
    }

    pub fn is_heading(&self) -> bool {
        self.kind.heading_level().is_some()
    }
}
