//! Outline extraction - the heading hierarchy of a document.

use serde::Serialize;

use super::tree::BlockTree;
use crate::domain::foundation::BlockId;

/// One heading in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineEntry {
    /// Heading depth from the block type (heading1 = 1), not tree depth.
    pub level: u8,
    /// Trimmed heading text. Empty headings are kept.
    pub title: String,
    pub block_id: BlockId,
}

/// Extracts the outline of a tree.
///
/// Non-heading blocks contribute nothing themselves, but headings nested
/// under them (e.g. inside a quote container) are still found because the
/// traversal covers every block.
pub fn extract_outline(tree: &BlockTree) -> Vec<OutlineEntry> {
    tree.preorder()
        .filter_map(|block| {
            block.kind.heading_level().map(|level| OutlineEntry {
                level,
                title: block.text.trim().to_string(),
                block_id: block.block_id.clone(),
            })
        })
        .collect()
}
