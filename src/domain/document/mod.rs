//! Document module - Blocks, the block tree and what is derived from it.
//!
//! - `block` - block value objects and type mapping
//! - `tree` - validated arena with pre-order traversal
//! - `outline` - heading hierarchy
//! - `content` - flattened text rendering
//! - `write` - write requests and insertion positions

mod block;
mod content;
mod outline;
mod tree;
mod write;

pub use block::{Block, BlockKind, MAX_HEADING_LEVEL};
pub use content::{
    render_content, render_plain_text, DocumentContent, RenderLimits, DEFAULT_MAX_BLOCKS,
    DEFAULT_MAX_CHARS,
};
pub use outline::{extract_outline, OutlineEntry};
pub use tree::BlockTree;
pub use write::{split_paragraphs, InsertPosition, WriteRequest, APPEND_INDEX};
