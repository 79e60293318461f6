//! WriteDocHandler - Command handler for inserting text into a document.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::document::{BlockTree, InsertPosition, WriteRequest};
use crate::domain::foundation::{BlockId, DocsError, DocumentId};
use crate::ports::DocsApi;

/// Command to write text into a document.
#[derive(Debug, Clone)]
pub struct WriteDocCommand {
    pub document_id: DocumentId,
    pub content: String,
    /// `-1` appends; `i >= 0` inserts before the top-level block at `i`.
    pub index: i64,
}

/// Result of a successful write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteDocResult {
    pub document_id: DocumentId,
    /// Top-level position of the first inserted block.
    pub index: usize,
    pub inserted_count: usize,
    pub block_ids: Vec<BlockId>,
    pub content_length: usize,
}

/// Handler for document writes.
pub struct WriteDocHandler {
    api: Arc<dyn DocsApi>,
}

impl WriteDocHandler {
    pub fn new(api: Arc<dyn DocsApi>) -> Self {
        Self { api }
    }

    pub async fn handle(&self, cmd: WriteDocCommand) -> Result<WriteDocResult, DocsError> {
        // 1. Validate input before touching the service
        let request = WriteRequest::new(cmd.document_id, &cmd.content, cmd.index)?;

        // 2. Read current structure (a missing document fails here)
        let blocks = self.api.get_document_blocks(&request.document_id).await?;
        let tree = BlockTree::build(request.document_id.root_block(), blocks)?;

        // 3. Resolve the caller index against the top-level blocks
        let existing = tree.top_level_count();
        let position = InsertPosition::resolve(request.index, existing)?;

        // 4. Insert as one contiguous run
        let block_ids = self
            .api
            .insert_blocks(&request.document_id, position, &request.paragraphs)
            .await?;

        tracing::debug!(
            document = %request.document_id,
            requested_index = request.index,
            existing,
            inserted = block_ids.len(),
            "Wrote paragraphs"
        );

        Ok(WriteDocResult {
            index: position.offset(existing),
            inserted_count: block_ids.len(),
            block_ids,
            content_length: request.content_length,
            document_id: request.document_id,
        })
    }
}
