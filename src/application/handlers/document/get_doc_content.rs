//! GetDocContentHandler - Query handler rendering a document as plain text.

use std::sync::Arc;

use crate::domain::document::{
    render_content, render_plain_text, BlockTree, DocumentContent, RenderLimits,
};
use crate::domain::foundation::{DocsError, DocumentId};
use crate::ports::DocsApi;

/// Query to read a document's text.
#[derive(Debug, Clone)]
pub struct GetDocContentQuery {
    pub document_id: DocumentId,
    pub limits: RenderLimits,
    /// Use the service's own rendering instead of walking the block tree.
    pub raw: bool,
}

/// Handler for content reads.
pub struct GetDocContentHandler {
    api: Arc<dyn DocsApi>,
}

impl GetDocContentHandler {
    pub fn new(api: Arc<dyn DocsApi>) -> Self {
        Self { api }
    }

    pub async fn handle(&self, query: GetDocContentQuery) -> Result<DocumentContent, DocsError> {
        let content = if query.raw {
            let text = self.api.get_document_plain_text(&query.document_id).await?;
            render_plain_text(query.document_id, &text, query.limits)
        } else {
            let blocks = self.api.get_document_blocks(&query.document_id).await?;
            let tree = BlockTree::build(query.document_id.root_block(), blocks)?;
            render_content(query.document_id, &tree, query.limits)
        };

        if content.truncated {
            tracing::debug!(
                document = %content.document_id,
                block_count = content.block_count,
                text_length = content.text_length,
                "Content truncated"
            );
        }
        Ok(content)
    }
}
