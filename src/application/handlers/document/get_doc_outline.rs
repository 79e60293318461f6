//! GetDocOutlineHandler - Query handler returning a document's headings.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::document::{extract_outline, BlockTree, OutlineEntry};
use crate::domain::foundation::{DocsError, DocumentId};
use crate::ports::DocsApi;

#[derive(Debug, Clone)]
pub struct GetDocOutlineQuery {
    pub document_id: DocumentId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocOutline {
    pub document_id: DocumentId,
    pub count: usize,
    pub outline: Vec<OutlineEntry>,
}

pub struct GetDocOutlineHandler {
    api: Arc<dyn DocsApi>,
}

impl GetDocOutlineHandler {
    pub fn new(api: Arc<dyn DocsApi>) -> Self {
        Self { api }
    }

    pub async fn handle(&self, query: GetDocOutlineQuery) -> Result<DocOutline, DocsError> {
        let blocks = self.api.get_document_blocks(&query.document_id).await?;
        let tree = BlockTree::build(query.document_id.root_block(), blocks)?;
        let outline = extract_outline(&tree);

        Ok(DocOutline {
            document_id: query.document_id,
            count: outline.len(),
            outline,
        })
    }
}
