//! In-memory Docs API for testing.
//!
//! Provides a configurable implementation of the DocsApi port backed by
//! plain collections, so handlers and the dispatcher can be exercised
//! without network access.
//!
//! # Features
//!
//! - Seeded folders and documents
//! - Paged folder listings with opaque cursors
//! - Position-aware block insertion under the page block
//! - Error injection for resilience testing
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let api = InMemoryDocsApi::new()
//!     .with_folder("fld", vec![FolderEntry::new("doxA", "Notes", "docx")])
//!     .with_failure(ApiError::rate_limited("busy"));
//!
//! let page = api.list_folder_children(&folder, 10, None).await;
//! assert!(page.is_err());
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::document::{Block, BlockKind, InsertPosition};
use crate::domain::folder::{FolderEntry, FolderPage};
use crate::domain::foundation::{BlockId, DocumentId, FolderToken};
use crate::ports::{ApiError, CreatedDocument, DocsApi};

/// A recorded port call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Authenticate,
    ListFolder {
        folder: String,
        page_size: u32,
        cursor: Option<String>,
    },
    CreateDocument {
        folder: String,
        title: String,
    },
    GetBlocks {
        document: String,
    },
    InsertBlocks {
        document: String,
        position: InsertPosition,
        count: usize,
    },
    PlainText {
        document: String,
    },
}

impl ApiCall {
    /// Whether the call changes remote state.
    pub fn is_mutation(&self) -> bool {
        matches!(self, ApiCall::CreateDocument { .. } | ApiCall::InsertBlocks { .. })
    }
}

#[derive(Debug, Clone)]
struct StoredDocument {
    blocks: Vec<Block>,
}

#[derive(Debug, Default)]
struct State {
    folders: HashMap<String, Vec<FolderEntry>>,
    documents: HashMap<String, StoredDocument>,
    failures: VecDeque<ApiError>,
    scheduled: Vec<(usize, ApiError)>,
    calls: Vec<ApiCall>,
    next_id: u64,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{:04}", prefix, self.next_id)
    }
}

/// In-memory document service.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocsApi {
    state: Arc<Mutex<State>>,
}

impl InMemoryDocsApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a folder with listing rows, in listing order.
    pub fn with_folder(self, folder: impl Into<String>, entries: Vec<FolderEntry>) -> Self {
        self.state
            .lock()
            .unwrap()
            .folders
            .insert(folder.into(), entries);
        self
    }

    /// Seeds a document with its raw block list (page block included if wanted).
    pub fn with_document(self, document: impl Into<String>, blocks: Vec<Block>) -> Self {
        self.state.lock().unwrap().documents.insert(
            document.into(),
            StoredDocument { blocks },
        );
        self
    }

    /// Seeds an empty document: just its page block.
    pub fn with_empty_document(self, document: impl Into<String>, title: &str) -> Self {
        let document = document.into();
        let page = page_block(&document, title);
        self.with_document(document, page.into_iter().collect())
    }

    /// Queues an error; each queued error fails the next call, in order.
    pub fn with_failure(self, error: ApiError) -> Self {
        self.fail_next(error);
        self
    }

    pub fn fail_next(&self, error: ApiError) {
        self.state.lock().unwrap().failures.push_back(error);
    }

    /// Fails the `call_number`-th recorded call (1-based), whatever it is.
    pub fn with_failure_at(self, call_number: usize, error: ApiError) -> Self {
        self.state
            .lock()
            .unwrap()
            .scheduled
            .push((call_number, error));
        self
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    pub fn mutation_count(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.is_mutation())
            .count()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    /// Number of stored documents.
    pub fn document_count(&self) -> usize {
        self.state.lock().unwrap().documents.len()
    }

    /// Stored blocks of a document, page block first.
    pub fn blocks_of(&self, document: &str) -> Option<Vec<Block>> {
        self.state
            .lock()
            .unwrap()
            .documents
            .get(document)
            .map(|d| d.blocks.clone())
    }

    /// Texts of the top-level blocks, in page order.
    pub fn top_level_texts(&self, document: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        let Some(doc) = state.documents.get(document) else {
            return Vec::new();
        };
        top_level_ids(document, &doc.blocks)
            .iter()
            .filter_map(|id| doc.blocks.iter().find(|b| &b.block_id == id))
            .map(|b| b.text.clone())
            .collect()
    }

    /// Records the call and pops an injected failure, if any.
    fn begin(&self, call: ApiCall) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        let call_number = state.calls.len();
        if let Some(pos) = state.scheduled.iter().position(|(at, _)| *at == call_number) {
            return Err(state.scheduled.remove(pos).1);
        }
        match state.failures.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn page_block(document: &str, title: &str) -> Option<Block> {
    let id = BlockId::new(document).ok()?;
    Some(Block::new(id, BlockKind::Page).with_text(title))
}

/// Root children: the page block's list, or root-parented blocks in order.
fn top_level_ids(document: &str, blocks: &[Block]) -> Vec<BlockId> {
    if let Some(page) = blocks.iter().find(|b| b.block_id.as_str() == document) {
        return page.children.clone();
    }
    blocks
        .iter()
        .filter(|b| match &b.parent_id {
            None => true,
            Some(p) => p.as_str() == document,
        })
        .map(|b| b.block_id.clone())
        .collect()
}

#[async_trait]
impl DocsApi for InMemoryDocsApi {
    async fn authenticate(&self) -> Result<(), ApiError> {
        self.begin(ApiCall::Authenticate)
    }

    async fn list_folder_children(
        &self,
        folder: &FolderToken,
        page_size: u32,
        cursor: Option<&str>,
    ) -> Result<FolderPage, ApiError> {
        self.begin(ApiCall::ListFolder {
            folder: folder.to_string(),
            page_size,
            cursor: cursor.map(str::to_string),
        })?;

        let state = self.state.lock().unwrap();
        let entries = state
            .folders
            .get(folder.as_str())
            .ok_or_else(|| ApiError::not_found(format!("folder {}", folder)))?;

        let start = match cursor {
            None => 0,
            Some(c) => c
                .parse::<usize>()
                .map_err(|_| ApiError::remote(1061002, format!("invalid page token {}", c)))?,
        };
        let end = (start + page_size.max(1) as usize).min(entries.len());
        let items = entries.get(start..end).unwrap_or_default().to_vec();
        let next_cursor = (end < entries.len()).then(|| end.to_string());

        Ok(FolderPage::new(items, next_cursor))
    }

    async fn create_document(
        &self,
        folder: &FolderToken,
        title: &str,
    ) -> Result<CreatedDocument, ApiError> {
        self.begin(ApiCall::CreateDocument {
            folder: folder.to_string(),
            title: title.to_string(),
        })?;

        let mut state = self.state.lock().unwrap();
        if !state.folders.contains_key(folder.as_str()) {
            return Err(ApiError::not_found(format!("folder {}", folder)));
        }

        let raw_id = state.next_id("doxmem");
        let document_id =
            DocumentId::new(raw_id.clone()).map_err(|e| ApiError::parse(e.to_string()))?;
        let blocks = page_block(&raw_id, title).into_iter().collect();
        state
            .documents
            .insert(raw_id.clone(), StoredDocument { blocks });

        // Most recently edited first, like the drive listing.
        if let Some(entries) = state.folders.get_mut(folder.as_str()) {
            entries.insert(0, FolderEntry::new(raw_id.clone(), title, "docx"));
        }

        Ok(CreatedDocument {
            url: Some(format!("https://example.feishu.cn/docx/{}", raw_id)),
            document_id,
            title: title.to_string(),
            revision_id: Some(1),
        })
    }

    async fn get_document_blocks(&self, document: &DocumentId) -> Result<Vec<Block>, ApiError> {
        self.begin(ApiCall::GetBlocks {
            document: document.to_string(),
        })?;

        let state = self.state.lock().unwrap();
        state
            .documents
            .get(document.as_str())
            .map(|d| d.blocks.clone())
            .ok_or_else(|| ApiError::not_found(format!("document {}", document)))
    }

    async fn insert_blocks(
        &self,
        document: &DocumentId,
        position: InsertPosition,
        paragraphs: &[String],
    ) -> Result<Vec<BlockId>, ApiError> {
        self.begin(ApiCall::InsertBlocks {
            document: document.to_string(),
            position,
            count: paragraphs.len(),
        })?;

        let mut guard = self.state.lock().unwrap();
        let state = &mut *guard;
        let doc = state
            .documents
            .get_mut(document.as_str())
            .ok_or_else(|| ApiError::not_found(format!("document {}", document)))?;

        let root = document.root_block();
        if !doc.blocks.iter().any(|b| b.block_id == root) {
            let mut page = Block::new(root.clone(), BlockKind::Page);
            page.children = top_level_ids(document.as_str(), &doc.blocks);
            doc.blocks.insert(0, page);
        }

        let mut created = Vec::with_capacity(paragraphs.len());
        for _ in paragraphs {
            state.next_id += 1;
            let id = BlockId::new(format!("{}_blk{:04}", document, state.next_id))
                .map_err(|e| ApiError::parse(e.to_string()))?;
            created.push(id);
        }

        for (id, text) in created.iter().zip(paragraphs) {
            doc.blocks.push(
                Block::new(id.clone(), BlockKind::Paragraph)
                    .with_parent(root.clone())
                    .with_text(text.clone()),
            );
        }

        if let Some(page) = doc.blocks.iter_mut().find(|b| b.block_id == root) {
            let at = position.offset(page.children.len());
            page.children.splice(at..at, created.iter().cloned());
        }

        Ok(created)
    }

    async fn get_document_plain_text(&self, document: &DocumentId) -> Result<String, ApiError> {
        self.begin(ApiCall::PlainText {
            document: document.to_string(),
        })?;

        let state = self.state.lock().unwrap();
        let doc = state
            .documents
            .get(document.as_str())
            .ok_or_else(|| ApiError::not_found(format!("document {}", document)))?;

        let mut lines: Vec<&str> = Vec::new();
        for id in top_level_ids(document.as_str(), &doc.blocks) {
            if let Some(block) = doc.blocks.iter().find(|b| b.block_id == id) {
                lines.push(&block.text);
            }
        }
        let mut text = lines.join("\n");
        text.push('\n');
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folder() -> FolderToken {
        FolderToken::new("fld").unwrap()
    }

    fn doc(id: &str) -> DocumentId {
        DocumentId::new(id).unwrap()
    }

    fn entries(n: usize) -> Vec<FolderEntry> {
        (0..n)
            .map(|i| FolderEntry::new(format!("dox{}", i), format!("Doc {}", i), "docx"))
            .collect()
    }

    #[tokio::test]
    async fn pages_through_folder() {
        let api = InMemoryDocsApi::new().with_folder("fld", entries(5));

        let first = api.list_folder_children(&folder(), 2, None).await.unwrap();
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.next_cursor.as_deref(), Some("2"));

        let last = api
            .list_folder_children(&folder(), 2, Some("4"))
            .await
            .unwrap();
        assert_eq!(last.items.len(), 1);
        assert!(last.next_cursor.is_none());
    }

    #[tokio::test]
    async fn unknown_folder_is_not_found() {
        let api = InMemoryDocsApi::new();
        let err = api.list_folder_children(&folder(), 10, None).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn created_document_is_listed_first() {
        let api = InMemoryDocsApi::new().with_folder("fld", entries(2));
        let created = api.create_document(&folder(), "Fresh").await.unwrap();

        let page = api.list_folder_children(&folder(), 10, None).await.unwrap();
        assert_eq!(page.items[0].token, created.document_id.as_str());
        assert_eq!(page.items.len(), 3);
        assert_eq!(api.mutation_count(), 1);
    }

    #[tokio::test]
    async fn inserts_at_position() {
        let api = InMemoryDocsApi::new().with_folder("fld", vec![]);
        let created = api.create_document(&folder(), "T").await.unwrap();
        let id = created.document_id;

        api.insert_blocks(&id, InsertPosition::End, &["a".into(), "c".into()])
            .await
            .unwrap();
        api.insert_blocks(&id, InsertPosition::At(1), &["b".into()])
            .await
            .unwrap();

        assert_eq!(api.top_level_texts(id.as_str()), vec!["a", "b", "c"]);
        let text = api.get_document_plain_text(&id).await.unwrap();
        assert_eq!(text, "a\nb\nc\n");
    }

    #[tokio::test]
    async fn injected_failures_are_consumed_in_order() {
        let api = InMemoryDocsApi::new()
            .with_empty_document("doc", "T")
            .with_failure(ApiError::rate_limited("busy"));

        assert!(api.get_document_blocks(&doc("doc")).await.is_err());
        assert!(api.get_document_blocks(&doc("doc")).await.is_ok());
        assert_eq!(api.call_count(), 2);
    }

    #[tokio::test]
    async fn scheduled_failure_hits_only_that_call() {
        let api = InMemoryDocsApi::new()
            .with_empty_document("doc", "T")
            .with_failure_at(2, ApiError::network("reset"));

        assert!(api.get_document_blocks(&doc("doc")).await.is_ok());
        assert!(api.get_document_blocks(&doc("doc")).await.is_err());
        assert!(api.get_document_blocks(&doc("doc")).await.is_ok());
    }

    #[tokio::test]
    async fn insert_into_missing_document_fails() {
        let api = InMemoryDocsApi::new();
        let err = api
            .insert_blocks(&doc("nope"), InsertPosition::End, &["x".into()])
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
