//! Retrying Docs API - Wrapper that retries transient failures once.
//!
//! Rate limiting, network errors and timeouts get one more attempt after a
//! fixed delay. Everything else, and a second failure, is returned as is.
//!
//! # Example
//!
//! ```ignore
//! let client = FeishuDocsClient::new(config)?;
//! let api = RetryingDocsApi::new(client).with_delay(Duration::from_millis(500));
//! ```

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use crate::domain::document::{Block, InsertPosition};
use crate::domain::folder::FolderPage;
use crate::domain::foundation::{BlockId, DocumentId, FolderToken};
use crate::ports::{ApiError, CreatedDocument, DocsApi};

/// Default pause before the retry.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Docs API wrapper with a single retry on transient errors.
pub struct RetryingDocsApi<A: DocsApi> {
    inner: A,
    delay: Duration,
    max_retries: u32,
}

impl<A: DocsApi> RetryingDocsApi<A> {
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            delay: DEFAULT_RETRY_DELAY,
            max_retries: 1,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }

    async fn run<T, F, Fut>(&self, operation: &str, call: F) -> Result<T, ApiError>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = Result<T, ApiError>> + Send,
        T: Send,
    {
        let mut attempt = 0;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        operation,
                        attempt,
                        delay_ms = self.delay.as_millis() as u64,
                        "Transient docs API failure, retrying: {}",
                        err
                    );
                    sleep(self.delay).await;
                }
                Err(err) => {
                    if attempt > 0 {
                        tracing::error!(operation, "Docs API call failed after retry: {}", err);
                    }
                    return Err(err);
                }
            }
        }
    }
}

#[async_trait]
impl<A: DocsApi> DocsApi for RetryingDocsApi<A> {
    async fn authenticate(&self) -> Result<(), ApiError> {
        self.run("authenticate", || self.inner.authenticate()).await
    }

    async fn list_folder_children(
        &self,
        folder: &FolderToken,
        page_size: u32,
        cursor: Option<&str>,
    ) -> Result<FolderPage, ApiError> {
        self.run("list_folder_children", || {
            self.inner.list_folder_children(folder, page_size, cursor)
        })
        .await
    }

    async fn create_document(
        &self,
        folder: &FolderToken,
        title: &str,
    ) -> Result<CreatedDocument, ApiError> {
        self.run("create_document", || self.inner.create_document(folder, title))
            .await
    }

    async fn get_document_blocks(&self, document: &DocumentId) -> Result<Vec<Block>, ApiError> {
        self.run("get_document_blocks", || self.inner.get_document_blocks(document))
            .await
    }

    async fn insert_blocks(
        &self,
        document: &DocumentId,
        position: InsertPosition,
        paragraphs: &[String],
    ) -> Result<Vec<BlockId>, ApiError> {
        self.run("insert_blocks", || {
            self.inner.insert_blocks(document, position, paragraphs)
        })
        .await
    }

    async fn get_document_plain_text(&self, document: &DocumentId) -> Result<String, ApiError> {
        self.run("get_document_plain_text", || {
            self.inner.get_document_plain_text(document)
        })
        .await
    }
}
