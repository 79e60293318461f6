//! ListFolderDocsHandler - Query handler aggregating a folder's documents.

use std::sync::Arc;

use crate::domain::folder::{FolderListing, PageAccumulator, PageOutcome, PaginationLimits};
use crate::domain::foundation::{DocsError, FolderToken};
use crate::ports::DocsApi;

/// Query to list the documents of a folder.
#[derive(Debug, Clone)]
pub struct ListFolderDocsQuery {
    pub folder_token: FolderToken,
    pub limits: PaginationLimits,
}

/// Handler for folder listings.
pub struct ListFolderDocsHandler {
    api: Arc<dyn DocsApi>,
}

impl ListFolderDocsHandler {
    pub fn new(api: Arc<dyn DocsApi>) -> Self {
        Self { api }
    }

    /// Follows cursors until the folder is exhausted or the cap is reached.
    ///
    /// Any failed page aborts the whole listing.
    pub async fn handle(&self, query: ListFolderDocsQuery) -> Result<FolderListing, DocsError> {
        let mut accumulator = PageAccumulator::new(query.limits.max_items());
        let mut cursor: Option<String> = None;

        loop {
            let page = self
                .api
                .list_folder_children(
                    &query.folder_token,
                    query.limits.page_size(),
                    cursor.as_deref(),
                )
                .await?;

            tracing::debug!(
                folder = %query.folder_token,
                page = accumulator.pages_fetched() + 1,
                rows = page.items.len(),
                "Fetched folder page"
            );

            match accumulator.absorb(page) {
                PageOutcome::Continue(next) => cursor = Some(next),
                PageOutcome::Complete => break,
                PageOutcome::Stalled(repeated) => {
                    return Err(DocsError::transport(format!(
                        "folder listing returned cursor {} twice",
                        repeated
                    )));
                }
            }
        }

        let listing = accumulator.finish(query.folder_token);
        tracing::debug!(folder = %listing.folder_token, count = listing.count, "Folder listed");
        Ok(listing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{ApiCall, InMemoryDocsApi};
    use crate::domain::folder::FolderEntry;
    use crate::domain::foundation::ErrorCode;
    use crate::ports::ApiError;

    fn folder() -> FolderToken {
        FolderToken::new("fld").unwrap()
    }

    fn query(page_size: i64, max_items: i64) -> ListFolderDocsQuery {
        ListFolderDocsQuery {
            folder_token: folder(),
            limits: PaginationLimits::new(page_size, max_items).unwrap(),
        }
    }

    fn docs(n: usize) -> Vec<FolderEntry> {
        (0..n)
            .map(|i| FolderEntry::new(format!("dox{:02}", i), format!("Doc {}", i), "docx"))
            .collect()
    }

    #[tokio::test]
    async fn aggregates_across_pages_in_order() {
        let api = InMemoryDocsApi::new().with_folder("fld", docs(5));
        let handler = ListFolderDocsHandler::new(Arc::new(api.clone()));

        let listing = handler.handle(query(2, 500)).await.unwrap();

        assert_eq!(listing.count, 5);
        let ids: Vec<&str> = listing.items.iter().map(|d| d.document_id.as_str()).collect();
        assert_eq!(ids, vec!["dox00", "dox01", "dox02", "dox03", "dox04"]);
        assert_eq!(api.call_count(), 3);
    }

    #[tokio::test]
    async fn cursor_is_fed_back() {
        let api = InMemoryDocsApi::new().with_folder("fld", docs(3));
        let handler = ListFolderDocsHandler::new(Arc::new(api.clone()));

        handler.handle(query(2, 500)).await.unwrap();

        let cursors: Vec<Option<String>> = api
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                ApiCall::ListFolder { cursor, .. } => Some(cursor),
                _ => None,
            })
            .collect();
        assert_eq!(cursors, vec![None, Some("2".to_string())]);
    }

    #[tokio::test]
    async fn stops_at_cap_without_fetching_more() {
        let api = InMemoryDocsApi::new().with_folder("fld", docs(10));
        let handler = ListFolderDocsHandler::new(Arc::new(api.clone()));

        let listing = handler.handle(query(3, 4)).await.unwrap();

        assert_eq!(listing.count, 4);
        assert_eq!(api.call_count(), 2);
    }

    #[tokio::test]
    async fn excludes_non_documents() {
        let mut entries = docs(2);
        entries.insert(1, FolderEntry::new("shtX", "Budget", "sheet"));
        entries.push(FolderEntry::new("fldY", "Archive", "folder"));
        let api = InMemoryDocsApi::new().with_folder("fld", entries);
        let handler = ListFolderDocsHandler::new(Arc::new(api));

        let listing = handler.handle(query(100, 500)).await.unwrap();

        assert_eq!(listing.count, 2);
        assert!(listing.items.iter().all(|d| d.kind.is_document()));
    }

    #[tokio::test]
    async fn empty_folder_is_ok() {
        let api = InMemoryDocsApi::new().with_folder("fld", vec![]);
        let handler = ListFolderDocsHandler::new(Arc::new(api));

        let listing = handler.handle(query(20, 20)).await.unwrap();
        assert_eq!(listing.count, 0);
        assert!(listing.items.is_empty());
    }

    #[tokio::test]
    async fn page_failure_aborts_listing() {
        let api = InMemoryDocsApi::new().with_folder("fld", docs(5));
        let handler = ListFolderDocsHandler::new(Arc::new(api.clone()));

        api.fail_next(ApiError::AuthenticationFailed("token expired".into()));
        let err = handler.handle(query(2, 500)).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::AuthenticationFailed);
    }

    #[tokio::test]
    async fn unknown_folder_is_not_found() {
        let handler = ListFolderDocsHandler::new(Arc::new(InMemoryDocsApi::new()));
        let err = handler.handle(query(2, 500)).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
