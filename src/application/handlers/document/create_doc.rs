//! CreateDocHandler - Command handler for creating documents in a folder.

use std::sync::Arc;

use crate::domain::foundation::{DocsError, FolderToken, ValidationError};
use crate::ports::{CreatedDocument, DocsApi};

/// Command to create a document.
#[derive(Debug, Clone)]
pub struct CreateDocCommand {
    pub folder_token: FolderToken,
    pub title: String,
}

/// Handler for document creation.
pub struct CreateDocHandler {
    api: Arc<dyn DocsApi>,
}

impl CreateDocHandler {
    pub fn new(api: Arc<dyn DocsApi>) -> Self {
        Self { api }
    }

    pub async fn handle(&self, cmd: CreateDocCommand) -> Result<CreatedDocument, DocsError> {
        let title = cmd.title.trim();
        if title.is_empty() {
            return Err(ValidationError::empty_field("title").into());
        }

        let created = self.api.create_document(&cmd.folder_token, title).await?;
        tracing::debug!(
            folder = %cmd.folder_token,
            document = %created.document_id,
            "Document created"
        );
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{ApiCall, InMemoryDocsApi};
    use crate::domain::foundation::ErrorCode;

    fn cmd(title: &str) -> CreateDocCommand {
        CreateDocCommand {
            folder_token: FolderToken::new("fld").unwrap(),
            title: title.to_string(),
        }
    }

    #[tokio::test]
    async fn creates_document_in_folder() {
        let api = InMemoryDocsApi::new().with_folder("fld", vec![]);
        let handler = CreateDocHandler::new(Arc::new(api.clone()));

        let created = handler.handle(cmd("Weekly notes")).await.unwrap();

        assert_eq!(created.title, "Weekly notes");
        assert_eq!(api.document_count(), 1);
        assert_eq!(
            api.calls(),
            vec![ApiCall::CreateDocument {
                folder: "fld".to_string(),
                title: "Weekly notes".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn blank_title_is_rejected_without_remote_call() {
        let api = InMemoryDocsApi::new().with_folder("fld", vec![]);
        let handler = CreateDocHandler::new(Arc::new(api.clone()));

        let err = handler.handle(cmd("   ")).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::ValidationFailed);
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn missing_folder_is_not_found() {
        let handler = CreateDocHandler::new(Arc::new(InMemoryDocsApi::new()));
        let err = handler.handle(cmd("Notes")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
