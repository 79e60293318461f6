//! Docs API Port - Interface to the remote document service.
//!
//! This port abstracts every interaction with the cloud document store
//! (folders, documents and their blocks), so the application layer can list,
//! read and write documents without coupling to Feishu's HTTP API.
//!
//! # Design
//!
//! - Capability-typed: one method per remote primitive, domain types in and out
//! - Token acquisition is the adapter's concern; `authenticate` only forces it
//! - Error variants carry enough to decide on retries (`is_retryable`)
//!
//! # Example
//!
//! ```ignore
//! let api: Arc<dyn DocsApi> = Arc::new(FeishuDocsClient::new(settings)?);
//! let page = api.list_folder_children(&folder, 50, None).await?;
//! ```

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::document::{Block, InsertPosition};
use crate::domain::folder::FolderPage;
use crate::domain::foundation::{BlockId, DocsError, DocumentId, FolderToken};

/// Port for the remote document service.
#[async_trait]
pub trait DocsApi: Send + Sync {
    /// Ensures usable credentials, acquiring an access token if needed.
    async fn authenticate(&self) -> Result<(), ApiError>;

    /// Fetches one page of a folder listing.
    ///
    /// `cursor` is `None` for the first page and the previous page's
    /// `next_cursor` afterwards.
    async fn list_folder_children(
        &self,
        folder: &FolderToken,
        page_size: u32,
        cursor: Option<&str>,
    ) -> Result<FolderPage, ApiError>;

    /// Creates an empty document in a folder.
    async fn create_document(
        &self,
        folder: &FolderToken,
        title: &str,
    ) -> Result<CreatedDocument, ApiError>;

    /// Fetches every block of a document, page block included.
    async fn get_document_blocks(&self, document: &DocumentId) -> Result<Vec<Block>, ApiError>;

    /// Inserts paragraph blocks as one contiguous run among the top-level
    /// blocks and returns the new block ids in order.
    async fn insert_blocks(
        &self,
        document: &DocumentId,
        position: InsertPosition,
        paragraphs: &[String],
    ) -> Result<Vec<BlockId>, ApiError>;

    /// The service's own plain-text rendering of a document.
    async fn get_document_plain_text(&self, document: &DocumentId) -> Result<String, ApiError>;
}

/// A newly created document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedDocument {
    pub document_id: DocumentId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision_id: Option<i64>,
}

/// Docs API errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// No credentials to authenticate with.
    #[error("credentials not configured: {0}")]
    MissingCredentials(String),

    /// Credentials or token rejected.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Folder or document does not exist (or is not visible to the app).
    #[error("not found: {0}")]
    NotFound(String),

    /// Throttled by the service.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u64,
    },

    /// The service answered with a non-zero business code.
    #[error("service error {code}: {message}")]
    Remote { code: i64, message: String },

    /// Failed to parse the service response.
    #[error("parse error: {0}")]
    Parse(String),
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited(message.into())
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    pub fn remote(code: i64, message: impl Into<String>) -> Self {
        Self::Remote {
            code,
            message: message.into(),
        }
    }

    /// Returns true if one more attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::RateLimited(_) | ApiError::Network(_) | ApiError::Timeout { .. }
        )
    }
}

impl From<ApiError> for DocsError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::MissingCredentials(msg) => DocsError::ConfigurationMissing(msg),
            ApiError::AuthenticationFailed(msg) => DocsError::AuthenticationFailed(msg),
            ApiError::NotFound(msg) => DocsError::NotFound(msg),
            ApiError::RateLimited(msg) => DocsError::RateLimited(msg),
            other @ (ApiError::Network(_)
            | ApiError::Timeout { .. }
            | ApiError::Remote { .. }
            | ApiError::Parse(_)) => DocsError::Transport(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;

    #[test]
    fn retryable_classification() {
        assert!(ApiError::rate_limited("slow down").is_retryable());
        assert!(ApiError::network("reset").is_retryable());
        assert!(ApiError::Timeout { timeout_secs: 30 }.is_retryable());

        assert!(!ApiError::AuthenticationFailed("bad token".into()).is_retryable());
        assert!(!ApiError::not_found("doc").is_retryable());
        assert!(!ApiError::remote(1770001, "invalid param").is_retryable());
        assert!(!ApiError::parse("eof").is_retryable());
    }

    #[test]
    fn maps_to_docs_error_kinds() {
        let cases = [
            (ApiError::MissingCredentials("x".into()), ErrorCode::ConfigurationMissing),
            (ApiError::AuthenticationFailed("x".into()), ErrorCode::AuthenticationFailed),
            (ApiError::not_found("x"), ErrorCode::NotFound),
            (ApiError::rate_limited("x"), ErrorCode::RateLimited),
            (ApiError::network("x"), ErrorCode::TransportError),
            (ApiError::Timeout { timeout_secs: 5 }, ErrorCode::TransportError),
            (ApiError::remote(1, "x"), ErrorCode::TransportError),
            (ApiError::parse("x"), ErrorCode::TransportError),
        ];
        for (api, code) in cases {
            assert_eq!(DocsError::from(api.clone()).code(), code, "{:?}", api);
        }
    }

    #[test]
    fn timeout_message_survives_conversion() {
        let err = DocsError::from(ApiError::Timeout { timeout_secs: 30 });
        assert_eq!(err.to_string(), "transport error: request timed out after 30s");
    }

    #[test]
    fn created_document_serializes_without_absent_fields() {
        let doc = CreatedDocument {
            document_id: DocumentId::new("doxcn1").unwrap(),
            title: "Notes".to_string(),
            url: None,
            revision_id: Some(1),
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["document_id"], "doxcn1");
        assert_eq!(json["revision_id"], 1);
        assert!(json.get("url").is_none());
    }
}
