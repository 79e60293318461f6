//! Feishu Docs Client - Implementation of DocsApi over Feishu's open API.
//!
//! # Configuration
//!
//! ```ignore
//! let config = FeishuConfig::new()
//!     .with_credentials(Credentials::app(app_id, app_secret))
//!     .with_base_url("https://open.feishu.cn/open-apis")
//!     .with_timeout(Duration::from_secs(30));
//!
//! let client = FeishuDocsClient::new(config)?;
//! ```
//!
//! # Authentication
//!
//! A configured access token is sent as is. App credentials are exchanged for
//! a tenant access token on first use; the token is cached until shortly
//! before it expires and dropped as soon as the service rejects it. Without
//! credentials every call fails with `ApiError::MissingCredentials`.

use std::collections::HashSet;
use std::ops::Range;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;

use super::token::{bearer, Credentials, TokenCache};
use super::wire::{
    decode_body, map_business_code, BlockListData, CreateChildrenData, CreateChildrenRequest,
    CreateDocumentData, CreateDocumentRequest, FileListData, NewBlock, RawContentData,
    TenantTokenRequest, TenantTokenResponse,
};
use crate::domain::document::{Block, InsertPosition};
use crate::domain::folder::FolderPage;
use crate::domain::foundation::{BlockId, DocumentId, FolderToken};
use crate::ports::{ApiError, CreatedDocument, DocsApi};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://open.feishu.cn/open-apis";

/// The service accepts at most this many children per insert call.
const MAX_CHILDREN_PER_REQUEST: usize = 50;

/// Page size used when reading a document's blocks.
const BLOCK_PAGE_SIZE: u32 = 500;

/// `document_revision_id` value meaning the latest revision.
const LATEST_REVISION: i64 = -1;

/// Children index meaning "after the last child".
const APPEND_CHILD_INDEX: i64 = -1;

/// Configuration for the Feishu client.
#[derive(Debug, Clone)]
pub struct FeishuConfig {
    credentials: Option<Credentials>,
    /// API root (default: https://open.feishu.cn/open-apis).
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for FeishuConfig {
    fn default() -> Self {
        Self {
            credentials: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl FeishuConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }
}

/// HTTP implementation of the docs port.
pub struct FeishuDocsClient {
    config: FeishuConfig,
    client: Client,
    tokens: TokenCache,
}

impl FeishuDocsClient {
    pub fn new(config: FeishuConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            client,
            tokens: TokenCache::new(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn map_send_error(&self, e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::Timeout {
                timeout_secs: self.config.timeout.as_secs(),
            }
        } else if e.is_connect() {
            ApiError::network(format!("Connection failed: {}", e))
        } else {
            ApiError::network(e.to_string())
        }
    }

    /// Returns a bearer token, exchanging app credentials when needed.
    async fn bearer_token(&self) -> Result<Secret<String>, ApiError> {
        match &self.config.credentials {
            None => Err(ApiError::MissingCredentials(
                "set FEISHU_ACCESS_TOKEN or FEISHU_APP_ID and FEISHU_APP_SECRET".to_string(),
            )),
            Some(Credentials::AccessToken(token)) => Ok(token.clone()),
            Some(Credentials::App { app_id, app_secret }) => {
                if let Some(token) = self.tokens.get().await {
                    return Ok(token);
                }
                self.fetch_tenant_token(app_id, app_secret).await
            }
        }
    }

    async fn fetch_tenant_token(
        &self,
        app_id: &str,
        app_secret: &Secret<String>,
    ) -> Result<Secret<String>, ApiError> {
        tracing::debug!(app_id, "Fetching tenant access token");

        let response = self
            .client
            .post(self.url("/auth/v3/tenant_access_token/internal"))
            .json(&TenantTokenRequest {
                app_id,
                app_secret: app_secret.expose_secret(),
            })
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let body: TenantTokenResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse tenant token response ({}): {}", status, e);
            ApiError::parse(format!("tenant token: {}", e))
        })?;

        if body.code != 0 {
            tracing::warn!(code = body.code, "Tenant token request rejected");
            return Err(match map_business_code(body.code, &body.msg) {
                ApiError::Remote { code, message } => {
                    ApiError::AuthenticationFailed(format!("{} ({})", message, code))
                }
                other => other,
            });
        }

        let token = body
            .tenant_access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::parse("tenant token: response has no token"))?;

        self.tokens.store(token.clone(), body.expire).await;
        Ok(Secret::new(token))
    }

    /// Sends an authorized request and decodes the `data` payload.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<T, ApiError> {
        let token = self.bearer_token().await?;

        let response = request
            .header(AUTHORIZATION, bearer(&token))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_send_error(e))?;
        let result = decode_body(status, &body, context);

        if let Err(ApiError::AuthenticationFailed(reason)) = &result {
            tracing::warn!(context, "Request rejected: {}", reason);
            if matches!(self.config.credentials, Some(Credentials::App { .. })) {
                self.tokens.invalidate().await;
            }
        }

        result
    }
}

#[async_trait]
impl DocsApi for FeishuDocsClient {
    async fn authenticate(&self) -> Result<(), ApiError> {
        self.bearer_token().await.map(|_| ())
    }

    async fn list_folder_children(
        &self,
        folder: &FolderToken,
        page_size: u32,
        cursor: Option<&str>,
    ) -> Result<FolderPage, ApiError> {
        tracing::debug!(folder = %folder, page_size, cursor, "Listing folder page");

        let mut query = vec![
            ("folder_token", folder.as_str().to_string()),
            ("page_size", page_size.to_string()),
            ("order_by", "EditedTime".to_string()),
            ("direction", "DESC".to_string()),
        ];
        if let Some(cursor) = cursor {
            query.push(("page_token", cursor.to_string()));
        }

        let request = self.client.get(self.url("/drive/v1/files")).query(&query);
        let data: FileListData = self.execute(request, "list folder").await?;
        Ok(data.into_page())
    }

    async fn create_document(
        &self,
        folder: &FolderToken,
        title: &str,
    ) -> Result<CreatedDocument, ApiError> {
        tracing::debug!(folder = %folder, title, "Creating document");

        let request = self
            .client
            .post(self.url("/docx/v1/documents"))
            .json(&CreateDocumentRequest {
                title,
                folder_token: folder.as_str(),
            });
        let data: CreateDocumentData = self.execute(request, "create document").await?;
        data.document.into_created(title)
    }

    async fn get_document_blocks(&self, document: &DocumentId) -> Result<Vec<Block>, ApiError> {
        let url = self.url(&format!("/docx/v1/documents/{}/blocks", document));
        let mut blocks = Vec::new();
        let mut seen_tokens = HashSet::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![
                ("page_size", BLOCK_PAGE_SIZE.to_string()),
                ("document_revision_id", LATEST_REVISION.to_string()),
            ];
            if let Some(token) = &page_token {
                query.push(("page_token", token.clone()));
            }

            let request = self.client.get(&url).query(&query);
            let data: BlockListData = self.execute(request, "list blocks").await?;
            for item in data.items {
                blocks.push(item.into_block()?);
            }

            match data.page_token.filter(|t| data.has_more && !t.is_empty()) {
                Some(next) => {
                    if !seen_tokens.insert(next.clone()) {
                        return Err(ApiError::parse(format!(
                            "list blocks: page token {} repeated",
                            next
                        )));
                    }
                    page_token = Some(next);
                }
                None => break,
            }
        }

        tracing::debug!(document = %document, count = blocks.len(), "Fetched blocks");
        Ok(blocks)
    }

    async fn insert_blocks(
        &self,
        document: &DocumentId,
        position: InsertPosition,
        paragraphs: &[String],
    ) -> Result<Vec<BlockId>, ApiError> {
        let url = self.url(&format!(
            "/docx/v1/documents/{}/blocks/{}/children",
            document,
            document.root_block()
        ));
        let mut created = Vec::with_capacity(paragraphs.len());

        for (index, range) in insert_plan(position, paragraphs.len()) {
            let chunk = &paragraphs[range];
            let body = CreateChildrenRequest {
                index,
                children: chunk.iter().map(NewBlock::paragraph).collect(),
            };

            tracing::debug!(document = %document, index, count = chunk.len(), "Inserting blocks");
            let request = self
                .client
                .post(&url)
                .query(&[("document_revision_id", LATEST_REVISION.to_string())])
                .json(&body);
            let data: CreateChildrenData = self.execute(request, "insert blocks").await?;

            for child in data.children {
                let id = BlockId::new(child.block_id)
                    .map_err(|e| ApiError::parse(format!("insert blocks: {}", e)))?;
                created.push(id);
            }
        }

        Ok(created)
    }

    async fn get_document_plain_text(&self, document: &DocumentId) -> Result<String, ApiError> {
        let request = self
            .client
            .get(self.url(&format!("/docx/v1/documents/{}/raw_content", document)))
            .query(&[("lang", "0")]);
        let data: RawContentData = self.execute(request, "raw content").await?;
        Ok(data.content)
    }
}

/// Splits an insert into request-sized chunks, each with its children index.
///
/// Positional chunks land one after another; appends always use the
/// append index.
fn insert_plan(position: InsertPosition, count: usize) -> Vec<(i64, Range<usize>)> {
    (0..count)
        .step_by(MAX_CHILDREN_PER_REQUEST)
        .map(|start| {
            let end = (start + MAX_CHILDREN_PER_REQUEST).min(count);
            let index = match position {
                InsertPosition::End => APPEND_CHILD_INDEX,
                InsertPosition::At(i) => (i + start) as i64,
            };
            (index, start..end)
        })
        .collect()
}
