//! Wire types for the Feishu open platform.
//!
//! Every endpoint answers with `{code, msg, data}`; `code == 0` is success.

use std::collections::HashMap;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::document::{Block, BlockKind};
use crate::domain::folder::{FolderEntry, FolderPage};
use crate::domain::foundation::BlockId;
use crate::ports::{ApiError, CreatedDocument};

/// Feishu block type for a plain text paragraph.
pub const TEXT_BLOCK_TYPE: i64 = 2;

/// Business codes reported for invalid or expired tokens.
const AUTH_CODES: [i64; 4] = [99991661, 99991663, 99991668, 99991671];
/// Business code reported when the app exceeds its request quota.
const RATE_LIMIT_CODE: i64 = 99991400;
/// Business codes reported for a missing document or folder.
const NOT_FOUND_CODES: [i64; 3] = [1061003, 1061007, 1770002];

#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    pub data: Option<T>,
}

/// Maps a non-zero business code to an API error.
pub fn map_business_code(code: i64, msg: &str) -> ApiError {
    if AUTH_CODES.contains(&code) {
        ApiError::AuthenticationFailed(format!("{} ({})", msg, code))
    } else if code == RATE_LIMIT_CODE {
        ApiError::rate_limited(format!("{} ({})", msg, code))
    } else if NOT_FOUND_CODES.contains(&code) {
        ApiError::not_found(format!("{} ({})", msg, code))
    } else {
        ApiError::remote(code, msg)
    }
}

/// Decodes a response body, preferring the business code over the HTTP status.
///
/// The envelope is read untyped first so an error code survives a `data`
/// payload that does not fit `T`.
pub fn decode_body<T: for<'de> Deserialize<'de>>(
    status: StatusCode,
    body: &str,
    context: &str,
) -> Result<T, ApiError> {
    let envelope = serde_json::from_str::<Envelope<Value>>(body);

    if let Ok(Envelope { code, msg, .. }) = &envelope {
        if *code != 0 {
            return Err(map_business_code(*code, msg));
        }
    }

    if !status.is_success() {
        return Err(map_status(status, body, context));
    }

    match envelope {
        Ok(Envelope {
            data: Some(data), ..
        }) if !data.is_null() => serde_json::from_value(data)
            .map_err(|e| ApiError::parse(format!("{}: {}", context, e))),
        Ok(_) => Err(ApiError::parse(format!("{}: response has no data", context))),
        Err(e) => Err(ApiError::parse(format!("{}: {}", context, e))),
    }
}

fn map_status(status: StatusCode, body: &str, context: &str) -> ApiError {
    match status.as_u16() {
        401 | 403 => ApiError::AuthenticationFailed(format!("{}: HTTP {}", context, status)),
        404 => ApiError::not_found(context.to_string()),
        429 => ApiError::rate_limited(format!("{}: HTTP 429", context)),
        _ => ApiError::network(format!("{}: unexpected status {}: {}", context, status, body)),
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Auth
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
pub struct TenantTokenRequest<'a> {
    pub app_id: &'a str,
    pub app_secret: &'a str,
}

/// The token endpoint puts its fields at the top level, not under `data`.
#[derive(Debug, Deserialize)]
pub struct TenantTokenResponse {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    pub tenant_access_token: Option<String>,
    /// Lifetime in seconds.
    #[serde(default)]
    pub expire: u64,
}

// ════════════════════════════════════════════════════════════════════════════════
// Drive
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
pub struct FileListData {
    #[serde(default)]
    pub files: Vec<WireFile>,
    #[serde(default)]
    pub has_more: bool,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WireFile {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub file_type: String,
    pub url: Option<String>,
    pub owner_id: Option<String>,
    pub modified_time: Option<Value>,
}

impl From<WireFile> for FolderEntry {
    fn from(file: WireFile) -> Self {
        FolderEntry {
            token: file.token,
            name: file.name,
            file_type: file.file_type,
            url: file.url,
            owner_id: file.owner_id,
            modified_time: file.modified_time.and_then(scalar_to_string),
        }
    }
}

impl FileListData {
    pub fn into_page(self) -> FolderPage {
        let next_cursor = if self.has_more {
            self.next_page_token
        } else {
            None
        };
        FolderPage::new(self.files.into_iter().map(FolderEntry::from).collect(), next_cursor)
    }
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Docx
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
pub struct CreateDocumentRequest<'a> {
    pub title: &'a str,
    pub folder_token: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct CreateDocumentData {
    pub document: WireDocument,
}

#[derive(Debug, Deserialize)]
pub struct WireDocument {
    pub document_id: String,
    #[serde(default)]
    pub title: String,
    pub url: Option<String>,
    pub revision_id: Option<i64>,
}

impl WireDocument {
    pub fn into_created(self, requested_title: &str) -> Result<CreatedDocument, ApiError> {
        let document_id = crate::domain::foundation::DocumentId::new(self.document_id)
            .map_err(|e| ApiError::parse(format!("create document: {}", e)))?;
        let title = if self.title.is_empty() {
            requested_title.to_string()
        } else {
            self.title
        };
        Ok(CreatedDocument {
            document_id,
            title,
            url: self.url,
            revision_id: self.revision_id,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct BlockListData {
    #[serde(default)]
    pub items: Vec<WireBlock>,
    #[serde(default)]
    pub has_more: bool,
    pub page_token: Option<String>,
}

/// A block as Feishu sends it.
///
/// The text payload lives under a key named after the block type
/// (`text`, `heading1`, `page`, ...), so unknown keys are kept and searched.
#[derive(Debug, Deserialize)]
pub struct WireBlock {
    pub block_id: String,
    pub parent_id: Option<String>,
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default)]
    pub block_type: i64,
    #[serde(flatten)]
    pub payload: HashMap<String, Value>,
}

impl WireBlock {
    /// Concatenated `text_run` contents of the block's elements.
    ///
    /// Reads the payload keyed by the block type; unknown types fall back to
    /// every payload in key order.
    pub fn text(&self) -> String {
        if let Some(value) = payload_key(self.block_type).and_then(|key| self.payload.get(key)) {
            if let Some(elements) = value.get("elements").and_then(Value::as_array) {
                return collect_text_runs(elements);
            }
        }

        let mut keys: Vec<&String> = self.payload.keys().collect();
        keys.sort();
        keys.into_iter()
            .filter_map(|key| self.payload[key].get("elements").and_then(Value::as_array))
            .map(|elements| collect_text_runs(elements))
            .collect()
    }

    pub fn into_block(self) -> Result<Block, ApiError> {
        let text = self.text();
        let id = BlockId::new(self.block_id)
            .map_err(|e| ApiError::parse(format!("block list: {}", e)))?;

        let mut block = Block::new(id, BlockKind::from_feishu_type(self.block_type)).with_text(text);
        if let Some(parent) = self.parent_id.filter(|p| !p.is_empty()) {
            let parent = BlockId::new(parent)
                .map_err(|e| ApiError::parse(format!("block list: {}", e)))?;
            block = block.with_parent(parent);
        }
        let children = self
            .children
            .into_iter()
            .map(BlockId::new)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ApiError::parse(format!("block list: {}", e)))?;
        Ok(block.with_children(children))
    }
}

/// Payload key Feishu uses for a block type.
fn payload_key(block_type: i64) -> Option<&'static str> {
    const HEADINGS: [&str; 9] = [
        "heading1", "heading2", "heading3", "heading4", "heading5", "heading6", "heading7",
        "heading8", "heading9",
    ];
    match block_type {
        1 => Some("page"),
        2 => Some("text"),
        3..=11 => HEADINGS.get((block_type - 3) as usize).copied(),
        12 => Some("bullet"),
        13 => Some("ordered"),
        14 => Some("code"),
        15 => Some("quote"),
        17 => Some("todo"),
        _ => None,
    }
}

fn collect_text_runs(elements: &[Value]) -> String {
    elements
        .iter()
        .filter_map(|element| {
            element
                .get("text_run")
                .and_then(|run| run.get("content"))
                .and_then(Value::as_str)
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct CreateChildrenRequest {
    pub index: i64,
    pub children: Vec<NewBlock>,
}

#[derive(Debug, Serialize)]
pub struct NewBlock {
    pub block_type: i64,
    pub text: TextBody,
}

#[derive(Debug, Serialize)]
pub struct TextBody {
    pub elements: Vec<TextElement>,
}

#[derive(Debug, Serialize)]
pub struct TextElement {
    pub text_run: TextRun,
}

#[derive(Debug, Serialize)]
pub struct TextRun {
    pub content: String,
}

impl NewBlock {
    pub fn paragraph(content: impl Into<String>) -> Self {
        Self {
            block_type: TEXT_BLOCK_TYPE,
            text: TextBody {
                elements: vec![TextElement {
                    text_run: TextRun {
                        content: content.into(),
                    },
                }],
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateChildrenData {
    #[serde(default)]
    pub children: Vec<CreatedChild>,
}

#[derive(Debug, Deserialize)]
pub struct CreatedChild {
    pub block_id: String,
}

#[derive(Debug, Deserialize)]
pub struct RawContentData {
    #[serde(default)]
    pub content: String,
}
