//! Folder entries as reported by the drive listing, and the document
//! summaries derived from them.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::DocumentId;

/// Coarse classification of a drive file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// `doc`, `docx` and `wiki` files.
    Document,
    /// `sheet` and `bitable` files.
    Sheet,
    /// Folders, uploads, mind notes and anything unknown.
    Other,
}

impl FileKind {
    /// Classifies a Feishu drive file type (case-insensitive).
    pub fn from_file_type(file_type: &str) -> Self {
        match file_type.trim().to_ascii_lowercase().as_str() {
            "doc" | "docx" | "wiki" => FileKind::Document,
            "sheet" | "bitable" => FileKind::Sheet,
            _ => FileKind::Other,
        }
    }

    pub fn is_document(&self) -> bool {
        matches!(self, FileKind::Document)
    }
}

/// One raw row of a folder listing page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FolderEntry {
    pub token: String,
    pub name: String,
    pub file_type: String,
    pub url: Option<String>,
    pub owner_id: Option<String>,
    pub modified_time: Option<String>,
}

impl FolderEntry {
    /// Creates an entry with the required fields only.
    pub fn new(
        token: impl Into<String>,
        name: impl Into<String>,
        file_type: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            name: name.into(),
            file_type: file_type.into(),
            ..Default::default()
        }
    }

    pub fn kind(&self) -> FileKind {
        FileKind::from_file_type(&self.file_type)
    }
}

/// A document found in a folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    pub document_id: DocumentId,
    pub title: String,
    pub kind: FileKind,
    /// The service's own type string (`docx`, `doc`, `wiki`).
    pub file_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<String>,
}

impl DocumentSummary {
    /// Converts a listing row into a summary.
    ///
    /// Returns `None` for non-document rows and rows without a token.
    pub fn from_entry(entry: FolderEntry) -> Option<Self> {
        let kind = entry.kind();
        if !kind.is_document() {
            return None;
        }
        let document_id = DocumentId::new(entry.token).ok()?;
        Some(Self {
            document_id,
            title: entry.name,
            kind,
            file_type: entry.file_type,
            url: entry.url,
            owner_id: entry.owner_id,
            modified_time: entry.modified_time,
        })
    }
}
