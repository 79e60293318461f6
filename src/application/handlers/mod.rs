//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations over the
//! docs port.

pub mod document;
pub mod folder;
pub mod self_test;

pub use document::{
    CreateDocCommand, CreateDocHandler, DocOutline, GetDocContentHandler, GetDocContentQuery,
    GetDocOutlineHandler, GetDocOutlineQuery, WriteDocCommand, WriteDocHandler, WriteDocResult,
};
pub use folder::{ListFolderDocsHandler, ListFolderDocsQuery};
pub use self_test::{RunSelfTestCommand, RunSelfTestHandler};
