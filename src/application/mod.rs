//! Application layer - Commands, Queries, Handlers and the action dispatcher.
//!
//! This layer orchestrates domain operations and coordinates calls to the
//! docs port. Commands (create, write) and queries (list, read, outline) have
//! separate handlers; the dispatcher maps actions onto them.

pub mod dispatch;
pub mod handlers;

pub use dispatch::{Action, ActionEnvelope, Dispatcher, UNKNOWN_ACTION};
pub use handlers::{
    CreateDocCommand, CreateDocHandler, GetDocContentHandler, GetDocContentQuery,
    GetDocOutlineHandler, GetDocOutlineQuery, ListFolderDocsHandler, ListFolderDocsQuery,
    RunSelfTestCommand, RunSelfTestHandler, WriteDocCommand, WriteDocHandler,
};
