//! Folder query handlers.

mod list_folder_docs;

pub use list_folder_docs::{ListFolderDocsHandler, ListFolderDocsQuery};
