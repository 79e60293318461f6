//! Document command and query handlers.

mod create_doc;
mod get_doc_content;
mod get_doc_outline;
mod write_doc;

pub use create_doc::{CreateDocCommand, CreateDocHandler};
pub use get_doc_content::{GetDocContentHandler, GetDocContentQuery};
pub use get_doc_outline::{DocOutline, GetDocOutlineHandler, GetDocOutlineQuery};
pub use write_doc::{WriteDocCommand, WriteDocHandler, WriteDocResult};
