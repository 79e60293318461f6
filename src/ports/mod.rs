//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `DocsApi` - the remote document service (folders, documents, blocks)

mod docs_api;

pub use docs_api::{ApiError, CreatedDocument, DocsApi};
