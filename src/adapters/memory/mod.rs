//! In-memory adapters for tests and local runs.

mod in_memory_docs_api;

pub use in_memory_docs_api::{ApiCall, InMemoryDocsApi};
