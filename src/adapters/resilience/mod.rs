//! Resilience decorators for the docs port.

mod retrying_docs_api;

pub use retrying_docs_api::{RetryingDocsApi, DEFAULT_RETRY_DELAY};
