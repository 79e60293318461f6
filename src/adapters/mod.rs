//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `feishu` - HTTP client for the Feishu open platform
//! - `memory` - In-memory document service for tests and dry runs
//! - `resilience` - Retry decorator for any `DocsApi`

pub mod feishu;
pub mod memory;
pub mod resilience;

pub use feishu::{Credentials, FeishuConfig, FeishuDocsClient};
pub use memory::{ApiCall, InMemoryDocsApi};
pub use resilience::RetryingDocsApi;
