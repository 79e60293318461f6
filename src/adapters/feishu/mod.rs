//! Feishu adapter - DocsApi over the Feishu open platform HTTP API.

mod client;
mod token;
mod wire;

pub use client::{FeishuConfig, FeishuDocsClient, DEFAULT_BASE_URL};
pub use token::Credentials;
