//! Domain layer containing the document model and its policies.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, errors, state machine)
//! - `folder` - Folder listing rows, summaries and page aggregation
//! - `document` - Block tree, outline, content rendering and write positions
//! - `self_test` - Self-test stages and report

pub mod document;
pub mod folder;
pub mod foundation;
pub mod self_test;
