//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, error types and the state machine trait that form
//! the vocabulary of the docs domain.

mod errors;
mod ids;
mod state_machine;

pub use errors::{DocsError, ErrorCode, ValidationError};
pub use ids::{BlockId, DocumentId, FolderToken};
pub use state_machine::StateMachine;
