//! Folder module - Listing rows, document summaries and page aggregation.

mod pagination;
mod summary;

pub use pagination::{
    FolderListing, FolderPage, PageAccumulator, PageOutcome, PaginationLimits, DEFAULT_MAX_ITEMS,
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use summary::{DocumentSummary, FileKind, FolderEntry};
