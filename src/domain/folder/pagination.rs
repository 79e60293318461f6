//! Cursor-driven aggregation of folder listing pages.
//!
//! The accumulator is pure: the caller fetches pages and feeds them in, and
//! the accumulator decides whether another page is needed. Only document rows
//! are kept and only they count toward the cap.

use std::collections::HashSet;

use serde::Serialize;

use super::summary::{DocumentSummary, FolderEntry};
use crate::domain::foundation::{FolderToken, ValidationError};

/// Largest page the drive listing endpoint accepts.
pub const MAX_PAGE_SIZE: u32 = 200;
pub const DEFAULT_PAGE_SIZE: i64 = 100;
pub const DEFAULT_MAX_ITEMS: i64 = 500;

/// One page returned by the listing primitive.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FolderPage {
    pub items: Vec<FolderEntry>,
    /// Cursor for the next page; `None` once the folder is exhausted.
    pub next_cursor: Option<String>,
}

impl FolderPage {
    pub fn new(items: Vec<FolderEntry>, next_cursor: Option<String>) -> Self {
        Self { items, next_cursor }
    }
}

/// Validated page size and document cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationLimits {
    page_size: u32,
    max_items: usize,
}

impl PaginationLimits {
    /// Validates caller input.
    ///
    /// Non-positive values are rejected; page sizes above [`MAX_PAGE_SIZE`]
    /// are clamped.
    pub fn new(page_size: i64, max_items: i64) -> Result<Self, ValidationError> {
        if page_size < 1 {
            return Err(ValidationError::out_of_range(
                "page_size",
                1,
                MAX_PAGE_SIZE as i64,
                page_size,
            ));
        }
        if max_items < 1 {
            return Err(ValidationError::out_of_range(
                "max_items",
                1,
                i64::from(u32::MAX),
                max_items,
            ));
        }
        Ok(Self {
            page_size: page_size.min(MAX_PAGE_SIZE as i64) as u32,
            max_items: usize::try_from(max_items).unwrap_or(usize::MAX),
        })
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }
}

impl Default for PaginationLimits {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE as u32,
            max_items: DEFAULT_MAX_ITEMS as usize,
        }
    }
}

/// What to do after absorbing a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// Fetch the next page with this cursor.
    Continue(String),
    /// Exhausted or capped; aggregation is finished.
    Complete,
    /// The service handed back a cursor that was already followed.
    Stalled(String),
}

/// Accumulates document summaries across pages.
#[derive(Debug)]
pub struct PageAccumulator {
    max_items: usize,
    items: Vec<DocumentSummary>,
    pages: usize,
    /// Every cursor handed out so far.
    seen_cursors: HashSet<String>,
}

impl PageAccumulator {
    pub fn new(max_items: usize) -> Self {
        Self {
            max_items,
            items: Vec::new(),
            pages: 0,
            seen_cursors: HashSet::new(),
        }
    }

    /// Absorbs one page in fetch order.
    pub fn absorb(&mut self, page: FolderPage) -> PageOutcome {
        self.pages += 1;

        for entry in page.items {
            if self.is_full() {
                break;
            }
            if let Some(summary) = DocumentSummary::from_entry(entry) {
                self.items.push(summary);
            }
        }

        if self.is_full() {
            return PageOutcome::Complete;
        }

        match page.next_cursor.filter(|cursor| !cursor.is_empty()) {
            Some(cursor) if self.seen_cursors.contains(&cursor) => PageOutcome::Stalled(cursor),
            Some(cursor) => {
                self.seen_cursors.insert(cursor.clone());
                PageOutcome::Continue(cursor)
            }
            None => PageOutcome::Complete,
        }
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.max_items
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consumes the accumulator into the final listing.
    pub fn finish(self, folder_token: FolderToken) -> FolderListing {
        FolderListing {
            folder_token,
            count: self.items.len(),
            items: self.items,
        }
    }
}

/// Aggregated listing of the documents in a folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderListing {
    pub folder_token: FolderToken,
    pub count: usize,
    pub items: Vec<DocumentSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(token: &str) -> FolderEntry {
        FolderEntry::new(token, format!("Doc {}", token), "docx")
    }

    fn sheet(token: &str) -> FolderEntry {
        FolderEntry::new(token, format!("Sheet {}", token), "sheet")
    }

    fn ids(listing: &FolderListing) -> Vec<&str> {
        listing.items.iter().map(|i| i.document_id.as_str()).collect()
    }

    #[test]
    fn limits_reject_non_positive_page_size() {
        assert!(matches!(
            PaginationLimits::new(0, 10),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(PaginationLimits::new(-3, 10).is_err());
    }

    #[test]
    fn limits_reject_non_positive_max_items() {
        assert!(PaginationLimits::new(10, 0).is_err());
    }

    #[test]
    fn limits_clamp_oversized_pages() {
        let limits = PaginationLimits::new(1000, 10).unwrap();
        assert_eq!(limits.page_size(), MAX_PAGE_SIZE);
        assert_eq!(limits.max_items(), 10);
    }

    #[test]
    fn default_limits_match_action_defaults() {
        let limits = PaginationLimits::default();
        assert_eq!(limits.page_size(), 100);
        assert_eq!(limits.max_items(), 500);
    }

    #[test]
    fn continues_while_cursor_present() {
        let mut acc = PageAccumulator::new(10);
        let outcome = acc.absorb(FolderPage::new(vec![doc("a")], Some("c1".into())));
        assert_eq!(outcome, PageOutcome::Continue("c1".to_string()));

        let outcome = acc.absorb(FolderPage::new(vec![doc("b")], None));
        assert_eq!(outcome, PageOutcome::Complete);
        assert_eq!(acc.pages_fetched(), 2);
    }

    #[test]
    fn empty_cursor_means_exhausted() {
        let mut acc = PageAccumulator::new(10);
        let outcome = acc.absorb(FolderPage::new(vec![doc("a")], Some(String::new())));
        assert_eq!(outcome, PageOutcome::Complete);
    }

    #[test]
    fn truncates_mid_page_at_cap() {
        let mut acc = PageAccumulator::new(3);
        acc.absorb(FolderPage::new(vec![doc("a"), doc("b")], Some("c1".into())));
        let outcome = acc.absorb(FolderPage::new(
            vec![doc("c"), doc("d"), doc("e")],
            Some("c2".into()),
        ));

        assert_eq!(outcome, PageOutcome::Complete);
        let listing = acc.finish(FolderToken::new("fld").unwrap());
        assert_eq!(listing.count, 3);
        assert_eq!(ids(&listing), vec!["a", "b", "c"]);
    }

    #[test]
    fn non_documents_do_not_count_toward_cap() {
        let mut acc = PageAccumulator::new(2);
        let outcome = acc.absorb(FolderPage::new(
            vec![sheet("s1"), doc("a"), sheet("s2"), sheet("s3")],
            Some("c1".into()),
        ));
        assert_eq!(outcome, PageOutcome::Continue("c1".to_string()));
        assert_eq!(acc.len(), 1);

        acc.absorb(FolderPage::new(vec![sheet("s4"), doc("b")], Some("c2".into())));
        let listing = acc.finish(FolderToken::new("fld").unwrap());
        assert_eq!(ids(&listing), vec!["a", "b"]);
    }

    #[test]
    fn repeated_cursor_is_reported_as_stalled() {
        let mut acc = PageAccumulator::new(10);
        acc.absorb(FolderPage::new(vec![doc("a")], Some("same".into())));
        let outcome = acc.absorb(FolderPage::new(vec![doc("b")], Some("same".into())));
        assert_eq!(outcome, PageOutcome::Stalled("same".to_string()));
    }

    #[test]
    fn alternating_cursors_are_reported_as_stalled() {
        let mut acc = PageAccumulator::new(10);
        let page = |cursor: &str| FolderPage::new(vec![], Some(cursor.to_string()));

        assert_eq!(acc.absorb(page("A")), PageOutcome::Continue("A".to_string()));
        assert_eq!(acc.absorb(page("B")), PageOutcome::Continue("B".to_string()));
        assert_eq!(acc.absorb(page("A")), PageOutcome::Stalled("A".to_string()));
    }

    #[test]
    fn empty_folder_finishes_empty() {
        let mut acc = PageAccumulator::new(5);
        assert_eq!(acc.absorb(FolderPage::default()), PageOutcome::Complete);
        assert!(acc.is_empty());
        let listing = acc.finish(FolderToken::new("fld").unwrap());
        assert_eq!(listing.count, 0);
    }
}
