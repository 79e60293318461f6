//! Property tests for folder listing aggregation.
//!
//! For any folder contents, page size and cap:
//! - the listing holds min(documents in folder, cap) items
//! - items keep the folder's order
//! - no non-document row is ever returned

use std::sync::Arc;

use proptest::prelude::*;

use feishu_docs_agent::adapters::InMemoryDocsApi;
use feishu_docs_agent::application::{ListFolderDocsHandler, ListFolderDocsQuery};
use feishu_docs_agent::domain::folder::{
    FolderEntry, FolderPage, PageAccumulator, PageOutcome, PaginationLimits,
};
use feishu_docs_agent::domain::foundation::FolderToken;

const FILE_TYPES: [&str; 6] = ["docx", "doc", "wiki", "sheet", "folder", "bitable"];

fn entries(types: &[usize]) -> Vec<FolderEntry> {
    types
        .iter()
        .enumerate()
        .map(|(i, t)| FolderEntry::new(format!("tok{:03}", i), format!("Item {}", i), FILE_TYPES[*t]))
        .collect()
}

fn expected_ids(entries: &[FolderEntry], cap: usize) -> Vec<String> {
    entries
        .iter()
        .filter(|e| e.kind().is_document())
        .take(cap)
        .map(|e| e.token.clone())
        .collect()
}

proptest! {
    #[test]
    fn accumulator_takes_documents_in_order_up_to_cap(
        types in prop::collection::vec(0usize..FILE_TYPES.len(), 0..80),
        page_size in 1usize..15,
        cap in 1usize..50,
    ) {
        let all = entries(&types);
        let pages: Vec<Vec<FolderEntry>> = all.chunks(page_size).map(|c| c.to_vec()).collect();

        let mut acc = PageAccumulator::new(cap);
        for (i, chunk) in pages.iter().enumerate() {
            let next = (i + 1 < pages.len()).then(|| format!("cursor{}", i + 1));
            match acc.absorb(FolderPage::new(chunk.clone(), next)) {
                PageOutcome::Continue(_) => continue,
                PageOutcome::Complete => break,
                PageOutcome::Stalled(cursor) => prop_assert!(false, "stalled on {}", cursor),
            }
        }

        let listing = acc.finish(FolderToken::new("fld").unwrap());
        let ids: Vec<String> = listing.items.iter().map(|s| s.document_id.to_string()).collect();
        prop_assert_eq!(listing.count, ids.len());
        prop_assert_eq!(ids, expected_ids(&all, cap));
        prop_assert!(listing.items.iter().all(|s| s.kind.is_document()));
    }

    #[test]
    fn handler_listing_matches_folder_contents(
        types in prop::collection::vec(0usize..FILE_TYPES.len(), 0..60),
        page_size in 1i64..12,
        cap in 1i64..40,
    ) {
        let all = entries(&types);
        let api = InMemoryDocsApi::new().with_folder("fld", all.clone());
        let handler = ListFolderDocsHandler::new(Arc::new(api));
        let query = ListFolderDocsQuery {
            folder_token: FolderToken::new("fld").unwrap(),
            limits: PaginationLimits::new(page_size, cap).unwrap(),
        };

        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let listing = runtime.block_on(handler.handle(query)).unwrap();

        let ids: Vec<String> = listing.items.iter().map(|s| s.document_id.to_string()).collect();
        prop_assert_eq!(ids, expected_ids(&all, cap as usize));
    }
}
