//! Block tree model.
//!
//! The service returns a document as a flat list of blocks, each naming its
//! parent and its ordered children. [`BlockTree`] indexes that list by id,
//! checks that the references form a proper tree hanging off the document
//! root, and fixes the pre-order visiting sequence.
//!
//! The service is not trusted to be consistent. Integrity is verified, never
//! assumed:
//!
//! - ids are unique
//! - every parent reference resolves to a block or to the root
//! - parent chains terminate (no cycles)
//! - every listed child exists and names the listing block as its parent
//! - every block is reachable from the root exactly once

use std::collections::{HashMap, HashSet};

use super::block::Block;
use crate::domain::foundation::{BlockId, DocsError};

/// Validated, id-indexed view of one document's blocks.
#[derive(Debug, Clone)]
pub struct BlockTree {
    root_id: BlockId,
    blocks: HashMap<BlockId, Block>,
    root_children: Vec<BlockId>,
    preorder: Vec<BlockId>,
}

impl BlockTree {
    /// Builds and validates a tree.
    ///
    /// `root_id` is the synthetic root (the document id). If the list holds a
    /// block with that id (the page block), its children give the root order
    /// and it is not itself part of the traversal. Otherwise blocks without a
    /// parent, or parented to the root, form the root children in list order.
    ///
    /// # Errors
    ///
    /// Returns `DocsError::StructuralIntegrity` for any inconsistency listed
    /// in the module documentation.
    pub fn build(root_id: BlockId, blocks: Vec<Block>) -> Result<Self, DocsError> {
        let mut arena: HashMap<BlockId, Block> = HashMap::with_capacity(blocks.len());
        let mut page_children: Option<Vec<BlockId>> = None;
        let mut parentless = Vec::new();

        for block in blocks {
            if block.block_id == root_id {
                if page_children.is_some() {
                    return Err(DocsError::structural(format!(
                        "root block {} listed twice",
                        root_id
                    )));
                }
                page_children = Some(block.children);
                continue;
            }

            let id = block.block_id.clone();
            let root_level = match &block.parent_id {
                None => true,
                Some(parent) => *parent == root_id,
            };
            if arena.insert(id.clone(), block).is_some() {
                return Err(DocsError::structural(format!("block {} listed twice", id)));
            }
            if root_level {
                parentless.push(id);
            }
        }

        let mut tree = Self {
            root_children: page_children.unwrap_or(parentless),
            root_id,
            blocks: arena,
            preorder: Vec::new(),
        };
        tree.check_parents()?;
        tree.check_acyclic()?;
        tree.check_children()?;
        tree.preorder = tree.walk()?;
        Ok(tree)
    }

    pub fn root_id(&self) -> &BlockId {
        &self.root_id
    }

    /// Ids of the top-level blocks, in rendering order.
    pub fn root_children(&self) -> &[BlockId] {
        &self.root_children
    }

    /// Number of top-level blocks (write positions range over these).
    pub fn top_level_count(&self) -> usize {
        self.root_children.len()
    }

    pub fn get(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.get(id)
    }

    /// Number of blocks, excluding the root.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Blocks in document order (pre-order from the root), each exactly once.
    pub fn preorder(&self) -> impl Iterator<Item = &Block> + '_ {
        self.preorder.iter().filter_map(move |id| self.blocks.get(id))
    }

    fn is_root(&self, parent: &Option<BlockId>) -> bool {
        match parent {
            None => true,
            Some(id) => *id == self.root_id,
        }
    }

    fn check_parents(&self) -> Result<(), DocsError> {
        for block in self.blocks.values() {
            if let Some(parent) = &block.parent_id {
                if *parent != self.root_id && !self.blocks.contains_key(parent) {
                    return Err(DocsError::structural(format!(
                        "block {} references missing parent {}",
                        block.block_id, parent
                    )));
                }
            }
        }
        Ok(())
    }

    /// Walks every parent chain up to the root with a visited set.
    fn check_acyclic(&self) -> Result<(), DocsError> {
        let mut grounded: HashSet<&BlockId> = HashSet::new();

        for start in self.blocks.keys() {
            let mut path: Vec<&BlockId> = Vec::new();
            let mut on_path: HashSet<&BlockId> = HashSet::new();
            let mut current = start;

            loop {
                if grounded.contains(current) {
                    break;
                }
                if !on_path.insert(current) {
                    return Err(DocsError::structural(format!(
                        "cycle detected through block {}",
                        current
                    )));
                }
                path.push(current);

                // Parents were resolved in check_parents.
                let block = &self.blocks[current];
                match &block.parent_id {
                    Some(parent) if *parent != self.root_id => current = parent,
                    _ => break,
                }
            }

            grounded.extend(path);
        }
        Ok(())
    }

    fn check_children(&self) -> Result<(), DocsError> {
        for child in &self.root_children {
            let block = self.resolve_child(&self.root_id, child)?;
            if !self.is_root(&block.parent_id) {
                return Err(inconsistent_parent(&self.root_id, block));
            }
        }

        for parent in self.blocks.values() {
            for child in &parent.children {
                let block = self.resolve_child(&parent.block_id, child)?;
                if block.parent_id.as_ref() != Some(&parent.block_id) {
                    return Err(inconsistent_parent(&parent.block_id, block));
                }
            }
        }
        Ok(())
    }

    fn resolve_child(&self, parent: &BlockId, child: &BlockId) -> Result<&Block, DocsError> {
        self.blocks.get(child).ok_or_else(|| {
            DocsError::structural(format!(
                "block {} lists missing child {}",
                parent, child
            ))
        })
    }

    /// Iterative pre-order walk; every block must be reached exactly once.
    fn walk(&self) -> Result<Vec<BlockId>, DocsError> {
        let mut order = Vec::with_capacity(self.blocks.len());
        let mut visited: HashSet<&BlockId> = HashSet::with_capacity(self.blocks.len());
        let mut stack: Vec<&BlockId> = self.root_children.iter().rev().collect();

        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                return Err(DocsError::structural(format!(
                    "block {} is reachable more than once",
                    id
                )));
            }
            order.push(id.clone());
            stack.extend(self.blocks[id].children.iter().rev());
        }

        if order.len() != self.blocks.len() {
            let mut unreachable: Vec<&BlockId> = self
                .blocks
                .keys()
                .filter(|id| !visited.contains(id))
                .collect();
            unreachable.sort();
            return Err(DocsError::structural(format!(
                "{} block(s) unreachable from the root, first: {}",
                unreachable.len(),
                unreachable[0]
            )));
        }

        Ok(order)
    }
}

fn inconsistent_parent(listed_by: &BlockId, block: &Block) -> DocsError {
    let recorded = block
        .parent_id
        .as_ref()
        .map(|p| p.to_string())
        .unwrap_or_else(|| "<none>".to_string());
    DocsError::structural(format!(
        "block {} is listed by {} but names {} as its parent",
        block.block_id, listed_by, recorded
    ))
}
