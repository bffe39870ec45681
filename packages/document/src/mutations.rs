//! # Tree Mutations
//!
//! Structural operations on a [`Document`]. Every operation runs all of its
//! checks before touching the arena, so a returned error leaves the tree
//! exactly as it was.
//!
//! Payload blocks are copied into the arena: the caller keeps ownership of
//! its value and later changes to it never reach the tree.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::Node;
use crate::{Block, Document, DocumentError, Result, ROOT_ID};

/// Placement relative to a target block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveStrategy {
    Before,
    After,
    /// Last child of the target
    #[default]
    Append,
}

impl fmt::Display for MoveStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MoveStrategy::Before => "before",
            MoveStrategy::After => "after",
            MoveStrategy::Append => "append",
        })
    }
}

/// How `update_block` treats the children of the block it replaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChildrenStrategy {
    /// Discard the old subtree; containers start empty
    #[default]
    Drop,
    /// Re-parent the old children under the new block
    Preserve,
    /// Discard the old subtree and insert the payload's children
    Replace,
}

impl fmt::Display for ChildrenStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChildrenStrategy::Drop => "drop",
            ChildrenStrategy::Preserve => "preserve",
            ChildrenStrategy::Replace => "replace",
        })
    }
}

/// Why a block could not be located in its parent's child list
enum ParentLookup {
    Missing,
    Childless,
    NotListed,
}

impl Document {
    /// Append `payload` (and its subtree) as the last child of `parent_id`
    pub fn append_child(&mut self, parent_id: &str, payload: &Block) -> Result<()> {
        self.check_new_ids(payload, parent_id, &mut HashSet::new(), &HashSet::new())?;

        match self.blocks.get(parent_id) {
            None if parent_id != ROOT_ID => {
                return Err(DocumentError::InvalidParentBlock {
                    parent_id: parent_id.to_string(),
                })
            }
            Some(parent) if !parent.kind.can_have_children() => {
                return Err(DocumentError::ParentBlockCannotHaveChildren {
                    parent_id: parent_id.to_string(),
                    parent_type: parent.kind.block_type(),
                })
            }
            _ => {}
        }

        tracing::trace!(block_id = %payload.id, parent_id, "append block");
        self.attach_subtree(payload, parent_id);
        if let Some(children) = self.child_list_mut(parent_id) {
            children.push(payload.id.clone());
        }
        Ok(())
    }

    /// Insert `payload` as the sibling directly before `target_id`
    pub fn insert_before(&mut self, target_id: &str, payload: &Block) -> Result<()> {
        self.insert_sibling(target_id, payload, false)
    }

    /// Insert `payload` as the sibling directly after `target_id`
    pub fn insert_after(&mut self, target_id: &str, payload: &Block) -> Result<()> {
        self.insert_sibling(target_id, payload, true)
    }

    /// Insert by strategy: `append` treats `target_id` as the parent
    pub fn insert(&mut self, target_id: &str, payload: &Block, strategy: MoveStrategy) -> Result<()> {
        match strategy {
            MoveStrategy::Before => self.insert_before(target_id, payload),
            MoveStrategy::After => self.insert_after(target_id, payload),
            MoveStrategy::Append => self.append_child(target_id, payload),
        }
    }

    fn insert_sibling(&mut self, target_id: &str, payload: &Block, after: bool) -> Result<()> {
        if target_id == ROOT_ID {
            return Err(if after {
                DocumentError::CannotInsertAfterRoot
            } else {
                DocumentError::CannotInsertBeforeRoot
            });
        }

        let parent_id = self
            .blocks
            .get(target_id)
            .map(|target| target.parent_id.clone())
            .ok_or_else(|| DocumentError::TargetBlockNotFound {
                target_id: target_id.to_string(),
            })?;

        self.check_new_ids(payload, &parent_id, &mut HashSet::new(), &HashSet::new())?;

        let position = self
            .position_in_parent(target_id, &parent_id)
            .map_err(|lookup| target_lookup_error(lookup, target_id, &parent_id))?;
        let offset = if after { position + 1 } else { position };

        tracing::trace!(block_id = %payload.id, target_id, after, "insert sibling");
        self.attach_subtree(payload, &parent_id);
        if let Some(children) = self.child_list_mut(&parent_id) {
            children.insert(offset, payload.id.clone());
        }
        Ok(())
    }

    /// Remove a block and its whole subtree
    pub fn remove(&mut self, block_id: &str) -> Result<()> {
        if block_id == ROOT_ID {
            return Err(DocumentError::CannotRemoveRoot);
        }

        let parent_id = self
            .blocks
            .get(block_id)
            .map(|node| node.parent_id.clone())
            .ok_or_else(|| DocumentError::BlockToRemoveNotFound {
                block_id: block_id.to_string(),
            })?;

        let position = self
            .position_in_parent(block_id, &parent_id)
            .map_err(|lookup| remove_lookup_error(lookup, block_id, &parent_id))?;

        if let Some(children) = self.child_list_mut(&parent_id) {
            children.remove(position);
        }
        let removed = self.forget_subtree(block_id);
        tracing::trace!(block_id, removed, "removed subtree");
        Ok(())
    }

    /// Replace a block in place with a node built from `payload`
    ///
    /// The new node takes the old one's position; `strategy` decides what
    /// happens to the old children. `payload.id` may equal `block_id`.
    pub fn update_block(
        &mut self,
        block_id: &str,
        payload: &Block,
        strategy: ChildrenStrategy,
    ) -> Result<()> {
        if block_id == ROOT_ID {
            return Err(DocumentError::CannotUpdateRoot);
        }

        let (parent_id, old_type) = self
            .blocks
            .get(block_id)
            .map(|node| (node.parent_id.clone(), node.kind.block_type()))
            .ok_or_else(|| DocumentError::BlockToUpdateNotFound {
                block_id: block_id.to_string(),
            })?;

        let position = self
            .position_in_parent(block_id, &parent_id)
            .map_err(|lookup| update_lookup_error(lookup, block_id, &parent_id))?;

        if payload.id.is_empty() {
            return Err(DocumentError::InvalidBlockId { parent_id });
        }
        if payload.id != block_id && self.contains(&payload.id) {
            return Err(DocumentError::BlockIdConflict {
                block_id: block_id.to_string(),
                new_id: payload.id.clone(),
            });
        }

        let new_type = payload.block_type();
        let old_container = old_type.can_have_children();
        let new_container = new_type.can_have_children();

        match strategy {
            ChildrenStrategy::Drop => {}
            ChildrenStrategy::Preserve => match (old_container, new_container) {
                (true, false) => {
                    return Err(DocumentError::CannotPreserveChildrenOnTarget {
                        block_id: block_id.to_string(),
                        new_type,
                    })
                }
                (false, true) => {
                    return Err(DocumentError::CannotPreserveFromChildlessSource {
                        block_id: block_id.to_string(),
                        old_type,
                    })
                }
                _ => {}
            },
            ChildrenStrategy::Replace => {
                match (old_container, new_container) {
                    (false, false) => {
                        return Err(DocumentError::ReplaceStrategyNotApplicable {
                            block_id: block_id.to_string(),
                            old_type,
                            new_type,
                        })
                    }
                    (true, false) => {
                        return Err(DocumentError::ReplaceStrategyTargetCannotHaveChildren {
                            block_id: block_id.to_string(),
                            new_type,
                        })
                    }
                    (false, true) => {
                        return Err(DocumentError::ReplaceStrategySourceHasNoChildren {
                            block_id: block_id.to_string(),
                            old_type,
                        })
                    }
                    (true, true) => {}
                }

                let children = payload.children.as_ref().ok_or_else(|| {
                    DocumentError::ReplaceStrategyMissingNewChildren {
                        block_id: block_id.to_string(),
                    }
                })?;

                // The old subtree is discarded, so its IDs may be reused.
                let freed: HashSet<String> = self.subtree_ids(block_id).into_iter().collect();
                let mut seen = HashSet::new();
                seen.insert(payload.id.as_str());
                for child in children {
                    self.check_new_ids(child, &payload.id, &mut seen, &freed)?;
                }
            }
        }

        tracing::trace!(block_id, new_id = %payload.id, %strategy, "update block");

        let children = match strategy {
            ChildrenStrategy::Drop => {
                self.forget_subtree(block_id);
                new_container.then(Vec::new)
            }
            ChildrenStrategy::Preserve => {
                let old_children = self.blocks.remove(block_id).and_then(|node| node.children);
                for child_id in old_children.iter().flatten() {
                    if let Some(child) = self.blocks.get_mut(child_id) {
                        child.parent_id = payload.id.clone();
                    }
                }
                old_children
            }
            ChildrenStrategy::Replace => {
                self.forget_subtree(block_id);
                let new_children = payload.children.as_deref().unwrap_or(&[]);
                for child in new_children {
                    self.attach_subtree(child, &payload.id);
                }
                Some(new_children.iter().map(|child| child.id.clone()).collect())
            }
        };

        self.blocks.insert(
            payload.id.clone(),
            Node {
                kind: payload.kind.clone(),
                parent_id: parent_id.clone(),
                children,
            },
        );
        if let Some(siblings) = self.child_list_mut(&parent_id) {
            siblings[position] = payload.id.clone();
        }
        Ok(())
    }

    /// Relocate a block (with its subtree) relative to `target_id`
    ///
    /// Equivalent to removing the block and inserting it again, except that
    /// the arena entries are relinked rather than rebuilt.
    pub fn move_block(&mut self, block_id: &str, target_id: &str, strategy: MoveStrategy) -> Result<()> {
        if block_id == target_id {
            return Err(DocumentError::CannotMoveBlockToItself {
                block_id: block_id.to_string(),
            });
        }
        if block_id == ROOT_ID {
            return Err(DocumentError::CannotMoveRoot);
        }
        if target_id == ROOT_ID && strategy != MoveStrategy::Append {
            return Err(DocumentError::CannotMoveRelativeToRoot {
                block_id: block_id.to_string(),
            });
        }

        let old_parent = self
            .blocks
            .get(block_id)
            .map(|node| node.parent_id.clone())
            .ok_or_else(|| DocumentError::BlockToMoveNotFound {
                block_id: block_id.to_string(),
            })?;

        if !self.contains(target_id) {
            return Err(DocumentError::MoveTargetNotFound {
                target_id: target_id.to_string(),
            });
        }

        if strategy == MoveStrategy::Append {
            if let Some(target) = self.blocks.get(target_id) {
                if !target.kind.can_have_children() {
                    return Err(DocumentError::MoveTargetCannotHaveChildren {
                        target_id: target_id.to_string(),
                        target_type: target.kind.block_type(),
                    });
                }
            }
        }

        if self.is_ancestor(block_id, target_id) {
            return Err(DocumentError::CannotMoveBlockToDescendant {
                block_id: block_id.to_string(),
                target_id: target_id.to_string(),
            });
        }

        let old_position = self
            .position_in_parent(block_id, &old_parent)
            .map_err(|lookup| remove_lookup_error(lookup, block_id, &old_parent))?;

        let (new_parent, mut offset) = match strategy {
            MoveStrategy::Append => {
                let len = self.child_list(target_id).map_or(0, Vec::len);
                (target_id.to_string(), len)
            }
            MoveStrategy::Before | MoveStrategy::After => {
                let target_parent = self
                    .blocks
                    .get(target_id)
                    .map(|target| target.parent_id.clone())
                    .unwrap_or_default();
                let position = self
                    .position_in_parent(target_id, &target_parent)
                    .map_err(|lookup| target_lookup_error(lookup, target_id, &target_parent))?;
                let offset = if strategy == MoveStrategy::After {
                    position + 1
                } else {
                    position
                };
                (target_parent, offset)
            }
        };

        // Account for the slot freed by detaching from the same list.
        if new_parent == old_parent && old_position < offset {
            offset -= 1;
        }

        tracing::trace!(block_id, target_id, %strategy, "move block");

        if let Some(siblings) = self.child_list_mut(&old_parent) {
            siblings.remove(old_position);
        }
        if let Some(siblings) = self.child_list_mut(&new_parent) {
            siblings.insert(offset, block_id.to_string());
        }
        if let Some(node) = self.blocks.get_mut(block_id) {
            node.parent_id = new_parent;
        }
        Ok(())
    }

    fn position_in_parent(&self, id: &str, parent_id: &str) -> std::result::Result<usize, ParentLookup> {
        if !self.contains(parent_id) {
            return Err(ParentLookup::Missing);
        }
        let children = self.child_list(parent_id).ok_or(ParentLookup::Childless)?;
        children
            .iter()
            .position(|child| child == id)
            .ok_or(ParentLookup::NotListed)
    }

    /// Reject payload IDs that are empty, repeated within the payload, or
    /// already indexed (unless listed in `freed`)
    fn check_new_ids<'b>(
        &self,
        payload: &'b Block,
        parent_id: &'b str,
        seen: &mut HashSet<&'b str>,
        freed: &HashSet<String>,
    ) -> Result<()> {
        let mut stack = vec![(payload, parent_id)];

        while let Some((block, parent_id)) = stack.pop() {
            if block.id.is_empty() {
                return Err(DocumentError::InvalidBlockId {
                    parent_id: parent_id.to_string(),
                });
            }
            if !seen.insert(block.id.as_str()) {
                return Err(DocumentError::DuplicateOrCircularBlock {
                    block_id: block.id.clone(),
                });
            }
            let taken = block.id == ROOT_ID
                || (self.blocks.contains_key(&block.id) && !freed.contains(&block.id));
            if taken {
                return Err(DocumentError::BlockAlreadyExists {
                    block_id: block.id.clone(),
                });
            }

            // Leaf payloads never contribute children.
            if block.can_have_children() {
                for child in block.children.iter().flatten().rev() {
                    stack.push((child, block.id.as_str()));
                }
            }
        }

        Ok(())
    }

    /// Copy a payload subtree into the arena, normalizing child lists
    fn attach_subtree(&mut self, payload: &Block, parent_id: &str) {
        let mut stack = vec![(payload, parent_id.to_string())];

        while let Some((block, parent_id)) = stack.pop() {
            let children = if block.can_have_children() {
                let payload_children = block.children.as_deref().unwrap_or(&[]);
                for child in payload_children {
                    stack.push((child, block.id.clone()));
                }
                Some(payload_children.iter().map(|child| child.id.clone()).collect())
            } else {
                None
            };

            self.blocks.insert(
                block.id.clone(),
                Node {
                    kind: block.kind.clone(),
                    parent_id,
                    children,
                },
            );
        }
    }

    /// Drop a block and its descendants from the arena
    fn forget_subtree(&mut self, block_id: &str) -> usize {
        let mut stack = vec![block_id.to_string()];
        let mut removed = 0;

        while let Some(id) = stack.pop() {
            if let Some(node) = self.blocks.remove(&id) {
                removed += 1;
                stack.extend(node.children.into_iter().flatten());
            }
        }

        removed
    }
}

fn target_lookup_error(lookup: ParentLookup, target_id: &str, parent_id: &str) -> DocumentError {
    let target_id = target_id.to_string();
    let parent_id = parent_id.to_string();
    match lookup {
        ParentLookup::Missing => DocumentError::ParentOfTargetNotFound { target_id, parent_id },
        ParentLookup::Childless => {
            DocumentError::ParentOfTargetCannotHaveChildren { target_id, parent_id }
        }
        ParentLookup::NotListed => DocumentError::TargetNotInParentChildren { target_id, parent_id },
    }
}

fn remove_lookup_error(lookup: ParentLookup, block_id: &str, parent_id: &str) -> DocumentError {
    let block_id = block_id.to_string();
    let parent_id = parent_id.to_string();
    match lookup {
        ParentLookup::Missing => DocumentError::BlockToRemoveHasNoParent { block_id, parent_id },
        ParentLookup::Childless => {
            DocumentError::BlockToRemoveParentCannotHaveChildren { block_id, parent_id }
        }
        ParentLookup::NotListed => DocumentError::BlockNotInParentChildren { block_id, parent_id },
    }
}

fn update_lookup_error(lookup: ParentLookup, block_id: &str, parent_id: &str) -> DocumentError {
    let block_id = block_id.to_string();
    let parent_id = parent_id.to_string();
    match lookup {
        ParentLookup::Missing => DocumentError::BlockToUpdateHasNoParent { block_id, parent_id },
        ParentLookup::Childless => {
            DocumentError::BlockToUpdateParentCannotHaveChildren { block_id, parent_id }
        }
        ParentLookup::NotListed => DocumentError::BlockNotInParentChildren { block_id, parent_id },
    }
}
