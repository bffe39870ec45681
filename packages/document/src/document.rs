//! # Document Tree
//!
//! Owns every block of a document in a single arena keyed by block ID.
//! The arena doubles as the lookup index, so `get_block` is O(1) and no
//! two handles ever alias the same mutable block.
//!
//! ```text
//! root_children: [a, b]
//! blocks: a -> Node { parent: "root", children: Some([c]) }
//!         b -> Node { parent: "root", children: None }
//!         c -> Node { parent: "a",    children: None }
//! ```
//!
//! Invariants, checked by [`Document::verify_integrity`]:
//! 1. Every ID is unique (the arena key *is* the ID).
//! 2. A node's `parent_id` names the node whose child list holds it.
//! 3. The arena holds exactly the blocks reachable from the root.
//! 4. A node has a child list iff its type can have children.
//! 5. `size() == block_count() + 1`.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::block::with_stack;
use crate::{Block, BlockKind, BlockType, DocumentError, DocumentRoot, Result, ROOT_ID};

/// Arena entry for one block
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Node {
    pub(crate) kind: BlockKind,
    pub(crate) parent_id: String,
    pub(crate) children: Option<Vec<String>>,
}

/// Block tree with O(1) lookup by ID
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub(crate) root_children: Vec<String>,
    pub(crate) blocks: HashMap<String, Node>,
}

/// Replacement content for [`Document::swap`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SwapSource {
    /// Serialized document JSON, run through the validation pipeline
    Json(String),
    /// Owned root value, validated the same way
    Root(DocumentRoot),
    /// Another tree, taken by value
    #[serde(skip)]
    Document(Box<Document>),
}

impl Document {
    /// Create an empty document (root only)
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        crate::validate::parse_document(json)
    }

    /// Build a document from an owned root value
    pub fn from_root(root: &DocumentRoot) -> Result<Self> {
        let value = serde_json::to_value(root)
            .map_err(|e| DocumentError::Serialization(e.to_string()))?;
        crate::validate::document_from_value(&value)
    }

    /// Canonical pretty-printed JSON (2-space indentation)
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| DocumentError::Serialization(e.to_string()))
    }

    /// Number of nodes including the root
    pub fn size(&self) -> usize {
        self.blocks.len() + 1
    }

    /// Number of blocks (root excluded)
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Whether `id` names the root or an indexed block
    pub fn contains(&self, id: &str) -> bool {
        id == ROOT_ID || self.blocks.contains_key(id)
    }

    /// Look up a block by ID. The root is not a block and returns `None`.
    pub fn get_block(&self, id: &str) -> Option<BlockRef<'_>> {
        self.blocks
            .get_key_value(id)
            .map(|(key, node)| BlockRef {
                doc: self,
                id: key.as_str(),
                node,
            })
    }

    /// Top-level blocks in order
    pub fn root_children(&self) -> impl Iterator<Item = BlockRef<'_>> + '_ {
        self.root_children.iter().filter_map(move |id| self.get_block(id))
    }

    /// Materialize the whole tree as an owned root value
    pub fn to_root(&self) -> DocumentRoot {
        DocumentRoot::new(self.root_children().map(|block| block.to_block()).collect())
    }

    /// Visit every block in level order (root excluded)
    pub fn traverse<'a, F>(&'a self, visit: F)
    where
        F: FnMut(BlockRef<'a>),
    {
        self.walk_level_order(&self.root_children, visit);
    }

    /// Visit the descendants of `id` in level order (`id` excluded)
    pub fn traverse_from<'a, F>(&'a self, id: &str, visit: F) -> Result<()>
    where
        F: FnMut(BlockRef<'a>),
    {
        if id == ROOT_ID {
            self.traverse(visit);
            return Ok(());
        }

        let node = self.blocks.get(id).ok_or_else(|| DocumentError::BlockNotFound {
            block_id: id.to_string(),
        })?;

        if let Some(children) = &node.children {
            self.walk_level_order(children, visit);
        }
        Ok(())
    }

    fn walk_level_order<'a, F>(&'a self, start: &'a [String], mut visit: F)
    where
        F: FnMut(BlockRef<'a>),
    {
        let mut queue: VecDeque<&'a str> = start.iter().map(String::as_str).collect();

        while let Some(id) = queue.pop_front() {
            if let Some(block) = self.get_block(id) {
                if let Some(children) = block.child_ids() {
                    queue.extend(children.iter().map(String::as_str));
                }
                visit(block);
            }
        }
    }

    /// Replace the whole tree
    ///
    /// The incoming content is validated first; on error `self` is untouched.
    pub fn swap(&mut self, source: SwapSource) -> Result<()> {
        let next = match source {
            SwapSource::Json(json) => Document::from_json(&json)?,
            SwapSource::Root(root) => Document::from_root(&root)?,
            SwapSource::Document(doc) => *doc,
        };

        tracing::debug!(blocks = next.block_count(), "swapping document");
        *self = next;
        Ok(())
    }

    /// Recheck all tree invariants, reporting the first violation
    pub fn verify_integrity(&self) -> Result<()> {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<(&str, &str)> = self
            .root_children
            .iter()
            .map(|id| (ROOT_ID, id.as_str()))
            .collect();

        while let Some((parent_id, id)) = queue.pop_front() {
            if !visited.insert(id) {
                return Err(inconsistent(format!("block {} is reachable twice", id)));
            }

            let node = self
                .blocks
                .get(id)
                .ok_or_else(|| inconsistent(format!("child {} of {} is not indexed", id, parent_id)))?;

            if node.parent_id != parent_id {
                return Err(inconsistent(format!(
                    "block {} links to parent {} but is listed under {}",
                    id, node.parent_id, parent_id
                )));
            }

            match (&node.children, node.kind.can_have_children()) {
                (Some(children), true) => {
                    queue.extend(children.iter().map(|child| (id, child.as_str())));
                }
                (None, false) => {}
                (Some(_), false) => {
                    return Err(inconsistent(format!(
                        "{} block {} carries a children list",
                        node.kind.block_type(),
                        id
                    )))
                }
                (None, true) => {
                    return Err(inconsistent(format!(
                        "{} block {} is missing its children list",
                        node.kind.block_type(),
                        id
                    )))
                }
            }
        }

        if visited.len() != self.blocks.len() {
            return Err(inconsistent(format!(
                "{} indexed blocks are not reachable from the root",
                self.blocks.len() - visited.len()
            )));
        }

        Ok(())
    }

    /// Child list of the root or of a container block
    pub(crate) fn child_list(&self, id: &str) -> Option<&Vec<String>> {
        if id == ROOT_ID {
            Some(&self.root_children)
        } else {
            self.blocks.get(id).and_then(|node| node.children.as_ref())
        }
    }

    pub(crate) fn child_list_mut(&mut self, id: &str) -> Option<&mut Vec<String>> {
        if id == ROOT_ID {
            Some(&mut self.root_children)
        } else {
            self.blocks.get_mut(id).and_then(|node| node.children.as_mut())
        }
    }

    /// Whether `ancestor` lies on the parent chain of `id`
    pub(crate) fn is_ancestor(&self, ancestor: &str, id: &str) -> bool {
        let mut current = self.blocks.get(id).map(|node| node.parent_id.as_str());
        let mut steps = 0;

        while let Some(parent_id) = current {
            if parent_id == ancestor {
                return true;
            }
            steps += 1;
            if parent_id == ROOT_ID || steps > self.blocks.len() {
                break;
            }
            current = self.blocks.get(parent_id).map(|node| node.parent_id.as_str());
        }

        false
    }

    /// IDs of `id` and all of its descendants
    pub(crate) fn subtree_ids(&self, id: &str) -> Vec<String> {
        let mut result = Vec::new();
        let mut stack = vec![id.to_string()];

        while let Some(id) = stack.pop() {
            if let Some(node) = self.blocks.get(&id) {
                if let Some(children) = &node.children {
                    stack.extend(children.iter().cloned());
                }
                result.push(id);
            }
        }

        result
    }
}

fn inconsistent(reason: String) -> DocumentError {
    DocumentError::InconsistentTree { reason }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Document", 2)?;
        state.serialize_field("id", ROOT_ID)?;
        state.serialize_field("children", &ChildrenOf(self.root_children().collect()))?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        crate::validate::document_from_value(&value).map_err(serde::de::Error::custom)
    }
}

/// Borrowed view of one block inside a [`Document`]
#[derive(Clone, Copy)]
pub struct BlockRef<'a> {
    doc: &'a Document,
    id: &'a str,
    node: &'a Node,
}

impl<'a> BlockRef<'a> {
    pub fn id(&self) -> &'a str {
        self.id
    }

    pub fn parent_id(&self) -> &'a str {
        &self.node.parent_id
    }

    pub fn kind(&self) -> &'a BlockKind {
        &self.node.kind
    }

    pub fn block_type(&self) -> BlockType {
        self.node.kind.block_type()
    }

    /// Child IDs, `None` for leaf types
    pub fn child_ids(&self) -> Option<&'a [String]> {
        let node: &'a Node = self.node;
        node.children.as_deref()
    }

    /// Child blocks in order (empty for leaf types)
    pub fn children(&self) -> impl Iterator<Item = BlockRef<'a>> + 'a {
        let doc = self.doc;
        self.child_ids()
            .unwrap_or(&[])
            .iter()
            .filter_map(move |id| doc.get_block(id))
    }

    /// Deep copy of this block and its subtree
    pub fn to_block(&self) -> Block {
        Block {
            id: self.id.to_string(),
            parent_id: self.node.parent_id.clone(),
            kind: self.node.kind.clone(),
            children: self
                .node
                .children
                .as_ref()
                .map(|_| self.children().map(|child| with_stack(|| child.to_block())).collect()),
        }
    }
}

impl fmt::Debug for BlockRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockRef")
            .field("id", &self.id)
            .field("parent_id", &self.node.parent_id)
            .field("type", &self.block_type())
            .finish()
    }
}

impl PartialEq for BlockRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

impl Serialize for BlockRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let len = if self.node.children.is_some() { 5 } else { 4 };
        let mut state = serializer.serialize_struct("Block", len)?;
        state.serialize_field("id", self.id)?;
        state.serialize_field("parentId", &self.node.parent_id)?;
        state.serialize_field("type", &self.block_type())?;
        state.serialize_field("data", &self.node.kind.data())?;
        if self.node.children.is_some() {
            with_stack(|| state.serialize_field("children", &ChildrenOf(self.children().collect())))?;
        }
        state.end()
    }
}

struct ChildrenOf<'a>(Vec<BlockRef<'a>>);

impl Serialize for ChildrenOf<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}
