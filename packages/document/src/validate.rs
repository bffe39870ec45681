//! # Validation Pipeline
//!
//! Builds a [`Document`] from untrusted JSON in a single level-order pass.
//! Each block is checked in this order: `id`, uniqueness, `parentId`,
//! `type`, `data`, `children`. The first failure aborts the whole build,
//! so callers never see a partially constructed tree.

use std::collections::VecDeque;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::document::Node;
use crate::{BlockKind, BlockType, Document, DocumentError, Result, ROOT_ID};

/// Parse document JSON text and validate it
///
/// Nesting depth is unbounded: every block adds two JSON levels, and any
/// tree the mutations can build must load again.
pub fn parse_document(json: &str) -> Result<Document> {
    let mut deserializer = serde_json::Deserializer::from_str(json);
    deserializer.disable_recursion_limit();

    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut deserializer)).map_err(invalid_json)?;
    deserializer.end().map_err(invalid_json)?;
    document_from_value(&value)
}

fn invalid_json(err: serde_json::Error) -> DocumentError {
    DocumentError::InvalidDocumentJson {
        reason: err.to_string(),
    }
}

/// Validate an already-parsed JSON value and build the tree
pub fn document_from_value(value: &Value) -> Result<Document> {
    let root = value.as_object().ok_or_else(|| DocumentError::InvalidDocumentStructure {
        reason: "document must be a JSON object".to_string(),
    })?;

    match root.get("id") {
        Some(Value::String(id)) if id == ROOT_ID => {}
        Some(Value::String(id)) => {
            return Err(DocumentError::InvalidDocumentRootId { found: id.clone() });
        }
        _ => {
            return Err(DocumentError::InvalidDocumentStructure {
                reason: "root id must be a string".to_string(),
            });
        }
    }

    let children = root
        .get("children")
        .and_then(Value::as_array)
        .ok_or_else(|| DocumentError::InvalidDocumentStructure {
            reason: "root children must be an array".to_string(),
        })?;

    let mut doc = Document::new();
    let mut queue: VecDeque<(&str, &Value)> = children.iter().map(|child| (ROOT_ID, child)).collect();

    while let Some((parent_id, value)) = queue.pop_front() {
        let (id, node, children) = validate_block(value, parent_id, &doc)?;

        queue.extend(children.iter().map(|child| (id, child)));
        if let Some(siblings) = doc.child_list_mut(parent_id) {
            siblings.push(id.to_string());
        }
        doc.blocks.insert(id.to_string(), node);
    }

    tracing::debug!(blocks = doc.block_count(), "validated document");
    Ok(doc)
}

fn validate_block<'v>(
    value: &'v Value,
    parent_id: &str,
    doc: &Document,
) -> Result<(&'v str, Node, &'v [Value])> {
    let block = value.as_object().ok_or_else(|| DocumentError::InvalidDocumentStructure {
        reason: format!("child of {} is not a JSON object", parent_id),
    })?;

    let id = block
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| DocumentError::InvalidBlockId {
            parent_id: parent_id.to_string(),
        })?;

    if doc.contains(id) {
        return Err(DocumentError::DuplicateOrCircularBlock {
            block_id: id.to_string(),
        });
    }

    check_parent_link(block, id, parent_id, doc)?;

    let block_type = match block.get("type") {
        Some(Value::String(tag)) => BlockType::parse(tag).ok_or_else(|| DocumentError::InvalidBlockType {
            block_id: id.to_string(),
            found: tag.clone(),
        })?,
        other => {
            return Err(DocumentError::InvalidBlockType {
                block_id: id.to_string(),
                found: other.map_or_else(|| "missing".to_string(), Value::to_string),
            });
        }
    };

    let data = block.get("data").cloned().unwrap_or(Value::Null);
    let kind = BlockKind::from_parts(block_type, data).map_err(|e| DocumentError::InvalidBlockVariant {
        block_id: id.to_string(),
        block_type,
        reason: e.to_string(),
    })?;

    let children: &'v [Value] = match (block.get("children"), block_type.can_have_children()) {
        (None, true) => &[],
        (Some(Value::Array(children)), true) => children,
        (Some(_), true) => {
            return Err(DocumentError::InvalidBlockChildren {
                block_id: id.to_string(),
                reason: "children must be an array".to_string(),
            });
        }
        (None, false) => &[],
        (Some(_), false) => {
            return Err(DocumentError::InvalidBlockChildren {
                block_id: id.to_string(),
                reason: format!("{} blocks cannot have children", block_type),
            });
        }
    };

    let node = Node {
        kind,
        parent_id: parent_id.to_string(),
        children: block_type.can_have_children().then(Vec::new),
    };

    Ok((id, node, children))
}

fn check_parent_link(block: &Map<String, Value>, id: &str, parent_id: &str, doc: &Document) -> Result<()> {
    match block.get("parentId").and_then(Value::as_str) {
        Some(found) if found == parent_id => Ok(()),
        Some(found) if !doc.contains(found) => Err(DocumentError::ParentBlockNotFound {
            block_id: id.to_string(),
            parent_id: found.to_string(),
        }),
        found => Err(DocumentError::InvalidBlockParentId {
            block_id: id.to_string(),
            expected: parent_id.to_string(),
            found: found.map(str::to_string),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc_with(children: Value) -> Value {
        json!({ "id": "root", "children": children })
    }

    fn text(id: &str, parent: &str) -> Value {
        json!({ "id": id, "parentId": parent, "type": "text", "data": { "text": id } })
    }

    #[test]
    fn test_parses_nested_document() {
        let value = doc_with(json!([
            {
                "id": "todo",
                "parentId": "root",
                "type": "todoList",
                "data": { "text": "Ship", "checked": true },
                "children": [text("a", "todo"), text("b", "todo")]
            },
            { "id": "hr", "parentId": "root", "type": "divider", "data": {} }
        ]));

        let doc = document_from_value(&value).unwrap();
        assert_eq!(doc.block_count(), 4);
        assert_eq!(doc.root_children, vec!["todo", "hr"]);
        assert_eq!(doc.child_list("todo").unwrap(), &vec!["a".to_string(), "b".to_string()]);
        doc.verify_integrity().unwrap();
    }

    #[test]
    fn test_container_without_children_gets_empty_list() {
        let value = doc_with(json!([
            { "id": "c", "parentId": "root", "type": "callout", "data": { "text": "hi" } }
        ]));
        let doc = document_from_value(&value).unwrap();
        assert_eq!(doc.get_block("c").unwrap().child_ids(), Some(&[][..]));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = parse_document("{\"id\": \"root\",").unwrap_err();
        assert!(matches!(err, DocumentError::InvalidDocumentJson { .. }));
    }

    #[test]
    fn test_rejects_bad_root_shape() {
        let err = document_from_value(&json!([])).unwrap_err();
        assert!(matches!(err, DocumentError::InvalidDocumentStructure { .. }));

        let err = document_from_value(&json!({ "id": 7, "children": [] })).unwrap_err();
        assert!(matches!(err, DocumentError::InvalidDocumentStructure { .. }));

        let err = document_from_value(&json!({ "id": "top", "children": [] })).unwrap_err();
        assert_eq!(err, DocumentError::InvalidDocumentRootId { found: "top".to_string() });

        let err = document_from_value(&json!({ "id": "root", "children": {} })).unwrap_err();
        assert!(matches!(err, DocumentError::InvalidDocumentStructure { .. }));
    }

    #[test]
    fn test_rejects_missing_or_empty_id() {
        let err = document_from_value(&doc_with(json!([
            { "parentId": "root", "type": "text", "data": { "text": "x" } }
        ])))
        .unwrap_err();
        assert_eq!(err, DocumentError::InvalidBlockId { parent_id: "root".to_string() });

        let err = document_from_value(&doc_with(json!([text("", "root")]))).unwrap_err();
        assert!(matches!(err, DocumentError::InvalidBlockId { .. }));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let err = document_from_value(&doc_with(json!([
            {
                "id": "a",
                "parentId": "root",
                "type": "bulletList",
                "data": { "text": "a" },
                "children": [text("a", "a")]
            }
        ])))
        .unwrap_err();
        assert_eq!(err, DocumentError::DuplicateOrCircularBlock { block_id: "a".to_string() });

        let err = document_from_value(&doc_with(json!([text("root", "root")]))).unwrap_err();
        assert!(matches!(err, DocumentError::DuplicateOrCircularBlock { .. }));
    }

    #[test]
    fn test_rejects_bad_parent_links() {
        let err = document_from_value(&doc_with(json!([text("a", "nowhere")]))).unwrap_err();
        assert_eq!(
            err,
            DocumentError::ParentBlockNotFound {
                block_id: "a".to_string(),
                parent_id: "nowhere".to_string(),
            }
        );

        let err = document_from_value(&doc_with(json!([
            text("a", "root"),
            {
                "id": "l",
                "parentId": "root",
                "type": "bulletList",
                "data": { "text": "l" },
                "children": [text("b", "a")]
            }
        ])))
        .unwrap_err();
        assert_eq!(
            err,
            DocumentError::InvalidBlockParentId {
                block_id: "b".to_string(),
                expected: "l".to_string(),
                found: Some("a".to_string()),
            }
        );

        let err = document_from_value(&doc_with(json!([
            { "id": "a", "type": "text", "data": { "text": "x" } }
        ])))
        .unwrap_err();
        assert!(matches!(err, DocumentError::InvalidBlockParentId { found: None, .. }));
    }

    #[test]
    fn test_rejects_unknown_type() {
        let err = document_from_value(&doc_with(json!([
            { "id": "a", "parentId": "root", "type": "paragraph", "data": { "text": "x" } }
        ])))
        .unwrap_err();
        assert_eq!(
            err,
            DocumentError::InvalidBlockType {
                block_id: "a".to_string(),
                found: "paragraph".to_string(),
            }
        );

        let err = document_from_value(&doc_with(json!([
            { "id": "a", "parentId": "root", "data": { "text": "x" } }
        ])))
        .unwrap_err();
        assert!(matches!(err, DocumentError::InvalidBlockType { .. }));
    }

    #[test]
    fn test_rejects_invalid_variant_data() {
        let err = document_from_value(&doc_with(json!([
            { "id": "h", "parentId": "root", "type": "heading", "data": { "text": "x", "level": 5 } }
        ])))
        .unwrap_err();
        assert!(matches!(
            err,
            DocumentError::InvalidBlockVariant { block_type: BlockType::Heading, .. }
        ));

        let err = document_from_value(&doc_with(json!([
            { "id": "q", "parentId": "root", "type": "quote" }
        ])))
        .unwrap_err();
        assert!(matches!(err, DocumentError::InvalidBlockVariant { .. }));
    }

    #[test]
    fn test_rejects_children_on_leaf_and_non_array_children() {
        let err = document_from_value(&doc_with(json!([
            {
                "id": "p",
                "parentId": "root",
                "type": "text",
                "data": { "text": "x" },
                "children": []
            }
        ])))
        .unwrap_err();
        assert!(matches!(err, DocumentError::InvalidBlockChildren { .. }));

        let err = document_from_value(&doc_with(json!([
            {
                "id": "t",
                "parentId": "root",
                "type": "toggleList",
                "data": { "text": "x" },
                "children": "nope"
            }
        ])))
        .unwrap_err();
        assert!(matches!(err, DocumentError::InvalidBlockChildren { .. }));
    }

    #[test]
    fn test_no_partial_document_on_deep_failure() {
        let result = document_from_value(&doc_with(json!([
            text("ok", "root"),
            {
                "id": "l",
                "parentId": "root",
                "type": "numberedList",
                "data": { "text": "l" },
                "children": [{ "id": "bad", "parentId": "l", "type": "code", "data": {} }]
            }
        ])));
        assert!(result.is_err());
    }
}
