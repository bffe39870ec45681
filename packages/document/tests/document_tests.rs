//! Document tree behavior through the public API

use quire_common::CodedError;
use quire_document::{
    Block, BlockKind, ChildrenStrategy, Document, DocumentError, DocumentRoot, HeadingLevel,
    MoveStrategy, SwapSource, ROOT_ID,
};

fn container(id: &str, children: Vec<Block>) -> Block {
    Block::new(id, BlockKind::toggle_list(id)).with_children(children)
}

fn text(id: &str) -> Block {
    Block::new(id, BlockKind::text(id))
}

#[test]
fn test_preserve_update_reparents_children() {
    let mut doc = Document::new();
    doc.append_child(ROOT_ID, &container("P", vec![text("X")])).unwrap();

    let q = Block::new("Q", BlockKind::bullet_list("Q"));
    doc.update_block("P", &q, ChildrenStrategy::Preserve).unwrap();

    assert!(doc.get_block("P").is_none());
    let x = doc.get_block("X").unwrap();
    assert_eq!(x.parent_id(), "Q");
    let top: Vec<_> = doc.root_children().map(|b| b.id()).collect();
    assert_eq!(top, vec!["Q"]);
}

#[test]
fn test_move_into_descendant_is_rejected() {
    let mut doc = Document::new();
    doc.append_child(ROOT_ID, &container("A", vec![container("B", vec![container("C", vec![])])]))
        .unwrap();
    let before = doc.to_json().unwrap();

    let err = doc.move_block("B", "C", MoveStrategy::Append).unwrap_err();
    assert_eq!(err.code().to_string(), "DOCUMENT:CANNOT_MOVE_BLOCK_TO_DESCENDANT");
    assert_eq!(doc.to_json().unwrap(), before);
}

#[test]
fn test_payload_is_copied_not_aliased() {
    let mut doc = Document::new();
    let mut payload = container("list", vec![text("a")]);
    doc.append_child(ROOT_ID, &payload).unwrap();

    payload.kind = BlockKind::toggle_list("changed");
    if let Some(children) = payload.children.as_mut() {
        children.push(text("b"));
    }

    assert_eq!(doc.get_block("list").unwrap().kind(), &BlockKind::toggle_list("list"));
    assert!(doc.get_block("b").is_none());
}

#[test]
fn test_materialized_blocks_are_detached() {
    let mut doc = Document::new();
    doc.append_child(ROOT_ID, &container("list", vec![text("a")])).unwrap();

    let mut root = doc.to_root();
    root.children[0].id = "renamed".to_string();
    assert!(doc.get_block("list").is_some());

    let mut other = Document::new();
    other.swap(SwapSource::Root(DocumentRoot::new(vec![]))).unwrap();
    assert!(other.is_empty());
}

#[test]
fn test_document_json_is_stable_across_reparse() {
    let json = r#"{
  "id": "root",
  "children": [
    {
      "id": "h",
      "parentId": "root",
      "type": "heading",
      "data": {
        "text": "Plan",
        "level": 1
      }
    },
    {
      "id": "c",
      "parentId": "root",
      "type": "callout",
      "data": {
        "text": "Heads up",
        "icon": "!"
      },
      "children": []
    }
  ]
}"#;
    let doc = Document::from_json(json).unwrap();
    assert_eq!(doc.to_json().unwrap(), json);
    assert_eq!(
        doc.get_block("h").unwrap().kind(),
        &BlockKind::heading("Plan", HeadingLevel::H1)
    );
}

/// Nest `depth` toggle lists, each inside the previous one
fn nested_chain(depth: usize) -> Document {
    let mut doc = Document::new();
    let mut parent = ROOT_ID.to_string();
    for level in 0..depth {
        let id = format!("level-{}", level);
        doc.append_child(&parent, &container(&id, Vec::new())).unwrap();
        parent = id;
    }
    doc
}

#[test]
fn test_deeply_nested_document_round_trips() {
    let doc = nested_chain(300);
    doc.verify_integrity().unwrap();

    let json = doc.to_json().unwrap();
    let back = Document::from_json(&json).unwrap();
    assert_eq!(back, doc);
    assert_eq!(back.to_json().unwrap(), json);

    let rebuilt = Document::from_root(&doc.to_root()).unwrap();
    assert_eq!(rebuilt, doc);
    assert_eq!(back.get_block("level-299").unwrap().parent_id(), "level-298");
}

#[test]
fn test_trailing_text_after_document_is_rejected() {
    let json = format!("{} trailing", Document::new().to_json().unwrap());
    assert!(matches!(
        Document::from_json(&json),
        Err(DocumentError::InvalidDocumentJson { .. })
    ));
}

#[test]
fn test_serde_round_trip_through_document_type() {
    let mut doc = Document::new();
    doc.append_child(ROOT_ID, &container("t", vec![text("a"), text("b")])).unwrap();

    let value = serde_json::to_value(&doc).unwrap();
    let back: Document = serde_json::from_value(value).unwrap();
    assert_eq!(back, doc);

    let bad = serde_json::from_str::<Document>(r#"{"id":"root","children":[{"id":"x"}]}"#);
    assert!(bad.is_err());
}

#[test]
fn test_error_reports_carry_context() {
    let mut doc = Document::new();
    let err = doc.append_child("ghost", &text("a")).unwrap_err();

    assert_eq!(err, DocumentError::InvalidParentBlock { parent_id: "ghost".to_string() });
    let report = err.report();
    assert_eq!(report.code, "DOCUMENT:INVALID_PARENT_BLOCK");
    assert_eq!(report.context["parentId"], "ghost");
}
