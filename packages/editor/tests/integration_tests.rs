//! Integration tests for editor crate

use std::cell::RefCell;
use std::rc::Rc;

use quire_common::CodedError;
use quire_editor::{
    Action, ActionType, Block, BlockKind, ChildrenStrategy, CommandCenter, Document, EditorConfig,
    EditorError, EditorEvent, EventType, MoveStrategy, SwapSource, ROOT_ID,
};

/// Collect every event of the given types
fn capture(center: &CommandCenter, types: &[EventType]) -> Rc<RefCell<Vec<EditorEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    for event_type in types {
        let sink = Rc::clone(&events);
        center
            .events()
            .on(*event_type, Rc::new(move |event: &EditorEvent| sink.borrow_mut().push(event.clone())))
            .unwrap();
    }
    events
}

fn text(id: &str) -> Block {
    Block::new(id, BlockKind::text(id))
}

fn insert(center: &mut CommandCenter, id: &str) {
    center
        .process_action(Action::insert_block(text(id), ROOT_ID, MoveStrategy::Append))
        .unwrap();
}

fn top_level(center: &CommandCenter) -> Vec<String> {
    center
        .document()
        .root_children()
        .map(|block| block.id().to_string())
        .collect()
}

#[test]
fn test_insert_undo_redo_cycle() -> anyhow::Result<()> {
    let mut center = CommandCenter::new(Document::new())?;
    let empty = center.document().to_json()?;

    insert(&mut center, "a");
    insert(&mut center, "b");
    assert_eq!(center.history().size(), 3);
    assert_eq!(top_level(&center), vec!["a", "b"]);

    center.process_action(Action::HistoryUndo)?;
    assert_eq!(top_level(&center), vec!["a"]);

    center.process_action(Action::HistoryUndo)?;
    assert_eq!(center.document().to_json()?, empty);

    center.process_action(Action::HistoryRedo)?;
    center.process_action(Action::HistoryRedo)?;
    assert_eq!(top_level(&center), vec!["a", "b"]);
    assert_eq!(center.history().current_position(), Some(2));
    Ok(())
}

#[test]
fn test_undo_at_start_changes_nothing() -> anyhow::Result<()> {
    let mut center = CommandCenter::new(Document::new())?;
    let events = capture(&center, &[EventType::HistoryUndo, EventType::HistoryRedo]);
    let before = center.history().clone();

    center.process_action(Action::HistoryUndo)?;
    center.process_action(Action::HistoryRedo)?;
    center.process_action(Action::history_jump(0))?;

    assert!(events.borrow().is_empty());
    assert_eq!(center.history(), &before);
    Ok(())
}

#[test]
fn test_new_edit_after_undo_discards_future() -> anyhow::Result<()> {
    let mut center = CommandCenter::new(Document::new())?;
    insert(&mut center, "a");
    insert(&mut center, "b");

    center.process_action(Action::HistoryUndo)?;
    insert(&mut center, "c");

    assert_eq!(center.history().size(), 3);
    assert!(!center.history().can_redo());
    assert_eq!(top_level(&center), vec!["a", "c"]);
    Ok(())
}

#[test]
fn test_history_limit_from_config() -> anyhow::Result<()> {
    let mut center = CommandCenter::with_config(Document::new(), EditorConfig { history_limit: 2 })?;
    insert(&mut center, "a");
    insert(&mut center, "b");

    assert_eq!(center.history().size(), 2);
    assert_eq!(center.history().current_position(), Some(1));

    center.process_action(Action::HistoryUndo)?;
    assert_eq!(top_level(&center), vec!["a"]);
    center.process_action(Action::HistoryUndo)?;
    assert_eq!(top_level(&center), vec!["a"]);
    Ok(())
}

#[test]
fn test_history_jump() -> anyhow::Result<()> {
    let mut center = CommandCenter::new(Document::new())?;
    let events = capture(&center, &[EventType::HistoryJump]);
    insert(&mut center, "a");
    insert(&mut center, "b");

    center.process_action(Action::history_jump(1))?;
    assert_eq!(top_level(&center), vec!["a"]);
    assert_eq!(*events.borrow(), vec![EditorEvent::HistoryJump { index: 1 }]);

    let err = center.process_action(Action::history_jump(9)).unwrap_err();
    assert_eq!(err.code().to_string(), "HISTORY:HISTORY_INDEX_OUT_OF_RANGE");
    assert_eq!(center.history().current_position(), Some(1));
    Ok(())
}

#[test]
fn test_lifecycle_payloads() -> anyhow::Result<()> {
    let mut center = CommandCenter::new(Document::new())?;
    let events = capture(&center, &[EventType::EditorPersist, EventType::EditorChange]);

    insert(&mut center, "a");

    let events = events.borrow();
    assert_eq!(events.len(), 2);

    let EditorEvent::EditorPersist(persist) = &events[0] else {
        panic!("expected editor:persist first");
    };
    assert_eq!(persist.document, center.document().to_json()?);
    assert_eq!(persist.history, center.history().history());
    assert_eq!(persist.action_type, ActionType::InsertBlock);

    let EditorEvent::EditorChange(change) = &events[1] else {
        panic!("expected editor:change second");
    };
    assert_eq!(change.current_position_in_history, Some(1));
    assert_eq!(change.root, center.document().to_root());
    assert_eq!(change.document, persist.document);
    Ok(())
}

#[test]
fn test_block_events_carry_their_payloads() -> anyhow::Result<()> {
    let mut center = CommandCenter::new(Document::new())?;
    let events = capture(
        &center,
        &[
            EventType::BlockInsert,
            EventType::BlockUpdate,
            EventType::BlockMove,
            EventType::BlockDelete,
        ],
    );

    let list = Block::new("list", BlockKind::bullet_list("Todo")).with_children(vec![text("x")]);
    center.process_action(Action::insert_block(list, ROOT_ID, MoveStrategy::Append))?;
    center.process_action(Action::insert_block(text("y"), "list", MoveStrategy::Before))?;

    let renamed = Block::new("list", BlockKind::numbered_list("Todo"));
    center.process_action(Action::update_block("list", renamed.clone(), ChildrenStrategy::Preserve))?;
    center.process_action(Action::move_block("y", "list", MoveStrategy::Append))?;
    center.process_action(Action::delete_block("x"))?;

    let events = events.borrow();
    assert_eq!(
        events[1],
        EditorEvent::BlockInsert {
            block_id: "y".to_string(),
            target_id: "list".to_string(),
            strategy: MoveStrategy::Before,
        }
    );
    assert_eq!(
        events[2],
        EditorEvent::BlockUpdate {
            block_id: "list".to_string(),
            new_block: renamed,
            children_strategy: ChildrenStrategy::Preserve,
        }
    );
    assert_eq!(events[3].event_type(), EventType::BlockMove);
    assert_eq!(
        events[4],
        EditorEvent::BlockDelete {
            block_id: "x".to_string()
        }
    );

    let children: Vec<_> = center
        .document()
        .get_block("list")
        .unwrap()
        .children()
        .map(|block| block.id())
        .collect();
    assert_eq!(children, vec!["y"]);
    Ok(())
}

#[test]
fn test_move_cycle_rejected_without_side_effects() -> anyhow::Result<()> {
    let mut center = CommandCenter::new(Document::new())?;
    let nested = Block::new("A", BlockKind::toggle_list("A")).with_children(vec![Block::new(
        "B",
        BlockKind::toggle_list("B"),
    )
    .with_children(vec![Block::new("C", BlockKind::toggle_list("C"))])]);
    center.process_action(Action::insert_block(nested, ROOT_ID, MoveStrategy::Append))?;

    let events = capture(&center, &[EventType::BlockMove, EventType::EditorPersist]);
    let before = center.document().to_json()?;
    let history = center.history().history();

    let err = center
        .process_action(Action::move_block("B", "C", MoveStrategy::Append))
        .unwrap_err();
    assert_eq!(err.code().to_string(), "DOCUMENT:CANNOT_MOVE_BLOCK_TO_DESCENDANT");
    assert_eq!(center.document().to_json()?, before);
    assert_eq!(center.history().history(), history);
    assert!(events.borrow().is_empty());
    Ok(())
}

#[test]
fn test_delete_missing_block() -> anyhow::Result<()> {
    let mut center = CommandCenter::new(Document::new())?;
    let err = center.process_action(Action::delete_block("ghost")).unwrap_err();

    assert_eq!(
        err,
        EditorError::BlockToDeleteNotFound {
            block_id: "ghost".to_string()
        }
    );
    assert_eq!(err.report().context["blockId"], "ghost");
    Ok(())
}

#[test]
fn test_delete_root_is_rejected_by_tree() -> anyhow::Result<()> {
    let mut center = CommandCenter::new(Document::new())?;
    let err = center.process_action(Action::delete_block(ROOT_ID)).unwrap_err();

    assert_eq!(err, EditorError::Document(quire_document::DocumentError::CannotRemoveRoot));
    assert_eq!(center.history().size(), 1);
    Ok(())
}

#[test]
fn test_history_set_contract() -> anyhow::Result<()> {
    let mut center = CommandCenter::new(Document::new())?;
    insert(&mut center, "a");
    let events = capture(&center, &[EventType::HistorySet]);
    let before = center.history().clone();

    let err = center
        .process_action(Action::history_set(vec!["X".to_string(), "Y".to_string()]))
        .unwrap_err();
    assert!(matches!(err, EditorError::HistoryRecordMismatch { .. }));
    assert_eq!(
        err.to_string(),
        "The last record in the history is not the same as the current document!"
    );
    assert_eq!(center.history(), &before);

    // Earlier records are not checked
    let current = center.document().to_json()?;
    center.process_action(Action::history_set(vec!["anything".to_string(), current.clone()]))?;
    assert_eq!(center.history().current_position(), Some(1));
    assert_eq!(
        events.borrow().last(),
        Some(&EditorEvent::HistorySet {
            history: vec!["anything".to_string(), current.clone()],
            current_position: Some(1),
            current_record: Some(current),
        })
    );

    center.process_action(Action::history_set(Vec::new()))?;
    assert_eq!(center.history().current_position(), None);
    assert_eq!(center.history().current(), None);
    Ok(())
}

#[test]
fn test_undo_and_redo_through_deep_nesting() -> anyhow::Result<()> {
    let mut center = CommandCenter::new(Document::new())?;
    let mut parent = ROOT_ID.to_string();
    for level in 0..80 {
        let id = format!("level-{}", level);
        let block = Block::new(id.clone(), BlockKind::toggle_list(id.clone()));
        center.process_action(Action::insert_block(block, parent, MoveStrategy::Append))?;
        parent = id;
    }
    let deepest = center.document().to_json()?;

    center.process_action(Action::HistoryUndo)?;
    assert!(center.document().get_block("level-79").is_none());
    assert_eq!(center.document().get_block("level-78").unwrap().parent_id(), "level-77");

    center.process_action(Action::HistoryRedo)?;
    assert_eq!(center.document().to_json()?, deepest);

    center.process_action(Action::history_jump(70))?;
    assert!(center.document().contains("level-69"));
    assert!(!center.document().contains("level-70"));
    center.document().verify_integrity()?;
    Ok(())
}

#[test]
fn test_history_set_beyond_limit_is_stored_whole() -> anyhow::Result<()> {
    let mut center = CommandCenter::with_config(Document::new(), EditorConfig { history_limit: 2 })?;
    let events = capture(&center, &[EventType::HistorySet]);
    let current = center.document().to_json()?;
    let records = vec!["1".to_string(), "2".to_string(), current.clone()];

    center.process_action(Action::history_set(records.clone()))?;
    assert_eq!(center.history().history(), records);
    assert_eq!(center.history().current_position(), Some(2));
    assert_eq!(
        events.borrow().last(),
        Some(&EditorEvent::HistorySet {
            history: records,
            current_position: Some(2),
            current_record: Some(current),
        })
    );

    insert(&mut center, "a");
    assert_eq!(center.history().size(), 2);
    Ok(())
}

#[test]
fn test_undo_into_invalid_record_keeps_log_in_step() -> anyhow::Result<()> {
    let mut center = CommandCenter::new(Document::new())?;
    insert(&mut center, "a");
    let current = center.document().to_json()?;
    center.process_action(Action::history_set(vec!["not a document".to_string(), current.clone()]))?;

    let err = center.process_action(Action::HistoryUndo).unwrap_err();
    assert!(matches!(err, EditorError::Document(_)));
    assert_eq!(center.history().current_position(), Some(1));
    assert_eq!(center.document().to_json()?, current);
    Ok(())
}

#[test]
fn test_swap_document() -> anyhow::Result<()> {
    let mut center = CommandCenter::new(Document::new())?;
    insert(&mut center, "a");
    let events = capture(&center, &[EventType::DocumentSwap]);

    let mut other = Document::new();
    other.append_child(ROOT_ID, &text("z"))?;
    let json = other.to_json()?;

    center.process_action(Action::swap_document(SwapSource::Json(json.clone()), false))?;
    assert_eq!(top_level(&center), vec!["z"]);
    assert_eq!(center.history().size(), 3);
    assert_eq!(
        *events.borrow(),
        vec![EditorEvent::DocumentSwap {
            element: json.clone(),
            history_cleared: false,
        }]
    );

    center.process_action(Action::swap_document(SwapSource::Root(other.to_root()), true))?;
    assert_eq!(center.history().history(), vec![json]);
    assert_eq!(center.history().current_position(), Some(0));

    let err = center
        .process_action(Action::swap_document(SwapSource::Json("[]".to_string()), true))
        .unwrap_err();
    assert_eq!(err.code().to_string(), "DOCUMENT:INVALID_DOCUMENT_STRUCTURE");
    assert_eq!(center.history().size(), 1);
    Ok(())
}

#[test]
fn test_actions_from_json_script() -> anyhow::Result<()> {
    let script = r#"[
        { "type": "insertBlock", "payload": { "targetId": "root", "block": { "id": "h", "type": "heading", "data": { "text": "Plan", "level": 1 } } } },
        { "type": "insertBlock", "payload": { "targetId": "h", "strategy": "after", "block": { "id": "t", "type": "todoList", "data": { "text": "Ship", "checked": false } } } },
        { "type": "insertBlock", "payload": { "targetId": "t", "block": { "id": "s", "type": "text", "data": { "text": "step" } } } },
        { "type": "historyUndo" },
        { "type": "historyRedo" }
    ]"#;
    let actions: Vec<Action> = serde_json::from_str(script)?;

    let mut center = CommandCenter::new(Document::new())?;
    for action in actions {
        center.process_action(action)?;
    }

    assert_eq!(top_level(&center), vec!["h", "t"]);
    assert_eq!(center.document().get_block("s").unwrap().parent_id(), "t");
    center.document().verify_integrity()?;
    Ok(())
}
