//! # Event Bus
//!
//! Synchronous observer registry. Handlers run inline during `emit`, in
//! registration order. The handler list is snapshotted before dispatch, so
//! a handler may subscribe or unsubscribe while an event is being delivered;
//! such changes take effect from the next `emit`.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use quire_common::{CodedError, ErrorCode, Namespace};
use quire_document::{Block, ChildrenStrategy, DocumentRoot, MoveStrategy};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::ActionType;

/// Event names as they appear on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventType {
    #[serde(rename = "block:insert")]
    BlockInsert,
    #[serde(rename = "block:delete")]
    BlockDelete,
    #[serde(rename = "block:update")]
    BlockUpdate,
    #[serde(rename = "block:move")]
    BlockMove,
    #[serde(rename = "history:undo")]
    HistoryUndo,
    #[serde(rename = "history:redo")]
    HistoryRedo,
    #[serde(rename = "history:jump")]
    HistoryJump,
    #[serde(rename = "history:set")]
    HistorySet,
    #[serde(rename = "document:swap")]
    DocumentSwap,
    #[serde(rename = "editor:persist")]
    EditorPersist,
    #[serde(rename = "editor:change")]
    EditorChange,
}

impl EventType {
    pub const ALL: [EventType; 11] = [
        EventType::BlockInsert,
        EventType::BlockDelete,
        EventType::BlockUpdate,
        EventType::BlockMove,
        EventType::HistoryUndo,
        EventType::HistoryRedo,
        EventType::HistoryJump,
        EventType::HistorySet,
        EventType::DocumentSwap,
        EventType::EditorPersist,
        EventType::EditorChange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::BlockInsert => "block:insert",
            EventType::BlockDelete => "block:delete",
            EventType::BlockUpdate => "block:update",
            EventType::BlockMove => "block:move",
            EventType::HistoryUndo => "history:undo",
            EventType::HistoryRedo => "history:redo",
            EventType::HistoryJump => "history:jump",
            EventType::HistorySet => "history:set",
            EventType::DocumentSwap => "document:swap",
            EventType::EditorPersist => "editor:persist",
            EventType::EditorChange => "editor:change",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of `editor:persist`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistPayload {
    /// Canonical document JSON after the action
    pub document: String,
    pub history: Vec<String>,
    pub action_type: ActionType,
}

/// Payload of `editor:change`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePayload {
    pub document: String,
    pub history: Vec<String>,
    pub action_type: ActionType,
    pub current_position_in_history: Option<usize>,
    /// Materialized tree at the time of the event
    pub root: DocumentRoot,
}

/// Everything the command layer announces
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum EditorEvent {
    #[serde(rename = "block:insert", rename_all = "camelCase")]
    BlockInsert {
        block_id: String,
        target_id: String,
        strategy: MoveStrategy,
    },

    #[serde(rename = "block:delete", rename_all = "camelCase")]
    BlockDelete { block_id: String },

    #[serde(rename = "block:update", rename_all = "camelCase")]
    BlockUpdate {
        block_id: String,
        new_block: Block,
        children_strategy: ChildrenStrategy,
    },

    #[serde(rename = "block:move", rename_all = "camelCase")]
    BlockMove {
        block_id: String,
        target_id: String,
        strategy: MoveStrategy,
    },

    #[serde(rename = "history:undo")]
    HistoryUndo,

    #[serde(rename = "history:redo")]
    HistoryRedo,

    #[serde(rename = "history:jump")]
    HistoryJump { index: usize },

    #[serde(rename = "history:set", rename_all = "camelCase")]
    HistorySet {
        history: Vec<String>,
        current_position: Option<usize>,
        current_record: Option<String>,
    },

    #[serde(rename = "document:swap", rename_all = "camelCase")]
    DocumentSwap { element: String, history_cleared: bool },

    #[serde(rename = "editor:persist")]
    EditorPersist(PersistPayload),

    #[serde(rename = "editor:change")]
    EditorChange(Box<ChangePayload>),
}

impl EditorEvent {
    pub fn event_type(&self) -> EventType {
        match self {
            EditorEvent::BlockInsert { .. } => EventType::BlockInsert,
            EditorEvent::BlockDelete { .. } => EventType::BlockDelete,
            EditorEvent::BlockUpdate { .. } => EventType::BlockUpdate,
            EditorEvent::BlockMove { .. } => EventType::BlockMove,
            EditorEvent::HistoryUndo => EventType::HistoryUndo,
            EditorEvent::HistoryRedo => EventType::HistoryRedo,
            EditorEvent::HistoryJump { .. } => EventType::HistoryJump,
            EditorEvent::HistorySet { .. } => EventType::HistorySet,
            EditorEvent::DocumentSwap { .. } => EventType::DocumentSwap,
            EditorEvent::EditorPersist(_) => EventType::EditorPersist,
            EditorEvent::EditorChange(_) => EventType::EditorChange,
        }
    }
}

/// Shared handler closure; identity is pointer identity of the `Rc`
pub type Handler = Rc<dyn Fn(&EditorEvent)>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    #[error("Handler is already registered for {event_type}")]
    DuplicateEventHandler { event_type: EventType },
}

impl CodedError for EventError {
    fn code(&self) -> ErrorCode {
        match self {
            EventError::DuplicateEventHandler { .. } => {
                ErrorCode::new(Namespace::Event, "DUPLICATE_EVENT_HANDLER")
            }
        }
    }

    fn context(&self) -> Value {
        match self {
            EventError::DuplicateEventHandler { event_type } => {
                json!({ "eventType": event_type.as_str() })
            }
        }
    }
}

/// Token returned by [`EventBus::on`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    event_type: EventType,
    id: u64,
}

impl Subscription {
    pub fn event_type(&self) -> EventType {
        self.event_type
    }
}

#[derive(Default)]
pub struct EventBus {
    handlers: RefCell<HashMap<EventType, Vec<(u64, Handler)>>>,
    next_id: Cell<u64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `event_type`
    ///
    /// Registering the same `Rc` twice for one event type is an error.
    pub fn on(&self, event_type: EventType, handler: Handler) -> Result<Subscription, EventError> {
        let mut handlers = self.handlers.borrow_mut();
        let list = handlers.entry(event_type).or_default();

        if list.iter().any(|(_, existing)| Rc::ptr_eq(existing, &handler)) {
            return Err(EventError::DuplicateEventHandler { event_type });
        }

        let id = self.next_id.get();
        self.next_id.set(id + 1);
        list.push((id, handler));

        Ok(Subscription { event_type, id })
    }

    /// Remove `handler` from `event_type`; `false` if it was not registered
    pub fn off(&self, event_type: EventType, handler: &Handler) -> bool {
        self.remove_where(event_type, |_, existing| Rc::ptr_eq(existing, handler))
    }

    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.remove_where(subscription.event_type, |id, _| id == subscription.id)
    }

    fn remove_where<F>(&self, event_type: EventType, matches: F) -> bool
    where
        F: Fn(u64, &Handler) -> bool,
    {
        let mut handlers = self.handlers.borrow_mut();
        let Some(list) = handlers.get_mut(&event_type) else {
            return false;
        };

        let before = list.len();
        list.retain(|(id, handler)| !matches(*id, handler));
        before != list.len()
    }

    /// Deliver `event` to every handler registered for its type
    pub fn emit(&self, event: &EditorEvent) {
        let event_type = event.event_type();
        let snapshot: Vec<Handler> = self
            .handlers
            .borrow()
            .get(&event_type)
            .map(|list| list.iter().map(|(_, handler)| Rc::clone(handler)).collect())
            .unwrap_or_default();

        tracing::trace!(%event_type, listeners = snapshot.len(), "emit");
        for handler in snapshot {
            handler(event);
        }
    }

    /// Drop every handler
    pub fn cleanup(&self) {
        self.handlers.borrow_mut().clear();
    }

    pub fn listener_count(&self, event_type: EventType) -> usize {
        self.handlers.borrow().get(&event_type).map_or(0, Vec::len)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers = self.handlers.borrow();
        let counts: HashMap<&str, usize> = handlers
            .iter()
            .map(|(event_type, list)| (event_type.as_str(), list.len()))
            .collect();
        f.debug_struct("EventBus").field("handlers", &counts).finish()
    }
}
