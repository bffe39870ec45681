//! # Actions
//!
//! Inert `{ type, payload }` values handed to the command center. The JSON
//! shape is the wire format used by dispatch layers and by `quire apply`:
//!
//! ```json
//! { "type": "moveBlock", "payload": { "blockId": "a", "targetId": "b", "strategy": "after" } }
//! { "type": "historyUndo" }
//! ```

use std::fmt;

use quire_document::{Block, ChildrenStrategy, MoveStrategy, SwapSource};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertBlockPayload {
    pub block: Block,
    pub target_id: String,
    #[serde(default)]
    pub strategy: MoveStrategy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteBlockPayload {
    pub block_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBlockPayload {
    pub block_id: String,
    pub block: Block,
    #[serde(default)]
    pub children_strategy: ChildrenStrategy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveBlockPayload {
    pub block_id: String,
    pub target_id: String,
    #[serde(default)]
    pub strategy: MoveStrategy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryJumpPayload {
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySetPayload {
    pub history: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapDocumentPayload {
    /// Document JSON text or a root object
    pub element: SwapSource,
    #[serde(default)]
    pub clear_history: bool,
}

/// Request to change the editor state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Action {
    InsertBlock(InsertBlockPayload),
    DeleteBlock(DeleteBlockPayload),
    UpdateBlock(UpdateBlockPayload),
    MoveBlock(MoveBlockPayload),
    HistoryUndo,
    HistoryRedo,
    HistoryJump(HistoryJumpPayload),
    HistorySet(HistorySetPayload),
    SwapDocument(SwapDocumentPayload),
}

impl Action {
    pub fn insert_block(block: Block, target_id: impl Into<String>, strategy: MoveStrategy) -> Self {
        Action::InsertBlock(InsertBlockPayload {
            block,
            target_id: target_id.into(),
            strategy,
        })
    }

    pub fn delete_block(block_id: impl Into<String>) -> Self {
        Action::DeleteBlock(DeleteBlockPayload {
            block_id: block_id.into(),
        })
    }

    pub fn update_block(block_id: impl Into<String>, block: Block, children_strategy: ChildrenStrategy) -> Self {
        Action::UpdateBlock(UpdateBlockPayload {
            block_id: block_id.into(),
            block,
            children_strategy,
        })
    }

    pub fn move_block(
        block_id: impl Into<String>,
        target_id: impl Into<String>,
        strategy: MoveStrategy,
    ) -> Self {
        Action::MoveBlock(MoveBlockPayload {
            block_id: block_id.into(),
            target_id: target_id.into(),
            strategy,
        })
    }

    pub fn history_jump(index: usize) -> Self {
        Action::HistoryJump(HistoryJumpPayload { index })
    }

    pub fn history_set(history: Vec<String>) -> Self {
        Action::HistorySet(HistorySetPayload { history })
    }

    pub fn swap_document(element: SwapSource, clear_history: bool) -> Self {
        Action::SwapDocument(SwapDocumentPayload {
            element,
            clear_history,
        })
    }

    pub fn action_type(&self) -> ActionType {
        match self {
            Action::InsertBlock(_) => ActionType::InsertBlock,
            Action::DeleteBlock(_) => ActionType::DeleteBlock,
            Action::UpdateBlock(_) => ActionType::UpdateBlock,
            Action::MoveBlock(_) => ActionType::MoveBlock,
            Action::HistoryUndo => ActionType::HistoryUndo,
            Action::HistoryRedo => ActionType::HistoryRedo,
            Action::HistoryJump(_) => ActionType::HistoryJump,
            Action::HistorySet(_) => ActionType::HistorySet,
            Action::SwapDocument(_) => ActionType::SwapDocument,
        }
    }
}

/// Discriminant of [`Action`], carried by lifecycle events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionType {
    InsertBlock,
    DeleteBlock,
    UpdateBlock,
    MoveBlock,
    HistoryUndo,
    HistoryRedo,
    HistoryJump,
    HistorySet,
    SwapDocument,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::InsertBlock => "insertBlock",
            ActionType::DeleteBlock => "deleteBlock",
            ActionType::UpdateBlock => "updateBlock",
            ActionType::MoveBlock => "moveBlock",
            ActionType::HistoryUndo => "historyUndo",
            ActionType::HistoryRedo => "historyRedo",
            ActionType::HistoryJump => "historyJump",
            ActionType::HistorySet => "historySet",
            ActionType::SwapDocument => "swapDocument",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
