//! # Quire Editor
//!
//! Command layer of the block editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ dispatch layer: builds Action values        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ CommandCenter                               │
//! │  - resolve Action -> Command                │
//! │  - Command mutates Document + HistoryLog    │
//! │  - emit domain + lifecycle events           │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ EventBus subscribers: persistence, UI       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quire_editor::{Action, CommandCenter, EventType};
//!
//! let mut center = CommandCenter::new(Document::new())?;
//! center.events().on(EventType::EditorPersist, Rc::new(|event| save(event)))?;
//! center.process_action(Action::insert_block(block, "root", MoveStrategy::Append))?;
//! ```

mod action;
mod command;
mod command_center;
pub mod commands;
mod config;
mod errors;
mod events;

pub use action::{
    Action, ActionType, DeleteBlockPayload, HistoryJumpPayload, HistorySetPayload, InsertBlockPayload,
    MoveBlockPayload, SwapDocumentPayload, UpdateBlockPayload,
};
pub use command::{Command, CommandContext};
pub use command_center::CommandCenter;
pub use config::EditorConfig;
pub use errors::EditorError;
pub use events::{
    ChangePayload, EditorEvent, EventBus, EventError, EventType, Handler, PersistPayload, Subscription,
};

// Re-export common types for convenience
pub use quire_document::{Block, BlockKind, ChildrenStrategy, Document, MoveStrategy, SwapSource, ROOT_ID};
pub use quire_history::HistoryLog;
