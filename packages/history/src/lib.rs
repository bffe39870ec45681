//! # Quire History
//!
//! Undo/redo for the editor, kept as a log of serialized document
//! snapshots with a movable cursor. Undoing moves the cursor back; a new
//! record added after an undo discards the abandoned future.

mod error;
mod log;

pub use error::HistoryError;
pub use log::{HistoryLog, DEFAULT_HISTORY_LIMIT};
