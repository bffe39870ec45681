//! Error types for the command layer

use quire_common::{CodedError, ErrorCode, Namespace};
use quire_document::DocumentError;
use quire_history::HistoryError;
use serde_json::{json, Value};
use thiserror::Error;

use crate::EventError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Event(#[from] EventError),

    #[error("Block to delete {block_id} not found")]
    BlockToDeleteNotFound { block_id: String },

    #[error("The last record in the history is not the same as the current document!")]
    HistoryRecordMismatch { history_size: usize },
}

impl CodedError for EditorError {
    fn code(&self) -> ErrorCode {
        match self {
            EditorError::Document(e) => e.code(),
            EditorError::History(e) => e.code(),
            EditorError::Event(e) => e.code(),
            EditorError::BlockToDeleteNotFound { .. } => {
                ErrorCode::new(Namespace::Command, "BLOCK_TO_DELETE_NOT_FOUND")
            }
            EditorError::HistoryRecordMismatch { .. } => {
                ErrorCode::new(Namespace::Command, "HISTORY_RECORD_MISMATCH")
            }
        }
    }

    fn context(&self) -> Value {
        match self {
            EditorError::Document(e) => e.context(),
            EditorError::History(e) => e.context(),
            EditorError::Event(e) => e.context(),
            EditorError::BlockToDeleteNotFound { block_id } => json!({ "blockId": block_id }),
            EditorError::HistoryRecordMismatch { history_size } => {
                json!({ "historySize": history_size })
            }
        }
    }
}
