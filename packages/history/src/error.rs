use quire_common::{CodedError, ErrorCode, Namespace};
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("History requires a non-empty initial record")]
    EmptyInitialHistoryJson,

    #[error("History limit must be at least 1, got {limit}")]
    InvalidHistoryLimit { limit: usize },

    #[error("History index {index} is out of range (size {size})")]
    HistoryIndexOutOfRange { index: usize, size: usize },
}

impl CodedError for HistoryError {
    fn code(&self) -> ErrorCode {
        let name = match self {
            HistoryError::EmptyInitialHistoryJson => "EMPTY_INITIAL_HISTORY_JSON",
            HistoryError::InvalidHistoryLimit { .. } => "INVALID_HISTORY_LIMIT",
            HistoryError::HistoryIndexOutOfRange { .. } => "HISTORY_INDEX_OUT_OF_RANGE",
        };
        ErrorCode::new(Namespace::History, name)
    }

    fn context(&self) -> Value {
        match self {
            HistoryError::EmptyInitialHistoryJson => json!({}),
            HistoryError::InvalidHistoryLimit { limit } => json!({ "limit": limit }),
            HistoryError::HistoryIndexOutOfRange { index, size } => {
                json!({ "index": index, "size": size })
            }
        }
    }
}
