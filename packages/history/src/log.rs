//! # History Log
//!
//! ```text
//! records:  [A, B, C]        position: Some(1)  -> current = B
//! add(D)    [A, B, D]        position: Some(2)  (C discarded)
//! ```
//!
//! The log holds at most `limit` records. When an `add` overflows it, the
//! oldest record is dropped and the cursor shifts down with the content.

use crate::HistoryError;

/// Capacity used when no limit is configured
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Bounded sequence of document snapshots with a cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryLog {
    records: Vec<String>,
    /// `None` only when the log is empty
    position: Option<usize>,
    limit: usize,
}

impl HistoryLog {
    /// Create a log holding `initial` as its only record
    pub fn new(initial: impl Into<String>, limit: usize) -> Result<Self, HistoryError> {
        let initial = initial.into();
        if initial.is_empty() {
            return Err(HistoryError::EmptyInitialHistoryJson);
        }
        if limit == 0 {
            return Err(HistoryError::InvalidHistoryLimit { limit });
        }

        Ok(Self {
            records: vec![initial],
            position: Some(0),
            limit,
        })
    }

    /// Create a log with [`DEFAULT_HISTORY_LIMIT`]
    pub fn with_default_limit(initial: impl Into<String>) -> Result<Self, HistoryError> {
        Self::new(initial, DEFAULT_HISTORY_LIMIT)
    }

    /// Append a record after the cursor, discarding any redo branch
    pub fn add(&mut self, record: impl Into<String>) {
        let keep = self.position.map_or(0, |position| position + 1);
        if keep < self.records.len() {
            tracing::trace!(discarded = self.records.len() - keep, "truncating redo branch");
            self.records.truncate(keep);
        }

        self.records.push(record.into());

        // a log restored through set_history may start above the limit
        let overflow = self.records.len().saturating_sub(self.limit);
        if overflow > 0 {
            self.records.drain(..overflow);
            tracing::trace!(limit = self.limit, dropped = overflow, "dropped oldest history records");
        }
        self.position = Some(self.records.len() - 1);
    }

    /// Step back one record. `None` when already at the start.
    pub fn undo(&mut self) -> Option<String> {
        match self.position {
            Some(position) if position > 0 => {
                self.position = Some(position - 1);
                self.current()
            }
            _ => None,
        }
    }

    /// Step forward one record. `None` when already at the end.
    pub fn redo(&mut self) -> Option<String> {
        match self.position {
            Some(position) if position + 1 < self.records.len() => {
                self.position = Some(position + 1);
                self.current()
            }
            _ => None,
        }
    }

    /// Move the cursor to `index`
    ///
    /// Returns `Ok(None)` when the cursor is already there.
    pub fn jump_to(&mut self, index: usize) -> Result<Option<String>, HistoryError> {
        if index >= self.records.len() {
            return Err(HistoryError::HistoryIndexOutOfRange {
                index,
                size: self.records.len(),
            });
        }
        if self.position == Some(index) {
            return Ok(None);
        }

        self.position = Some(index);
        Ok(self.current())
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.position = None;
    }

    /// Replace every record as given; the cursor moves to the last one
    pub fn set_history(&mut self, records: Vec<String>) {
        self.records = records;
        self.position = self.records.len().checked_sub(1);
    }

    /// Record under the cursor
    pub fn current(&self) -> Option<String> {
        self.position.and_then(|position| self.records.get(position).cloned())
    }

    /// Copy of every record, oldest first
    pub fn history(&self) -> Vec<String> {
        self.records.clone()
    }

    pub fn current_position(&self) -> Option<usize> {
        self.position
    }

    pub fn size(&self) -> usize {
        self.records.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.position, Some(position) if position > 0)
    }

    pub fn can_redo(&self) -> bool {
        matches!(self.position, Some(position) if position + 1 < self.records.len())
    }
}
