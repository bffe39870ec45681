use quire_document::Document;
use quire_history::HistoryLog;

use crate::{EditorError, EditorEvent, EventBus};

/// State a command is allowed to touch while it runs
pub struct CommandContext<'a> {
    pub document: &'a mut Document,
    pub history: &'a mut HistoryLog,
    pub events: &'a EventBus,
}

impl CommandContext<'_> {
    /// Push the current document snapshot onto the history log
    pub fn record(&mut self) -> Result<(), EditorError> {
        let snapshot = self.document.to_json()?;
        self.history.add(snapshot);
        Ok(())
    }

    pub fn emit(&self, event: EditorEvent) {
        self.events.emit(&event);
    }
}

/// Executor for one action type
///
/// Each command validates through the tree and history APIs before
/// mutating, so an `Err` leaves both untouched and emits nothing.
pub trait Command {
    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> Result<(), EditorError>;

    /// Get a debug name for this command
    fn name(&self) -> &'static str;
}
