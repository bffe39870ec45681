use quire_document::{Document, SwapSource};

use crate::action::{HistoryJumpPayload, HistorySetPayload};
use crate::{Command, CommandContext, EditorError, EditorEvent};

/// Load `record` into the document after the history cursor has moved
///
/// A record that fails validation puts the cursor back at `previous`, so
/// the log and the document stay in step.
fn restore(ctx: &mut CommandContext<'_>, previous: Option<usize>, record: &str) -> Result<(), EditorError> {
    match Document::from_json(record) {
        Ok(next) => {
            ctx.document.swap(SwapSource::Document(Box::new(next)))?;
            Ok(())
        }
        Err(err) => {
            if let Some(position) = previous {
                ctx.history.jump_to(position)?;
            }
            Err(err.into())
        }
    }
}

pub struct HistoryUndoCommand;

impl Command for HistoryUndoCommand {
    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> Result<(), EditorError> {
        let previous = ctx.history.current_position();
        let Some(record) = ctx.history.undo() else {
            tracing::debug!("nothing to undo");
            return Ok(());
        };

        restore(ctx, previous, &record)?;
        ctx.emit(EditorEvent::HistoryUndo);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "HistoryUndo"
    }
}

pub struct HistoryRedoCommand;

impl Command for HistoryRedoCommand {
    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> Result<(), EditorError> {
        let previous = ctx.history.current_position();
        let Some(record) = ctx.history.redo() else {
            tracing::debug!("nothing to redo");
            return Ok(());
        };

        restore(ctx, previous, &record)?;
        ctx.emit(EditorEvent::HistoryRedo);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "HistoryRedo"
    }
}

pub struct HistoryJumpCommand {
    payload: HistoryJumpPayload,
}

impl HistoryJumpCommand {
    pub fn new(payload: HistoryJumpPayload) -> Self {
        Self { payload }
    }
}

impl Command for HistoryJumpCommand {
    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> Result<(), EditorError> {
        let index = self.payload.index;
        let previous = ctx.history.current_position();
        let Some(record) = ctx.history.jump_to(index)? else {
            return Ok(());
        };

        restore(ctx, previous, &record)?;
        ctx.emit(EditorEvent::HistoryJump { index });
        Ok(())
    }

    fn name(&self) -> &'static str {
        "HistoryJump"
    }
}

pub struct HistorySetCommand {
    payload: HistorySetPayload,
}

impl HistorySetCommand {
    pub fn new(payload: HistorySetPayload) -> Self {
        Self { payload }
    }
}

impl Command for HistorySetCommand {
    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> Result<(), EditorError> {
        let records = &self.payload.history;

        // Only the newest record is compared; older ones are taken as given.
        if let Some(last) = records.last() {
            if *last != ctx.document.to_json()? {
                return Err(EditorError::HistoryRecordMismatch {
                    history_size: records.len(),
                });
            }
        }

        ctx.history.set_history(records.clone());
        ctx.emit(EditorEvent::HistorySet {
            history: ctx.history.history(),
            current_position: ctx.history.current_position(),
            current_record: ctx.history.current(),
        });
        Ok(())
    }

    fn name(&self) -> &'static str {
        "HistorySet"
    }
}
