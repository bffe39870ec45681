//! One [`Command`] per action type

mod block;
mod history;
mod swap;

pub use block::{DeleteBlockCommand, InsertBlockCommand, MoveBlockCommand, UpdateBlockCommand};
pub use history::{HistoryJumpCommand, HistoryRedoCommand, HistorySetCommand, HistoryUndoCommand};
pub use swap::SwapDocumentCommand;

use crate::{Action, Command};

/// Build the command that executes `action`
pub fn resolve(action: Action) -> Box<dyn Command> {
    match action {
        Action::InsertBlock(payload) => Box::new(InsertBlockCommand::new(payload)),
        Action::DeleteBlock(payload) => Box::new(DeleteBlockCommand::new(payload)),
        Action::UpdateBlock(payload) => Box::new(UpdateBlockCommand::new(payload)),
        Action::MoveBlock(payload) => Box::new(MoveBlockCommand::new(payload)),
        Action::HistoryUndo => Box::new(HistoryUndoCommand),
        Action::HistoryRedo => Box::new(HistoryRedoCommand),
        Action::HistoryJump(payload) => Box::new(HistoryJumpCommand::new(payload)),
        Action::HistorySet(payload) => Box::new(HistorySetCommand::new(payload)),
        Action::SwapDocument(payload) => Box::new(SwapDocumentCommand::new(payload)),
    }
}
