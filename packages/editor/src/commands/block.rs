use crate::action::{DeleteBlockPayload, InsertBlockPayload, MoveBlockPayload, UpdateBlockPayload};
use crate::{Command, CommandContext, EditorError, EditorEvent};
use quire_document::ROOT_ID;

pub struct InsertBlockCommand {
    payload: InsertBlockPayload,
}

impl InsertBlockCommand {
    pub fn new(payload: InsertBlockPayload) -> Self {
        Self { payload }
    }
}

impl Command for InsertBlockCommand {
    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> Result<(), EditorError> {
        let InsertBlockPayload {
            block,
            target_id,
            strategy,
        } = &self.payload;

        ctx.document.insert(target_id, block, *strategy)?;
        ctx.record()?;
        ctx.emit(EditorEvent::BlockInsert {
            block_id: block.id.clone(),
            target_id: target_id.clone(),
            strategy: *strategy,
        });
        Ok(())
    }

    fn name(&self) -> &'static str {
        "InsertBlock"
    }
}

pub struct DeleteBlockCommand {
    payload: DeleteBlockPayload,
}

impl DeleteBlockCommand {
    pub fn new(payload: DeleteBlockPayload) -> Self {
        Self { payload }
    }
}

impl Command for DeleteBlockCommand {
    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> Result<(), EditorError> {
        let block_id = &self.payload.block_id;
        // the root is left to the tree, which rejects it with CannotRemoveRoot
        if block_id != ROOT_ID && !ctx.document.contains(block_id) {
            return Err(EditorError::BlockToDeleteNotFound {
                block_id: block_id.clone(),
            });
        }

        ctx.document.remove(block_id)?;
        ctx.record()?;
        ctx.emit(EditorEvent::BlockDelete {
            block_id: block_id.clone(),
        });
        Ok(())
    }

    fn name(&self) -> &'static str {
        "DeleteBlock"
    }
}

pub struct UpdateBlockCommand {
    payload: UpdateBlockPayload,
}

impl UpdateBlockCommand {
    pub fn new(payload: UpdateBlockPayload) -> Self {
        Self { payload }
    }
}

impl Command for UpdateBlockCommand {
    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> Result<(), EditorError> {
        let UpdateBlockPayload {
            block_id,
            block,
            children_strategy,
        } = &self.payload;

        ctx.document.update_block(block_id, block, *children_strategy)?;
        ctx.record()?;
        ctx.emit(EditorEvent::BlockUpdate {
            block_id: block_id.clone(),
            new_block: block.clone(),
            children_strategy: *children_strategy,
        });
        Ok(())
    }

    fn name(&self) -> &'static str {
        "UpdateBlock"
    }
}

pub struct MoveBlockCommand {
    payload: MoveBlockPayload,
}

impl MoveBlockCommand {
    pub fn new(payload: MoveBlockPayload) -> Self {
        Self { payload }
    }
}

impl Command for MoveBlockCommand {
    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> Result<(), EditorError> {
        let MoveBlockPayload {
            block_id,
            target_id,
            strategy,
        } = &self.payload;

        ctx.document.move_block(block_id, target_id, *strategy)?;
        ctx.record()?;
        ctx.emit(EditorEvent::BlockMove {
            block_id: block_id.clone(),
            target_id: target_id.clone(),
            strategy: *strategy,
        });
        Ok(())
    }

    fn name(&self) -> &'static str {
        "MoveBlock"
    }
}
