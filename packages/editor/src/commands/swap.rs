use crate::action::SwapDocumentPayload;
use crate::{Command, CommandContext, EditorError, EditorEvent};

pub struct SwapDocumentCommand {
    payload: SwapDocumentPayload,
}

impl SwapDocumentCommand {
    pub fn new(payload: SwapDocumentPayload) -> Self {
        Self { payload }
    }
}

impl Command for SwapDocumentCommand {
    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> Result<(), EditorError> {
        let SwapDocumentPayload {
            element,
            clear_history,
        } = &self.payload;

        ctx.document.swap(element.clone())?;
        if *clear_history {
            ctx.history.clear();
        }
        ctx.record()?;

        ctx.emit(EditorEvent::DocumentSwap {
            element: ctx.document.to_json()?,
            history_cleared: *clear_history,
        });
        Ok(())
    }

    fn name(&self) -> &'static str {
        "SwapDocument"
    }
}
