//! # Command Center
//!
//! Owns the document, the history log and the event bus for one editor
//! session. `process_action` is the only path that mutates the document
//! and the log together:
//!
//! ```text
//! Action -> resolve -> Command::execute (tree + history + domain event)
//!                   -> editor:persist -> editor:change
//! ```
//!
//! A failing command returns its error before any lifecycle event fires.

use quire_document::Document;
use quire_history::HistoryLog;

use crate::commands::resolve;
use crate::events::{ChangePayload, PersistPayload};
use crate::{Action, CommandContext, EditorConfig, EditorError, EditorEvent, EventBus};

#[derive(Debug)]
pub struct CommandCenter {
    document: Document,
    history: HistoryLog,
    events: EventBus,
    config: EditorConfig,
}

impl CommandCenter {
    /// Start a session on `document` with the default configuration
    pub fn new(document: Document) -> Result<Self, EditorError> {
        Self::with_config(document, EditorConfig::default())
    }

    /// Start a session; the history log is seeded with the initial snapshot
    pub fn with_config(document: Document, config: EditorConfig) -> Result<Self, EditorError> {
        let history = HistoryLog::new(document.to_json()?, config.history_limit)?;

        Ok(Self {
            document,
            history,
            events: EventBus::new(),
            config,
        })
    }

    /// Parse `json` and start a session on it
    pub fn from_json(json: &str, config: EditorConfig) -> Result<Self, EditorError> {
        Self::with_config(Document::from_json(json)?, config)
    }

    /// Run one action to completion
    pub fn process_action(&mut self, action: Action) -> Result<(), EditorError> {
        let action_type = action.action_type();
        let mut command = resolve(action);
        tracing::debug!(command = command.name(), "processing action");

        {
            let mut ctx = CommandContext {
                document: &mut self.document,
                history: &mut self.history,
                events: &self.events,
            };
            command.execute(&mut ctx)?;
        }

        let document = self.document.to_json()?;
        let history = self.history.history();

        self.events.emit(&EditorEvent::EditorPersist(PersistPayload {
            document: document.clone(),
            history: history.clone(),
            action_type,
        }));
        self.events.emit(&EditorEvent::EditorChange(Box::new(ChangePayload {
            document,
            history,
            action_type,
            current_position_in_history: self.history.current_position(),
            root: self.document.to_root(),
        })));

        tracing::trace!(
            blocks = self.document.block_count(),
            history = self.history.size(),
            "action applied"
        );
        Ok(())
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Bus for subscribing to editor events
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }
}
