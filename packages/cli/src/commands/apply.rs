use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use quire_editor::{Action, CommandCenter, EditorEvent, EventType};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// JSON file holding an array of actions
    pub actions: PathBuf,

    /// Document to edit (defaults to documentPath from the config)
    #[arg(short, long)]
    pub document: Option<PathBuf>,

    /// Where to write the result (defaults to the input document)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Where to write the history log (defaults to historyPath from the config)
    #[arg(long)]
    pub history_out: Option<PathBuf>,

    /// Print every emitted event as a JSON line
    #[arg(long)]
    pub events: bool,
}

/// Outcome of replaying an action script
#[derive(Debug)]
pub struct ApplyOutcome {
    pub applied: usize,
    /// Snapshot carried by the last `editor:persist` event
    pub document: Option<String>,
    pub history: Vec<String>,
}

pub fn apply(args: ApplyArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;

    let document_path = args
        .document
        .clone()
        .unwrap_or_else(|| config.get_document_path(cwd));
    let history_path = args.history_out.clone().or_else(|| config.get_history_path(cwd));

    let document = fs::read_to_string(&document_path)
        .with_context(|| format!("Failed to read {}", document_path.display()))?;
    let script = fs::read_to_string(&args.actions)
        .with_context(|| format!("Failed to read {}", args.actions.display()))?;
    let actions: Vec<Action> = serde_json::from_str(&script)
        .with_context(|| format!("Invalid actions in {}", args.actions.display()))?;

    let previous_history = match &history_path {
        Some(path) if path.exists() => Some(read_history(path)?),
        _ => None,
    };

    println!(
        "⚙️  {} {} actions to {}",
        "Applying".green().bold(),
        actions.len(),
        document_path.display()
    );

    let outcome = run_actions(&config, &document, previous_history, actions, args.events)?;

    let out_path = args.out.unwrap_or(document_path);
    match &outcome.document {
        Some(snapshot) => {
            fs::write(&out_path, snapshot)?;
            println!("  {} Wrote {}", "✓".green(), out_path.display());
        }
        None => println!("  {} Nothing to write", "-".dimmed()),
    }

    if let Some(path) = history_path {
        fs::write(&path, serde_json::to_string_pretty(&outcome.history)?)?;
        println!(
            "  {} Wrote {} history records to {}",
            "✓".green(),
            outcome.history.len(),
            path.display()
        );
    }

    println!();
    println!("✨ {} {} actions applied", "Done".green().bold(), outcome.applied);
    Ok(())
}

/// Replay `actions` through a fresh command center
///
/// A stored history is restored first; it must end with the current
/// document or the run is rejected.
pub fn run_actions(
    config: &Config,
    document: &str,
    previous_history: Option<Vec<String>>,
    actions: Vec<Action>,
    print_events: bool,
) -> Result<ApplyOutcome> {
    let mut center = CommandCenter::from_json(document, config.editor.clone())?;

    if let Some(records) = previous_history {
        tracing::debug!(records = records.len(), "restoring history");
        center
            .process_action(Action::history_set(records))
            .context("Stored history does not match the document")?;
    }

    let persisted: Rc<RefCell<Option<String>>> = Rc::new(RefCell::new(None));
    {
        let persisted = Rc::clone(&persisted);
        center.events().on(
            EventType::EditorPersist,
            Rc::new(move |event: &EditorEvent| {
                if let EditorEvent::EditorPersist(payload) = event {
                    *persisted.borrow_mut() = Some(payload.document.clone());
                }
            }),
        )?;
    }

    if print_events {
        let printer: quire_editor::Handler = Rc::new(|event: &EditorEvent| {
            match serde_json::to_string(event) {
                Ok(line) => println!("{}", line),
                Err(err) => tracing::warn!(%err, "failed to serialize event"),
            }
        });
        for event_type in EventType::ALL {
            center.events().on(event_type, Rc::clone(&printer))?;
        }
    }

    let mut applied = 0;
    for (index, action) in actions.into_iter().enumerate() {
        let action_type = action.action_type();
        center
            .process_action(action)
            .with_context(|| format!("Action #{} ({}) failed", index, action_type))?;
        applied += 1;
    }

    let document = persisted.borrow_mut().take();
    Ok(ApplyOutcome {
        applied,
        document,
        history: center.history().history(),
    })
}

fn read_history(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid history file {}", path.display()))
}
