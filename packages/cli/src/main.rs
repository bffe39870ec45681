mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{apply, init, tree, validate, ApplyArgs, InitArgs, TreeArgs, ValidateArgs};
use quire_common::{CodedError, ErrorReport};
use quire_document::DocumentError;
use quire_editor::EditorError;
use tracing::Level;

/// Quire CLI - block document tooling
#[derive(Parser, Debug)]
#[command(name = "quire")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a config file and an empty document
    Init(InitArgs),

    /// Check that a document file is valid
    Validate(ValidateArgs),

    /// Replay a JSON array of actions against a document
    Apply(ApplyArgs),

    /// Print the block tree of a document
    Tree(TreeArgs),
}

/// Coded report for failures raised by the document or editor crates
fn coded_report(err: &anyhow::Error) -> Option<ErrorReport> {
    if let Some(err) = err.downcast_ref::<EditorError>() {
        return Some(err.report());
    }
    err.downcast_ref::<DocumentError>().map(|err| err.report())
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| {
            let cwd = cwd.display().to_string();
            match cli.command {
                Command::Init(args) => init(args, &cwd),
                Command::Validate(args) => validate(args, &cwd),
                Command::Apply(args) => apply(args, &cwd),
                Command::Tree(args) => tree(args, &cwd),
            }
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        if let Some(report) = coded_report(&err) {
            eprintln!("  {} {}", "code:".dimmed(), report.code);
            eprintln!("  {} {}", "context:".dimmed(), report.context);
        }
        eprintln!();
        std::process::exit(1);
    }
}
