use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use quire_document::Document;
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Document JSON file to check
    pub input: PathBuf,
}

pub fn validate(args: ValidateArgs, _cwd: &str) -> Result<()> {
    let json = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let count = check_document(&json)?;
    println!(
        "{} {} ({} blocks)",
        "✓".green(),
        args.input.display(),
        count
    );
    Ok(())
}

/// Run the validation pipeline plus the integrity check
pub fn check_document(json: &str) -> Result<usize> {
    let doc = Document::from_json(json)?;
    doc.verify_integrity()?;
    Ok(doc.block_count())
}
