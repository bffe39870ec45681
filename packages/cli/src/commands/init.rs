use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use quire_document::Document;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Document file to create
    #[arg(short, long, default_value = "document.json")]
    pub document: String,

    /// Force overwrite existing config and document
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing quire workspace...".bright_blue().bold());

    let config = Config {
        document_path: args.document.clone(),
        ..Config::default()
    };

    let document_path = config.get_document_path(cwd);
    if !document_path.exists() || args.force {
        if let Some(parent) = document_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&document_path, Document::new().to_json()?)?;
        println!("  {} Created {}", "✓".green(), args.document);
    }

    // Write config file
    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Workspace initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Write an actions file (JSON array of actions)");
    println!("  2. Run: quire apply actions.json");
    println!("  3. Inspect: quire tree {}", args.document);

    Ok(())
}
