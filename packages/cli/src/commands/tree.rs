use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use quire_document::{BlockKind, BlockRef, Document, ROOT_ID};
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Document JSON file to print
    pub input: PathBuf,

    /// List blocks breadth-first instead of as an outline
    #[arg(short, long)]
    pub level_order: bool,
}

pub fn tree(args: TreeArgs, _cwd: &str) -> Result<()> {
    let json = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let doc = Document::from_json(&json)?;

    let lines = if args.level_order {
        level_order_lines(&doc)
    } else {
        outline_lines(&doc)
    };

    println!("{}", ROOT_ID.bright_white().bold());
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}

/// Indented outline, depth-first in document order
pub fn outline_lines(doc: &Document) -> Vec<String> {
    fn walk(block: BlockRef<'_>, depth: usize, lines: &mut Vec<String>) {
        lines.push(format!(
            "{}- {} [{}] {}",
            "  ".repeat(depth),
            block.id(),
            block.block_type(),
            summary(block.kind())
        ));
        for child in block.children() {
            walk(child, depth + 1, lines);
        }
    }

    let mut lines = Vec::new();
    for block in doc.root_children() {
        walk(block, 0, &mut lines);
    }
    lines
}

/// One line per block in level order, with its parent
pub fn level_order_lines(doc: &Document) -> Vec<String> {
    let mut lines = Vec::new();
    doc.traverse(|block| {
        lines.push(format!(
            "{} [{}] <- {}",
            block.id(),
            block.block_type(),
            block.parent_id()
        ));
    });
    lines
}

fn summary(kind: &BlockKind) -> String {
    match kind {
        BlockKind::Text(data)
        | BlockKind::Quote(data)
        | BlockKind::BulletList(data)
        | BlockKind::NumberedList(data) => data.text.clone(),
        BlockKind::Heading(data) => format!("h{} {}", u8::from(data.level), data.text),
        BlockKind::Code(data) => match &data.language {
            Some(language) => format!("({}) {}", language, first_line(&data.code)),
            None => first_line(&data.code).to_string(),
        },
        BlockKind::Divider(_) => "---".to_string(),
        BlockKind::ToggleList(data) => data.text.clone(),
        BlockKind::Callout(data) => match &data.icon {
            Some(icon) => format!("{} {}", icon, data.text),
            None => data.text.clone(),
        },
        BlockKind::TodoList(data) => {
            format!("[{}] {}", if data.checked { "x" } else { " " }, data.text)
        }
    }
}

fn first_line(code: &str) -> &str {
    code.lines().next().unwrap_or("")
}
