use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use jotter_editor::nodes::TagNode;
use jotter_editor::{Document, EditingSession, InsertContext, PlacementPolicy, Registry};
use std::fs;
use std::path::Path;
use std::sync::Arc;

pub const WELCOME_NOTE: &str = "welcome.json";

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Notes directory
    #[arg(short, long, default_value = "notes")]
    pub notes_dir: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Jotter notes...".bright_blue().bold());

    let notes_dir = cwd.join(&args.notes_dir);
    if !notes_dir.exists() {
        fs::create_dir_all(&notes_dir)?;
        println!("  {} Created {}/", "✓".green(), args.notes_dir);
    }

    let welcome = notes_dir.join(WELCOME_NOTE);
    if !welcome.exists() {
        fs::write(&welcome, welcome_note()?.to_json_pretty()?)?;
        println!("  {} Created {}", "✓".green(), WELCOME_NOTE);
    }

    let config = Config {
        notes_dir: args.notes_dir.clone(),
        ..Config::default()
    };
    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Notes initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: jotter check");
    println!("  2. Run: jotter export {}/{}", args.notes_dir, WELCOME_NOTE);

    Ok(())
}

fn welcome_note() -> Result<Document> {
    let registry = Arc::new(Registry::with_builtin_nodes());
    let mut session = EditingSession::new("init", Document::new(), registry);
    let wrap = InsertContext::append().with_policy(PlacementPolicy::WrapInline);

    let paragraph = session.update("Welcome", |tx| {
        let text = tx.insert_text("Welcome to Jotter ", &wrap)?;
        Ok(tx.document().parent(text))
    })?;
    if let Some(paragraph) = paragraph {
        let end = session.document().children(paragraph).len();
        session.insert_node(
            || TagNode::new("getting-started").into(),
            InsertContext::caret(paragraph, end),
        )?;
    }
    Ok(session.into_document())
}
