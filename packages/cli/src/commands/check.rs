use super::resolve;
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use jotter_editor::{load_note_file, NoteLoad, Registry};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Note file or directory (defaults to the configured notes directory)
    pub path: Option<PathBuf>,
}

/// Outcome of checking a set of notes
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CheckSummary {
    pub loaded: usize,
    pub failed: usize,
}

pub fn check(args: CheckArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let root = match &args.path {
        Some(path) => resolve(cwd, path),
        None => config.get_notes_dir(cwd),
    };

    if !root.exists() {
        return Err(anyhow!("Path does not exist: {}", root.display()));
    }

    println!("{}", "🔍 Checking notes...".bright_blue().bold());

    let notes = find_note_files(&root);
    if notes.is_empty() {
        println!("{}", "⚠️  No notes found".yellow());
        return Ok(());
    }
    println!("Found {} notes", notes.len());

    let registry = Registry::with_builtin_nodes();
    let summary = check_notes(&notes, &root, &registry);

    println!();
    if summary.failed == 0 {
        println!("{} {} notes loaded", "✅".green(), summary.loaded);
        Ok(())
    } else {
        Err(anyhow!(
            "{} of {} notes failed to load",
            summary.failed,
            summary.loaded + summary.failed
        ))
    }
}

/// Load every note, reporting each one; a failure never stops the run
pub fn check_notes(notes: &[PathBuf], root: &Path, registry: &Registry) -> CheckSummary {
    let mut summary = CheckSummary::default();

    for note in notes {
        let relative_path = note.strip_prefix(root).unwrap_or(note);
        match load_note_file(note, registry) {
            NoteLoad::Ready(document) => {
                summary.loaded += 1;
                println!(
                    "  {} {} ({} nodes)",
                    "✓".green(),
                    relative_path.display(),
                    document.len() - 1
                );
            }
            NoteLoad::Failed { error, .. } => {
                summary.failed += 1;
                eprintln!(
                    "  {} {} - {}",
                    "✗".red(),
                    relative_path.display(),
                    error.to_string().red()
                );
            }
        }
    }

    summary
}

/// `*.json` files under `root`, or `root` itself when it is a file
pub fn find_note_files(root: &Path) -> Vec<PathBuf> {
    if root.is_file() {
        return vec![root.to_path_buf()];
    }

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    files.sort();
    files
}
