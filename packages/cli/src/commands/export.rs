use super::{resolve, write_output};
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::{Args, ValueEnum};
use jotter_editor::{load_note_file, Document, NoteLoad, Registry};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Html,
    Json,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Note file to export
    pub note: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "html")]
    pub format: ExportFormat,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

pub fn export(args: ExportArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let registry = Registry::with_builtin_nodes();
    let note = resolve(cwd, &args.note);

    let document = match load_note_file(&note, &registry) {
        NoteLoad::Ready(document) => document,
        NoteLoad::Failed { error, .. } => {
            return Err(anyhow!("{} failed to load: {}", note.display(), error))
        }
    };

    let output = render(&document, args.format, &config)?;
    write_output(cwd, args.out.as_deref(), &output)
}

pub fn render(document: &Document, format: ExportFormat, config: &Config) -> Result<String> {
    Ok(match format {
        ExportFormat::Html => document.to_html(&config.html_options()),
        ExportFormat::Json => document.to_json_pretty()?,
    })
}
