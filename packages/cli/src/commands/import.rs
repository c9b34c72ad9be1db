use super::{resolve, write_output};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use jotter_editor::{Document, EditingSession, InsertContext, Registry, SessionOptions};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// HTML file to import
    pub html: PathBuf,

    /// Output note file (defaults to stdout)
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

pub fn import(args: ImportArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let html = fs::read_to_string(resolve(cwd, &args.html))?;

    let document = import_html(&html, config.session_options())?;
    let json = document.to_json_pretty()?;
    write_output(cwd, args.out.as_deref(), &json)?;

    if let Some(out) = &args.out {
        eprintln!(
            "{} Imported {} blocks → {}",
            "✓".green(),
            document.children(document.root()).len(),
            out.display()
        );
    }
    Ok(())
}

/// Paste `html` into an empty note
pub fn import_html(html: &str, options: SessionOptions) -> Result<Document> {
    let registry = Arc::new(Registry::with_builtin_nodes());
    let mut session = EditingSession::with_options("import", Document::new(), registry, options);
    session.paste_html(html, InsertContext::append())?;
    Ok(session.into_document())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jotter_editor::NodeTypeTag;

    #[test]
    fn test_import_html() {
        let document = import_html(
            "<h1>Trip</h1><p>Photos <span data-node-type=\"tag\" data-tag=\"travel\">#travel</span></p>\
             <img src=\"https://x/beach.png\" alt=\"beach\"><img src=\"file:///tmp/raw.heic\">",
            SessionOptions::default(),
        )
        .unwrap();

        let types: Vec<NodeTypeTag> = document
            .decorators()
            .into_iter()
            .map(|(_, node)| node.node_type())
            .collect();
        assert_eq!(
            types,
            vec![
                NodeTypeTag::TAG,
                NodeTypeTag::IMAGE,
                NodeTypeTag::UNKNOWN_ATTACHMENT
            ]
        );
        assert_eq!(document.text_content(), "Trip\nPhotos #travel\nbeach\nraw.heic");
    }

    #[test]
    fn test_import_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("clip.html"), "<p>hello</p>").unwrap();

        let args = ImportArgs {
            html: PathBuf::from("clip.html"),
            out: Some(PathBuf::from("notes/clip.json")),
        };
        import(args, dir.path()).unwrap();

        let json = fs::read_to_string(dir.path().join("notes/clip.json")).unwrap();
        let registry = Registry::with_builtin_nodes();
        let document = Document::from_json(&json, &registry).unwrap();
        assert_eq!(document.text_content(), "hello");
    }
}
