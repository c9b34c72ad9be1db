//! Document-load boundary.
//!
//! Loading a note never panics and never takes the caller down with it: a
//! note that fails to decode becomes [`NoteLoad::Failed`], which keeps the
//! raw source around so the load can be retried (for example after a newer
//! node handler was registered).

use crate::{Document, EditorError, Registry};
use std::path::Path;

#[derive(Debug)]
pub enum NoteLoad {
    Ready(Document),
    Failed { error: EditorError, source: String },
}

impl NoteLoad {
    pub fn is_ready(&self) -> bool {
        matches!(self, NoteLoad::Ready(_))
    }

    pub fn document(&self) -> Option<&Document> {
        match self {
            NoteLoad::Ready(document) => Some(document),
            NoteLoad::Failed { .. } => None,
        }
    }

    pub fn into_document(self) -> Option<Document> {
        match self {
            NoteLoad::Ready(document) => Some(document),
            NoteLoad::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&EditorError> {
        match self {
            NoteLoad::Ready(_) => None,
            NoteLoad::Failed { error, .. } => Some(error),
        }
    }

    /// Attempt a failed load again; a ready note is returned as is
    pub fn retry(self, registry: &Registry) -> NoteLoad {
        match self {
            NoteLoad::Failed { source, .. } => load_note(source, registry),
            ready => ready,
        }
    }
}

/// Decode a persisted note
pub fn load_note(source: impl Into<String>, registry: &Registry) -> NoteLoad {
    let source = source.into();
    match Document::from_json(&source, registry) {
        Ok(document) => NoteLoad::Ready(document),
        Err(error) => {
            tracing::warn!("note failed to load: {}", error);
            NoteLoad::Failed { error, source }
        }
    }
}

/// Read and decode a note file. An unreadable file is a failed load with an
/// empty source.
pub fn load_note_file(path: impl AsRef<Path>, registry: &Registry) -> NoteLoad {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(source) => load_note(source, registry),
        Err(error) => {
            tracing::warn!("cannot read note {}: {}", path.display(), error);
            NoteLoad::Failed {
                error: error.into(),
                source: String::new(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FUTURE_NOTE: &str =
        r#"[{"type":"image","version":9,"src":"https://x/y.png","alt":"","width":0,"height":0}]"#;

    #[test]
    fn test_ready() {
        let registry = Registry::with_builtin_nodes();
        let load = load_note(r#"[{"type":"file","version":1,"src":"a.pdf"}]"#, &registry);
        assert!(load.is_ready());
        assert_eq!(load.document().map(|doc| doc.decorators().len()), Some(1));
    }

    #[test]
    fn test_failed_keeps_source() {
        let registry = Registry::with_builtin_nodes();
        let load = load_note(FUTURE_NOTE, &registry);

        assert!(!load.is_ready());
        assert!(matches!(
            load.error(),
            Some(EditorError::UnsupportedVersion { version: 9, .. })
        ));
        match &load {
            NoteLoad::Failed { source, .. } => assert_eq!(source, FUTURE_NOTE),
            NoteLoad::Ready(_) => unreachable!(),
        }
    }

    #[test]
    fn test_garbage_does_not_panic() {
        let registry = Registry::with_builtin_nodes();
        assert!(!load_note("{not json", &registry).is_ready());
        assert!(!load_note("", &registry).is_ready());
    }

    #[test]
    fn test_retry() {
        let registry = Registry::with_builtin_nodes();
        let failed = NoteLoad::Failed {
            error: EditorError::InvalidRecord("interrupted".to_string()),
            source: r#"[{"type":"file","version":1,"src":"a.pdf"}]"#.to_string(),
        };
        assert!(failed.retry(&registry).is_ready());

        assert!(!load_note(FUTURE_NOTE, &registry).retry(&registry).is_ready());
    }

    #[test]
    fn test_missing_file() {
        let registry = Registry::with_builtin_nodes();
        let load = load_note_file("/definitely/not/here.json", &registry);
        assert!(matches!(load.error(), Some(EditorError::Io(_))));
    }
}
