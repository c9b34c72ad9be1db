//! # Editing Session
//!
//! One open note: the document, the node registry, per-node interaction
//! state and undo history.
//!
//! The session methods are the command interface for the UI. Each one that
//! edits the tree runs as a single transaction: on success the document
//! version is bumped and a history entry is recorded; on error the tree is
//! rolled back to where it was.
//!
//! Keys handed out by the session stay valid for async callers. A result
//! that arrives after its node was removed is dropped by
//! [`EditingSession::apply_deferred`].

use crate::dom::parse_html_fragment;
use crate::import::{self, ImportedNode};
use crate::insertion::{InsertContext, InsertTarget, PlacementPolicy};
use crate::interaction::InteractionState;
use crate::nodes::{DecoratorNode, Dimension};
use crate::undo_stack::UndoStack;
use crate::{Document, EditorError, EditorResult, NodeKey, NodeKind, Registry, Transaction};
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Maximum undo levels (0 = unlimited)
    pub history_limit: usize,

    /// Placement policy applied to pasted content
    pub paste_policy: PlacementPolicy,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            history_limit: 100,
            paste_policy: PlacementPolicy::WrapInline,
        }
    }
}

pub struct EditingSession {
    id: String,
    document: Document,
    registry: Arc<Registry>,
    interaction: InteractionState,
    history: UndoStack,
    options: SessionOptions,
}

impl EditingSession {
    pub fn new(id: impl Into<String>, document: Document, registry: Arc<Registry>) -> Self {
        Self::with_options(id, document, registry, SessionOptions::default())
    }

    pub fn with_options(
        id: impl Into<String>,
        document: Document,
        registry: Arc<Registry>,
        options: SessionOptions,
    ) -> Self {
        Self {
            id: id.into(),
            document,
            registry,
            interaction: InteractionState::new(),
            history: UndoStack::with_max_levels(options.history_limit),
            options,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    /// Run `f` as one transaction.
    ///
    /// An error from `f` rolls the tree back. A transaction that wrote
    /// nothing leaves version and history untouched.
    pub fn update<T>(
        &mut self,
        description: &str,
        f: impl FnOnce(&mut Transaction<'_>) -> EditorResult<T>,
    ) -> EditorResult<T> {
        let snapshot = self.document.clone();
        let (result, changed) = {
            let mut tx = Transaction::new(&mut self.document);
            let result = f(&mut tx);
            (result, tx.is_changed())
        };

        match result {
            Err(error) => {
                if changed {
                    tracing::debug!("rolling back '{}': {}", description, error);
                    self.document.rollback(snapshot);
                }
                Err(error)
            }
            Ok(value) => {
                if changed {
                    self.document.commit();
                    self.history.record(snapshot, Some(description));
                    self.prune_interaction();
                    tracing::debug!(
                        "session {} committed '{}' (version {})",
                        self.id,
                        description,
                        self.document.version()
                    );
                }
                Ok(value)
            }
        }
    }

    /// Group the following updates into one undo step
    pub fn begin_batch(&mut self, description: impl Into<String>) {
        self.history.begin_batch();
        self.history.set_batch_description(description);
    }

    pub fn end_batch(&mut self) {
        self.history.end_batch();
    }

    /// Create a node with `factory` and place it per `context`
    pub fn insert_node(
        &mut self,
        factory: impl FnOnce() -> DecoratorNode,
        context: InsertContext,
    ) -> EditorResult<NodeKey> {
        let node = factory();
        let description = format!("Insert {}", node.node_type());
        self.update(&description, |tx| tx.insert(node, &context))
    }

    /// Insert a node of a registered type built from raw attributes
    pub fn insert_registered(
        &mut self,
        node_type: &str,
        attributes: &Map<String, Value>,
        context: InsertContext,
    ) -> EditorResult<NodeKey> {
        let node = self.registry.create(node_type, attributes)?;
        self.insert_node(|| node, context)
    }

    pub fn remove_node(&mut self, key: NodeKey) -> EditorResult<Vec<NodeKey>> {
        self.update("Remove node", |tx| tx.remove(key))
    }

    pub fn set_selected(&mut self, key: NodeKey, selected: bool) -> EditorResult<()> {
        if !self.document.contains(key) {
            return Err(EditorError::NodeNotFound(key));
        }
        self.interaction.set_selected(key, selected);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.interaction.clear_selection();
    }

    /// Deselect `key` only
    pub fn clear_selection_for(&mut self, key: NodeKey) {
        self.interaction.clear_selection_for(key);
    }

    /// Ignored (returns false) unless `key` is selected
    pub fn set_expanded(&mut self, key: NodeKey, expanded: bool) -> bool {
        self.interaction.set_expanded(key, expanded)
    }

    /// Ignored (returns false) unless `key` is selected
    pub fn set_resizing(&mut self, key: NodeKey, resizing: bool) -> bool {
        self.interaction.set_resizing(key, resizing)
    }

    pub fn is_selected(&self, key: NodeKey) -> bool {
        self.interaction.is_selected(key)
    }

    pub fn is_expanded(&self, key: NodeKey) -> bool {
        self.interaction.is_expanded(key)
    }

    pub fn set_width_and_height(
        &mut self,
        key: NodeKey,
        width: Dimension,
        height: Dimension,
    ) -> EditorResult<()> {
        self.update("Resize image", |tx| match tx.writable(key)? {
            DecoratorNode::Image(image) => {
                image.set_width_and_height(width, height);
                Ok(())
            }
            other => Err(EditorError::WrongNodeType {
                key,
                expected: "image",
                actual: other.node_type().to_string(),
            }),
        })
    }

    pub fn set_tag(&mut self, key: NodeKey, tag: &str) -> EditorResult<()> {
        self.update("Rename tag", |tx| match tx.writable(key)? {
            DecoratorNode::Tag(node) => {
                node.set_tag(tag);
                Ok(())
            }
            other => Err(EditorError::WrongNodeType {
                key,
                expected: "tag",
                actual: other.node_type().to_string(),
            }),
        })
    }

    /// Import clipboard HTML at `context`.
    ///
    /// The session's paste policy replaces the context's. A paste of a
    /// single paragraph into a paragraph merges its content at the caret.
    pub fn paste_html(&mut self, html: &str, context: InsertContext) -> EditorResult<Vec<NodeKey>> {
        let mut items = import::import_dom(&parse_html_fragment(html), &self.registry);
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let context = context.with_policy(self.options.paste_policy);
        if items.len() == 1 && self.targets_paragraph(&context) {
            if let Some(ImportedNode::Paragraph(children)) = items.pop() {
                items = children;
            }
        }

        self.update("Paste", |tx| import::insert_imported(tx, items, context))
    }

    fn targets_paragraph(&self, context: &InsertContext) -> bool {
        let parent = match context.target {
            InsertTarget::Caret { parent, .. } => Some(parent),
            InsertTarget::Replace(key) => self.document.parent(key),
            InsertTarget::AppendToRoot => None,
        };
        parent.and_then(|key| self.document.kind(key)) == Some(&NodeKind::Paragraph)
    }

    /// Apply a result that arrived after the command that asked for it.
    ///
    /// Returns `Ok(false)` without touching anything when `key` has left the
    /// tree in the meantime.
    pub fn apply_deferred(
        &mut self,
        key: NodeKey,
        f: impl FnOnce(&mut DecoratorNode),
    ) -> EditorResult<bool> {
        if !self.document.contains(key) {
            tracing::debug!("dropping deferred update for removed node {}", key);
            return Ok(false);
        }

        self.update("Deferred update", |tx| {
            f(tx.writable(key)?);
            Ok(())
        })?;
        Ok(true)
    }

    pub fn undo(&mut self) -> bool {
        let undone = self.history.undo(&mut self.document);
        if undone {
            self.prune_interaction();
        }
        undone
    }

    pub fn redo(&mut self) -> bool {
        let redone = self.history.redo(&mut self.document);
        if redone {
            self.prune_interaction();
        }
        redone
    }

    fn prune_interaction(&mut self) {
        let document = &self.document;
        self.interaction.retain(|key| document.contains(key));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{ImageNode, TagNode};

    fn session() -> EditingSession {
        EditingSession::new(
            "test",
            Document::new(),
            Arc::new(Registry::with_builtin_nodes()),
        )
    }

    fn image() -> DecoratorNode {
        ImageNode::new("https://x/y.png", "cat").into()
    }

    #[test]
    fn test_session_creation() {
        let session = session();
        assert_eq!(session.id(), "test");
        assert!(!session.history().can_undo());
        assert!(session.interaction().selected_keys().is_empty());
    }

    #[test]
    fn test_insert_commits_and_records() {
        let mut session = session();
        let key = session.insert_node(image, InsertContext::append()).unwrap();

        assert!(session.document().contains(key));
        assert!(session.document().is_dirty());
        assert_eq!(session.document().version(), 1);
        assert_eq!(session.history().undo_description(), Some("Insert image"));
    }

    #[test]
    fn test_failed_insert_rolls_back() {
        let mut session = session();
        let result = session.insert_node(|| TagNode::new("x").into(), InsertContext::append());

        assert!(matches!(result, Err(EditorError::InvalidPlacement(_))));
        assert_eq!(session.document().len(), 1);
        assert_eq!(session.document().version(), 0);
        assert!(!session.history().can_undo());
    }

    #[test]
    fn test_rollback_does_not_reuse_keys() {
        let mut session = session();
        let result: EditorResult<()> = session.update("Broken", |tx| {
            tx.insert(image(), &InsertContext::append())?;
            Err(EditorError::InvalidRecord("stop".to_string()))
        });
        assert!(result.is_err());
        assert!(session.document().is_empty());

        let key = session.insert_node(image, InsertContext::append()).unwrap();
        assert_eq!(key.raw(), 2);
    }

    #[test]
    fn test_set_width_and_height() {
        let mut session = session();
        let key = session.insert_node(image, InsertContext::append()).unwrap();
        session
            .set_width_and_height(key, Dimension::px(300), Dimension::Inherit)
            .unwrap();

        let image = session.document().decorator(key).unwrap().as_image().unwrap();
        assert_eq!(image.width(), Dimension::Pixels(300));
        assert_eq!(image.height(), Dimension::Inherit);
    }

    #[test]
    fn test_set_width_and_height_on_tag_fails() {
        let mut session = session();
        let context = InsertContext::append().with_policy(PlacementPolicy::WrapInline);
        let key = session
            .insert_node(|| TagNode::new("x").into(), context)
            .unwrap();
        let version = session.document().version();

        let result = session.set_width_and_height(key, Dimension::px(10), Dimension::px(10));
        assert!(matches!(result, Err(EditorError::WrongNodeType { expected: "image", .. })));
        assert_eq!(session.document().version(), version);
    }

    #[test]
    fn test_selection_requires_existing_node() {
        let mut session = session();
        assert!(matches!(
            session.set_selected(NodeKey::from_raw(7), true),
            Err(EditorError::NodeNotFound(_))
        ));
    }

    #[test]
    fn test_removed_node_loses_selection() {
        let mut session = session();
        let key = session.insert_node(image, InsertContext::append()).unwrap();
        session.set_selected(key, true).unwrap();
        assert!(session.set_expanded(key, true));

        session.remove_node(key).unwrap();
        assert!(!session.is_selected(key));
        assert!(!session.is_expanded(key));
    }

    #[test]
    fn test_keyed_clear_deselects_key() {
        let mut session = session();
        let first = session.insert_node(image, InsertContext::append()).unwrap();
        let second = session.insert_node(image, InsertContext::append()).unwrap();
        session.set_selected(first, true).unwrap();
        session.set_selected(second, true).unwrap();
        assert!(session.set_expanded(first, true));

        session.clear_selection_for(first);
        assert!(!session.is_selected(first));
        assert!(!session.is_expanded(first));
        assert!(session.is_selected(second));
    }

    #[test]
    fn test_selection_is_not_history() {
        let mut session = session();
        let key = session.insert_node(image, InsertContext::append()).unwrap();
        let version = session.document().version();
        session.set_selected(key, true).unwrap();

        assert_eq!(session.document().version(), version);
        assert_eq!(session.history().undo_levels(), 1);
    }

    #[test]
    fn test_deferred_after_removal_is_noop() {
        let mut session = session();
        let key = session.insert_node(image, InsertContext::append()).unwrap();
        session.remove_node(key).unwrap();
        let version = session.document().version();

        let applied = session
            .apply_deferred(key, |node| {
                if let Some(image) = node.as_image_mut() {
                    image.set_alt_text("late");
                }
            })
            .unwrap();
        assert!(!applied);
        assert_eq!(session.document().version(), version);
    }

    #[test]
    fn test_deferred_update_applies() {
        let mut session = session();
        let key = session.insert_node(image, InsertContext::append()).unwrap();
        let applied = session
            .apply_deferred(key, |node| {
                if let Some(image) = node.as_image_mut() {
                    image.set_alt_text("a tabby cat");
                }
            })
            .unwrap();
        assert!(applied);
        assert_eq!(
            session.document().decorator(key).unwrap().text_content(),
            "a tabby cat"
        );
    }

    #[test]
    fn test_paste_into_paragraph_merges() {
        let mut session = session();
        let paragraph = session
            .update("Setup", |tx| {
                let paragraph = tx.insert_paragraph(&InsertContext::append())?;
                tx.insert_text("ab", &InsertContext::caret(paragraph, 0))?;
                Ok(paragraph)
            })
            .unwrap();

        let keys = session
            .paste_html("<p>see <b>this</b></p>", InsertContext::caret(paragraph, 1))
            .unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(session.document().children(session.document().root()).len(), 1);
        assert_eq!(session.document().text_content(), "absee this");
    }

    #[test]
    fn test_undo_redo() {
        let mut session = session();
        let key = session.insert_node(image, InsertContext::append()).unwrap();

        assert!(session.undo());
        assert!(!session.document().contains(key));
        assert!(session.redo());
        assert!(session.document().contains(key));
        assert!(!session.redo());
    }

    #[test]
    fn test_batched_commands() {
        let mut session = session();
        session.begin_batch("Insert two images");
        session.insert_node(image, InsertContext::append()).unwrap();
        session.insert_node(image, InsertContext::append()).unwrap();
        session.end_batch();

        assert_eq!(session.history().undo_levels(), 1);
        session.undo();
        assert_eq!(session.document().len(), 1);
    }
}
