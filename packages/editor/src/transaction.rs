//! Mutable access to a document for the duration of one update.
//!
//! A `Transaction` holds the only `&mut Document` while it is alive, so the
//! borrow checker rules out edits outside an update.

use crate::document::{Document, NodeKind};
use crate::insertion::{self, InsertContext};
use crate::nodes::DecoratorNode;
use crate::{EditorError, EditorResult, NodeKey};

pub struct Transaction<'a> {
    document: &'a mut Document,
    changed: bool,
    inserted: Vec<NodeKey>,
    removed: Vec<NodeKey>,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(document: &'a mut Document) -> Self {
        Self {
            document,
            changed: false,
            inserted: Vec::new(),
            removed: Vec::new(),
        }
    }

    /// Read-only view of the tree being edited
    pub fn document(&self) -> &Document {
        self.document
    }

    /// Writable handle to a decorator; marks it dirty
    pub fn writable(&mut self, key: NodeKey) -> EditorResult<&mut DecoratorNode> {
        match self.document.kind(key) {
            Some(NodeKind::Decorator(_)) => {}
            Some(_) => return Err(EditorError::NotADecorator(key)),
            None => return Err(EditorError::NodeNotFound(key)),
        }

        self.document.mark_dirty(key);
        self.changed = true;
        match self.document.kind_mut(key) {
            Some(NodeKind::Decorator(node)) => Ok(node),
            _ => Err(EditorError::NotADecorator(key)),
        }
    }

    /// Replace the content of a text node
    pub fn set_text(&mut self, key: NodeKey, text: impl Into<String>) -> EditorResult<()> {
        let actual = match self.document.kind_mut(key) {
            Some(NodeKind::Text(current)) => {
                *current = text.into();
                None
            }
            Some(other) => Some(other.type_name()),
            None => return Err(EditorError::NodeNotFound(key)),
        };
        if let Some(actual) = actual {
            return Err(EditorError::WrongNodeType {
                key,
                expected: crate::codec::TEXT_TYPE,
                actual,
            });
        }

        self.document.mark_dirty(key);
        self.changed = true;
        Ok(())
    }

    /// Create a node and place it according to `context`
    pub fn insert(
        &mut self,
        kind: impl Into<NodeKind>,
        context: &InsertContext,
    ) -> EditorResult<NodeKey> {
        let placement = insertion::insert(self.document, kind.into(), context)?;
        self.changed = true;
        self.inserted.push(placement.key);
        self.removed.extend(placement.removed);
        Ok(placement.key)
    }

    pub fn insert_paragraph(&mut self, context: &InsertContext) -> EditorResult<NodeKey> {
        self.insert(NodeKind::Paragraph, context)
    }

    pub fn insert_text(
        &mut self,
        text: impl Into<String>,
        context: &InsertContext,
    ) -> EditorResult<NodeKey> {
        self.insert(NodeKind::Text(text.into()), context)
    }

    /// Remove `key` and its subtree; returns every removed key
    pub fn remove(&mut self, key: NodeKey) -> EditorResult<Vec<NodeKey>> {
        if key == self.document.root() {
            return Err(EditorError::InvalidPlacement(
                "the root cannot be removed".to_string(),
            ));
        }
        if !self.document.contains(key) {
            return Err(EditorError::NodeNotFound(key));
        }

        let removed = self.document.remove_subtree(key);
        self.changed = true;
        self.removed.extend(removed.iter().copied());
        Ok(removed)
    }

    pub fn inserted_keys(&self) -> &[NodeKey] {
        &self.inserted
    }

    pub fn removed_keys(&self) -> &[NodeKey] {
        &self.removed
    }

    /// Whether anything was written through this transaction
    pub fn is_changed(&self) -> bool {
        self.changed
    }
}
