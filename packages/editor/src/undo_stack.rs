//! # Undo/Redo Stack
//!
//! Snapshot history for a [`Document`].
//!
//! ## Design
//!
//! - Before a committed update, the session records a clone of the document
//! - Undo swaps the current tree for the most recent snapshot
//! - Redo swaps it back
//! - New entries clear the redo stack
//! - Batches group several updates into one undo step
//!
//! Snapshots keep node keys, so keys held by async callers stay valid across
//! undo/redo as long as the node exists in the restored tree.
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut stack = UndoStack::new();
//! stack.record(doc.clone(), Some("Insert image"));
//! // ... edit doc ...
//! stack.undo(&mut doc);
//! stack.redo(&mut doc);
//! ```

use crate::Document;

/// One undo step
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Document state to return to
    pub snapshot: Document,

    pub description: Option<String>,
}

#[derive(Debug, Default)]
struct PendingBatch {
    snapshot: Option<Document>,
    description: Option<String>,
}

/// Undo/redo stack for document editing
#[derive(Debug)]
pub struct UndoStack {
    /// Most recent last
    undo_stack: Vec<HistoryEntry>,

    /// Most recent last
    redo_stack: Vec<HistoryEntry>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    current_batch: Option<PendingBatch>,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    /// Record the state from before an update
    pub fn record(&mut self, snapshot: Document, description: Option<&str>) {
        if let Some(batch) = &mut self.current_batch {
            // A batch returns to the state before its first update
            if batch.snapshot.is_none() {
                batch.snapshot = Some(snapshot);
            }
            if batch.description.is_none() {
                batch.description = description.map(str::to_string);
            }
            return;
        }

        self.push_entry(HistoryEntry {
            snapshot,
            description: description.map(str::to_string),
        });
    }

    /// Start a batch of updates (undone/redone together)
    pub fn begin_batch(&mut self) {
        self.current_batch = Some(PendingBatch::default());
    }

    /// End the current batch and push it, if anything was recorded
    pub fn end_batch(&mut self) {
        if let Some(PendingBatch {
            snapshot: Some(snapshot),
            description,
        }) = self.current_batch.take()
        {
            self.push_entry(HistoryEntry {
                snapshot,
                description,
            });
        }
    }

    pub fn is_batching(&self) -> bool {
        self.current_batch.is_some()
    }

    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = &mut self.current_batch {
            batch.description = Some(description.into());
        }
    }

    fn push_entry(&mut self, entry: HistoryEntry) {
        self.undo_stack.push(entry);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // A new action invalidates the redo future
        self.redo_stack.clear();
    }

    /// Returns false when there is nothing to undo
    pub fn undo(&mut self, doc: &mut Document) -> bool {
        let Some(entry) = self.undo_stack.pop() else {
            return false;
        };

        self.redo_stack.push(HistoryEntry {
            snapshot: doc.clone(),
            description: entry.description.clone(),
        });
        doc.restore(entry.snapshot);
        true
    }

    /// Returns false when there is nothing to redo
    pub fn redo(&mut self, doc: &mut Document) -> bool {
        let Some(entry) = self.redo_stack.pop() else {
            return false;
        };

        self.undo_stack.push(HistoryEntry {
            snapshot: doc.clone(),
            description: entry.description.clone(),
        });
        doc.restore(entry.snapshot);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|entry| entry.description.as_deref())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|entry| entry.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InsertContext, Transaction};

    /// Append a paragraph holding `text`, recording history first
    fn append(stack: &mut UndoStack, doc: &mut Document, text: &str) {
        stack.record(doc.clone(), Some(text));
        let mut tx = Transaction::new(doc);
        let paragraph = tx.insert_paragraph(&InsertContext::append()).unwrap();
        tx.insert_text(text, &InsertContext::caret(paragraph, 0))
            .unwrap();
        doc.commit();
    }

    #[test]
    fn test_undo_stack_creation() {
        let stack = UndoStack::new();
        assert_eq!(stack.undo_levels(), 0);
        assert_eq!(stack.redo_levels(), 0);
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_undo_and_redo() {
        let mut doc = Document::new();
        let mut stack = UndoStack::new();

        append(&mut stack, &mut doc, "Hello");
        assert_eq!(stack.undo_levels(), 1);

        assert!(stack.undo(&mut doc));
        assert_eq!(doc.text_content(), "");
        assert_eq!(stack.redo_levels(), 1);
        assert_eq!(stack.redo_description(), Some("Hello"));

        assert!(stack.redo(&mut doc));
        assert_eq!(doc.text_content(), "Hello");
        assert_eq!(stack.undo_levels(), 1);
        assert_eq!(stack.redo_levels(), 0);

        let mut empty = UndoStack::new();
        assert!(!empty.undo(&mut doc));
        assert!(!empty.redo(&mut doc));
    }

    #[test]
    fn test_redo_keeps_keys() {
        let mut doc = Document::new();
        let mut stack = UndoStack::new();
        append(&mut stack, &mut doc, "Hello");
        let keys = doc.keys();

        stack.undo(&mut doc);
        stack.redo(&mut doc);
        assert_eq!(doc.keys(), keys);
    }

    #[test]
    fn test_batched_updates() {
        let mut doc = Document::new();
        let mut stack = UndoStack::new();

        stack.begin_batch();
        stack.set_batch_description("Write greeting");
        append(&mut stack, &mut doc, "Hello");
        append(&mut stack, &mut doc, "World");
        stack.end_batch();

        assert_eq!(stack.undo_levels(), 1);
        assert_eq!(stack.undo_description(), Some("Write greeting"));

        stack.undo(&mut doc);
        assert_eq!(doc.text_content(), "");
    }

    #[test]
    fn test_empty_batch_is_dropped() {
        let mut stack = UndoStack::new();
        stack.begin_batch();
        assert!(stack.is_batching());
        stack.end_batch();
        assert_eq!(stack.undo_levels(), 0);
    }

    #[test]
    fn test_new_entry_clears_redo() {
        let mut doc = Document::new();
        let mut stack = UndoStack::new();

        append(&mut stack, &mut doc, "Hello");
        stack.undo(&mut doc);
        assert_eq!(stack.redo_levels(), 1);

        append(&mut stack, &mut doc, "Everyone");
        assert_eq!(stack.redo_levels(), 0);
    }

    #[test]
    fn test_max_levels_enforced() {
        let mut doc = Document::new();
        let mut stack = UndoStack::with_max_levels(2);

        for i in 0..3 {
            append(&mut stack, &mut doc, &format!("Text {}", i));
        }

        assert_eq!(stack.undo_levels(), 2);
        assert_eq!(stack.undo_description(), Some("Text 2"));
    }
}
