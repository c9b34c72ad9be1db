//! # Replacement / Creation Protocol
//!
//! Rules for placing a freshly created node into the tree.
//!
//! | parent    | node   | result                                            |
//! |-----------|--------|---------------------------------------------------|
//! | paragraph | inline | inserted at the caret                             |
//! | root      | block  | inserted at the caret                             |
//! | root      | inline | `InvalidPlacement`, or wrapped in a new paragraph |
//! | paragraph | block  | paragraph split at the caret, block between halves |
//! | leaf      | any    | `InvalidPlacement`                                |
//!
//! Every placement mints a new key, so a node can never appear twice.

use crate::document::{Document, NodeKind};
use crate::{EditorError, EditorResult, NodeKey};

/// Where a new node goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertTarget {
    /// Child position `offset` of `parent` (clamped to the child count)
    Caret { parent: NodeKey, offset: usize },

    /// Take the exact position of an existing node, removing it
    Replace(NodeKey),

    /// After the last block
    AppendToRoot,
}

/// What to do with an inline node that lands outside a paragraph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlacementPolicy {
    #[default]
    Strict,

    /// Synthesize a paragraph around it
    WrapInline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertContext {
    pub target: InsertTarget,
    pub policy: PlacementPolicy,
}

impl InsertContext {
    pub fn caret(parent: NodeKey, offset: usize) -> Self {
        Self {
            target: InsertTarget::Caret { parent, offset },
            policy: PlacementPolicy::Strict,
        }
    }

    pub fn replace(key: NodeKey) -> Self {
        Self {
            target: InsertTarget::Replace(key),
            policy: PlacementPolicy::Strict,
        }
    }

    pub fn append() -> Self {
        Self {
            target: InsertTarget::AppendToRoot,
            policy: PlacementPolicy::Strict,
        }
    }

    pub fn with_policy(mut self, policy: PlacementPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Caret directly after `key`, keeping this context's policy
    pub fn after(self, document: &Document, key: NodeKey) -> Self {
        match (document.parent(key), document.index_in_parent(key)) {
            (Some(parent), Some(index)) => Self::caret(parent, index + 1).with_policy(self.policy),
            _ => Self::append().with_policy(self.policy),
        }
    }
}

/// Outcome of a placement
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Placement {
    pub key: NodeKey,
    /// Keys dropped by a replacement or by collapsing an emptied paragraph
    pub removed: Vec<NodeKey>,
}

enum Plan {
    Direct,
    Wrap,
    Split { container: NodeKey },
}

pub(crate) fn insert(
    doc: &mut Document,
    kind: NodeKind,
    context: &InsertContext,
) -> EditorResult<Placement> {
    if kind == NodeKind::Root {
        return Err(EditorError::InvalidPlacement(
            "a root cannot be inserted".to_string(),
        ));
    }

    let (parent, offset, replaced) = resolve_target(doc, context.target)?;
    let parent_kind = doc.kind(parent).ok_or(EditorError::NodeNotFound(parent))?;

    // Validate everything before touching the tree
    let plan = match (parent_kind, kind.is_inline()) {
        (NodeKind::Paragraph, true) | (NodeKind::Root, false) => Plan::Direct,
        (NodeKind::Root, true) => match context.policy {
            PlacementPolicy::WrapInline => Plan::Wrap,
            PlacementPolicy::Strict => {
                return Err(EditorError::InvalidPlacement(format!(
                    "inline node '{}' needs a paragraph ancestor",
                    kind.type_name()
                )))
            }
        },
        (NodeKind::Paragraph, false) => {
            let container = doc.parent(parent).ok_or_else(|| {
                EditorError::InvalidPlacement(format!("paragraph {} is detached", parent))
            })?;
            Plan::Split { container }
        }
        (other, _) => {
            return Err(EditorError::InvalidPlacement(format!(
                "'{}' cannot hold child nodes",
                other.type_name()
            )))
        }
    };

    let mut removed = match replaced {
        Some(old) => doc.remove_subtree(old),
        None => Vec::new(),
    };

    let type_name = kind.type_name();
    let key = doc.create_node(kind);
    match plan {
        Plan::Direct => doc.attach(parent, offset, key),
        Plan::Wrap => {
            let paragraph = doc.create_node(NodeKind::Paragraph);
            doc.attach(parent, offset, paragraph);
            doc.attach(paragraph, 0, key);
            tracing::debug!("wrapped inline '{}' {} in paragraph {}", type_name, key, paragraph);
        }
        Plan::Split { container } => {
            removed.extend(split_paragraph(doc, container, parent, offset, key));
        }
    }

    tracing::debug!("inserted '{}' as {} under {}", type_name, key, parent);
    Ok(Placement { key, removed })
}

fn resolve_target(
    doc: &Document,
    target: InsertTarget,
) -> EditorResult<(NodeKey, usize, Option<NodeKey>)> {
    match target {
        InsertTarget::Caret { parent, offset } => {
            if !doc.contains(parent) {
                return Err(EditorError::NodeNotFound(parent));
            }
            Ok((parent, offset.min(doc.children(parent).len()), None))
        }
        InsertTarget::Replace(key) => {
            if !doc.contains(key) {
                return Err(EditorError::NodeNotFound(key));
            }
            let parent = doc.parent(key).ok_or_else(|| {
                EditorError::InvalidPlacement("the root cannot be replaced".to_string())
            })?;
            let index = doc.index_in_parent(key).unwrap_or(0);
            Ok((parent, index, Some(key)))
        }
        InsertTarget::AppendToRoot => {
            let root = doc.root();
            Ok((root, doc.children(root).len(), None))
        }
    }
}

/// Place `block` at `offset` inside `paragraph` by splitting the paragraph.
/// Empty halves are not kept.
fn split_paragraph(
    doc: &mut Document,
    container: NodeKey,
    paragraph: NodeKey,
    offset: usize,
    block: NodeKey,
) -> Vec<NodeKey> {
    let index = doc.index_in_parent(paragraph).unwrap_or(0);
    let len = doc.children(paragraph).len();
    let offset = offset.min(len);

    if offset == 0 {
        doc.attach(container, index, block);
        if len == 0 {
            return doc.remove_subtree(paragraph);
        }
    } else if offset == len {
        doc.attach(container, index + 1, block);
    } else {
        let tail = doc.create_node(NodeKind::Paragraph);
        doc.move_children(paragraph, offset, tail);
        doc.attach(container, index + 1, block);
        doc.attach(container, index + 2, tail);
    }
    Vec::new()
}
