//! # Document Tree
//!
//! A note is a tree of nodes stored in an arena keyed by [`NodeKey`].
//!
//! ```text
//! Root
//!  ├─ Paragraph
//!  │   ├─ Text "Reading list for "
//!  │   └─ Decorator(Tag "economics")
//!  ├─ Decorator(Image)
//!  └─ Paragraph
//! ```
//!
//! Paragraphs and block decorators live directly under the root; text and
//! inline decorators live inside paragraphs. The read API is public, while
//! structural mutation is crate-private and reachable only through a
//! [`Transaction`](crate::Transaction).
//!
//! ## Lifecycle
//!
//! ```text
//! JSON / HTML → Document → Transactions → Document → JSON / HTML
//! ```

use crate::codec::{self, SerializedNode, PARAGRAPH_TYPE, TEXT_TYPE};
use crate::dom::{self, DomElement, DomNode, HtmlOptions};
use crate::insertion::{InsertContext, PlacementPolicy};
use crate::nodes::DecoratorNode;
use crate::registry::Registry;
use crate::transaction::Transaction;
use crate::{import, EditorError, EditorResult, NodeKey};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Paragraph,
    Text(String),
    Decorator(DecoratorNode),
}

impl NodeKind {
    pub fn is_inline(&self) -> bool {
        match self {
            NodeKind::Root | NodeKind::Paragraph => false,
            NodeKind::Text(_) => true,
            NodeKind::Decorator(node) => node.is_inline(),
        }
    }

    /// Name used in diagnostics
    pub fn type_name(&self) -> String {
        match self {
            NodeKind::Root => "root".to_string(),
            NodeKind::Paragraph => PARAGRAPH_TYPE.to_string(),
            NodeKind::Text(_) => TEXT_TYPE.to_string(),
            NodeKind::Decorator(node) => node.node_type().to_string(),
        }
    }

    pub fn as_decorator(&self) -> Option<&DecoratorNode> {
        match self {
            NodeKind::Decorator(node) => Some(node),
            _ => None,
        }
    }
}

impl From<DecoratorNode> for NodeKind {
    fn from(node: DecoratorNode) -> Self {
        NodeKind::Decorator(node)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    kind: NodeKind,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
}

impl TreeNode {
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }
}

/// Editable note document
///
/// `Clone` produces a history snapshot: every node keeps its key.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: HashMap<NodeKey, TreeNode>,
    root: NodeKey,
    next_key: u64,

    /// Current version number (increments on each committed transaction)
    version: u64,

    dirty: bool,
    dirty_keys: BTreeSet<NodeKey>,
}

impl Document {
    /// Empty document containing only the root
    pub fn new() -> Self {
        let root = NodeKey::from_raw(0);
        let mut nodes = HashMap::new();
        nodes.insert(
            root,
            TreeNode {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
            },
        );

        Self {
            nodes,
            root,
            next_key: 1,
            version: 0,
            dirty: false,
            dirty_keys: BTreeSet::new(),
        }
    }

    /// Load a persisted note: a JSON array of block records
    pub fn from_json(json: &str, registry: &Registry) -> EditorResult<Self> {
        let records = codec::parse_records(json)?;
        Self::from_records(&records, registry)
    }

    /// Build a document from block records.
    ///
    /// Unregistered decorator types become unknown-attachments; inline
    /// records found at the top level are wrapped in a paragraph.
    pub fn from_records(records: &[SerializedNode], registry: &Registry) -> EditorResult<Self> {
        let mut doc = Self::new();
        let root = doc.root;
        let mut open_paragraph: Option<NodeKey> = None;

        for record in records {
            let kind = match record.node_type.as_str() {
                PARAGRAPH_TYPE => {
                    record.ensure_version()?;
                    open_paragraph = None;
                    doc.load_paragraph(record, registry)?;
                    continue;
                }
                TEXT_TYPE => NodeKind::Text(codec::read_text(record)?),
                _ => NodeKind::Decorator(registry.import_json_or_fallback(record)?),
            };

            if kind.is_inline() {
                let paragraph = match open_paragraph {
                    Some(key) => key,
                    None => {
                        let key = doc.create_node(NodeKind::Paragraph);
                        doc.attach(root, usize::MAX, key);
                        open_paragraph = Some(key);
                        key
                    }
                };
                let key = doc.create_node(kind);
                doc.attach(paragraph, usize::MAX, key);
            } else {
                open_paragraph = None;
                let key = doc.create_node(kind);
                doc.attach(root, usize::MAX, key);
            }
        }

        doc.dirty = false;
        doc.dirty_keys.clear();
        Ok(doc)
    }

    /// Children of a paragraph record; a block child closes the current
    /// paragraph and later inline children continue in a fresh one. A
    /// paragraph is only opened for inline content, except that an empty
    /// record stays an empty paragraph.
    fn load_paragraph(&mut self, record: &SerializedNode, registry: &Registry) -> EditorResult<()> {
        let root = self.root;
        let children = record.children()?;
        if children.is_empty() {
            let paragraph = self.create_node(NodeKind::Paragraph);
            self.attach(root, usize::MAX, paragraph);
            return Ok(());
        }

        let mut paragraph: Option<NodeKey> = None;
        for child in children {
            let kind = match child.node_type.as_str() {
                TEXT_TYPE => NodeKind::Text(codec::read_text(&child)?),
                PARAGRAPH_TYPE => {
                    return Err(EditorError::InvalidPlacement(
                        "paragraph nested inside paragraph".to_string(),
                    ))
                }
                _ => NodeKind::Decorator(registry.import_json_or_fallback(&child)?),
            };

            if kind.is_inline() {
                let parent = match paragraph {
                    Some(parent) => parent,
                    None => {
                        let parent = self.create_node(NodeKind::Paragraph);
                        self.attach(root, usize::MAX, parent);
                        paragraph = Some(parent);
                        parent
                    }
                };
                let key = self.create_node(kind);
                self.attach(parent, usize::MAX, key);
            } else {
                let key = self.create_node(kind);
                self.attach(root, usize::MAX, key);
                paragraph = None;
            }
        }
        Ok(())
    }

    /// Build a document from pasted or exported HTML
    pub fn from_html(html: &str, registry: &Registry) -> EditorResult<Self> {
        let mut doc = Self::new();
        let imported = import::import_dom(&dom::parse_html_fragment(html), registry);
        {
            let mut tx = Transaction::new(&mut doc);
            let context = InsertContext::append().with_policy(PlacementPolicy::WrapInline);
            import::insert_imported(&mut tx, imported, context)?;
        }
        doc.dirty = false;
        doc.dirty_keys.clear();
        Ok(doc)
    }

    pub fn root(&self) -> NodeKey {
        self.root
    }

    pub fn get(&self, key: NodeKey) -> Option<&TreeNode> {
        self.nodes.get(&key)
    }

    pub fn kind(&self, key: NodeKey) -> Option<&NodeKind> {
        self.nodes.get(&key).map(|node| &node.kind)
    }

    pub fn decorator(&self, key: NodeKey) -> Option<&DecoratorNode> {
        self.kind(key).and_then(NodeKind::as_decorator)
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(&key)
    }

    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.nodes.get(&key).and_then(|node| node.parent)
    }

    /// Children of `key`; empty for leaves and unknown keys
    pub fn children(&self, key: NodeKey) -> &[NodeKey] {
        self.nodes
            .get(&key)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    /// Position of `key` among its parent's children
    pub fn index_in_parent(&self, key: NodeKey) -> Option<usize> {
        let parent = self.parent(key)?;
        self.children(parent).iter().position(|child| *child == key)
    }

    /// Number of nodes including the root
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the root has no children
    pub fn is_empty(&self) -> bool {
        self.children(self.root).is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether the document changed since it was loaded or last saved
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Keys touched since the last save; the host re-renders these
    pub fn dirty_keys(&self) -> &BTreeSet<NodeKey> {
        &self.dirty_keys
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
        self.dirty_keys.clear();
    }

    /// All keys in document order (pre-order, root first)
    pub fn keys(&self) -> Vec<NodeKey> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(key) = stack.pop() {
            out.push(key);
            stack.extend(self.children(key).iter().rev().copied());
        }
        out
    }

    /// Decorator nodes in document order
    pub fn decorators(&self) -> Vec<(NodeKey, &DecoratorNode)> {
        self.keys()
            .into_iter()
            .filter_map(|key| self.decorator(key).map(|node| (key, node)))
            .collect()
    }

    /// Plain text, one line per block
    pub fn text_content(&self) -> String {
        let mut lines = Vec::new();
        for block in self.children(self.root) {
            match self.kind(*block) {
                Some(NodeKind::Paragraph) => {
                    let line: String = self
                        .children(*block)
                        .iter()
                        .filter_map(|child| match self.kind(*child) {
                            Some(NodeKind::Text(text)) => Some(text.clone()),
                            Some(NodeKind::Decorator(node)) => Some(node.text_content()),
                            _ => None,
                        })
                        .collect();
                    lines.push(line);
                }
                Some(NodeKind::Decorator(node)) => lines.push(node.text_content()),
                _ => {}
            }
        }
        lines.join("\n")
    }

    /// Persisted form; keys are not written
    pub fn to_records(&self) -> Vec<SerializedNode> {
        self.children(self.root)
            .iter()
            .filter_map(|key| self.record_for(*key))
            .collect()
    }

    fn record_for(&self, key: NodeKey) -> Option<SerializedNode> {
        match self.kind(key)? {
            NodeKind::Root => None,
            NodeKind::Paragraph => Some(codec::paragraph_record(
                self.children(key)
                    .iter()
                    .filter_map(|child| self.record_for(*child))
                    .collect(),
            )),
            NodeKind::Text(text) => Some(codec::text_record(text)),
            NodeKind::Decorator(node) => Some(node.export_json()),
        }
    }

    pub fn to_json(&self) -> EditorResult<String> {
        Ok(serde_json::to_string(&self.to_records())?)
    }

    pub fn to_json_pretty(&self) -> EditorResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_records())?)
    }

    /// DOM fragment for copy or HTML export
    pub fn to_dom(&self) -> Vec<DomNode> {
        self.children(self.root)
            .iter()
            .filter_map(|key| self.dom_for(*key))
            .collect()
    }

    fn dom_for(&self, key: NodeKey) -> Option<DomNode> {
        match self.kind(key)? {
            NodeKind::Root => None,
            NodeKind::Paragraph => {
                let mut paragraph = DomElement::new("p");
                for child in self.children(key) {
                    if let Some(node) = self.dom_for(*child) {
                        paragraph.push_child(node);
                    }
                }
                Some(DomNode::Element(paragraph))
            }
            NodeKind::Text(text) => Some(DomNode::Text(text.clone())),
            NodeKind::Decorator(node) => Some(DomNode::Element(node.export_dom())),
        }
    }

    pub fn to_html(&self, options: &HtmlOptions) -> String {
        dom::render_html(&self.to_dom(), options)
    }

    // Crate-private structure editing. Callers keep the tree consistent.

    /// Allocate a detached node
    pub(crate) fn create_node(&mut self, kind: NodeKind) -> NodeKey {
        let key = NodeKey::from_raw(self.next_key);
        self.next_key += 1;
        self.nodes.insert(
            key,
            TreeNode {
                kind,
                parent: None,
                children: Vec::new(),
            },
        );
        self.mark_dirty(key);
        key
    }

    /// Attach a detached node under `parent` at `index` (clamped)
    pub(crate) fn attach(&mut self, parent: NodeKey, index: usize, key: NodeKey) {
        if let Some(node) = self.nodes.get_mut(&key) {
            node.parent = Some(parent);
        }
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            let index = index.min(parent_node.children.len());
            parent_node.children.insert(index, key);
        }
        self.mark_dirty(parent);
    }

    /// Detach `key` from its parent, keeping its subtree alive
    pub(crate) fn detach(&mut self, key: NodeKey) {
        let parent = self.nodes.get_mut(&key).and_then(|node| node.parent.take());
        if let Some(parent) = parent {
            if let Some(parent_node) = self.nodes.get_mut(&parent) {
                parent_node.children.retain(|child| *child != key);
            }
            self.mark_dirty(parent);
        }
    }

    /// Detach and drop `key` with its subtree; returns the removed keys
    pub(crate) fn remove_subtree(&mut self, key: NodeKey) -> Vec<NodeKey> {
        self.detach(key);
        let mut removed = Vec::new();
        let mut stack = vec![key];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                stack.extend(node.children);
                self.dirty_keys.remove(&current);
                removed.push(current);
            }
        }
        self.dirty = true;
        removed
    }

    /// Move the children from `from` (starting at `start`) to the end of `to`
    pub(crate) fn move_children(&mut self, from: NodeKey, start: usize, to: NodeKey) {
        let moved: Vec<NodeKey> = match self.nodes.get_mut(&from) {
            Some(node) if start < node.children.len() => node.children.split_off(start),
            _ => return,
        };
        for child in &moved {
            if let Some(node) = self.nodes.get_mut(child) {
                node.parent = Some(to);
            }
        }
        if let Some(target) = self.nodes.get_mut(&to) {
            target.children.extend(moved);
        }
        self.mark_dirty(from);
        self.mark_dirty(to);
    }

    pub(crate) fn kind_mut(&mut self, key: NodeKey) -> Option<&mut NodeKind> {
        self.nodes.get_mut(&key).map(|node| &mut node.kind)
    }

    pub(crate) fn mark_dirty(&mut self, key: NodeKey) {
        self.dirty = true;
        self.dirty_keys.insert(key);
    }

    /// Close a committed transaction
    pub(crate) fn commit(&mut self) {
        self.version += 1;
    }

    /// Discard a failed transaction. Keys minted by it are not reused.
    pub(crate) fn rollback(&mut self, snapshot: Document) {
        let next_key = self.next_key.max(snapshot.next_key);
        *self = snapshot;
        self.next_key = next_key;
    }

    /// Install a history snapshot in place of the current tree.
    ///
    /// The version keeps increasing and key allocation never rewinds, so
    /// keys minted after the snapshot are not handed out again.
    pub(crate) fn restore(&mut self, snapshot: Document) {
        let next_key = self.next_key.max(snapshot.next_key);
        let version = self.version + 1;
        let dirty_keys = snapshot.nodes.keys().copied().collect();

        *self = snapshot;
        self.next_key = next_key;
        self.version = version;
        self.dirty = true;
        self.dirty_keys = dirty_keys;
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
