//! # Node Type Registry
//!
//! Maps a node type tag to the functions that construct, import and export
//! that kind of node.
//!
//! DOM import is priority ordered: several kinds may claim the same element
//! name (`<img>` is claimed by both the image and the unknown-attachment
//! importers). Candidates are tried from the highest priority down, in
//! registration order within a priority, and the first `Some` wins.

use crate::codec::SerializedNode;
use crate::dom::{DomElement, NODE_TYPE_ATTRIBUTE};
use crate::nodes::{builtin_handlers, DecoratorNode, NodeTypeTag, UnknownAttachmentNode};
use crate::{EditorError, EditorResult};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// Build a node from an attribute map (no version check)
pub type NodeFactory = fn(&Map<String, Value>) -> EditorResult<DecoratorNode>;

pub type JsonImporter = fn(&SerializedNode) -> EditorResult<DecoratorNode>;

pub type JsonExporter = fn(&DecoratorNode) -> SerializedNode;

/// Returns `None` to decline the element
pub type DomImporter = fn(&DomElement) -> Option<DecoratorNode>;

pub type DomExporter = fn(&DecoratorNode) -> DomElement;

/// One DOM element name a node kind is willing to claim
#[derive(Clone, Copy)]
pub struct DomConversion {
    pub tag_name: &'static str,
    pub priority: u8,
    pub convert: DomImporter,
}

impl DomConversion {
    pub fn new(tag_name: &'static str, priority: u8, convert: DomImporter) -> Self {
        Self {
            tag_name,
            priority,
            convert,
        }
    }
}

impl fmt::Debug for DomConversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomConversion")
            .field("tag_name", &self.tag_name)
            .field("priority", &self.priority)
            .finish()
    }
}

/// Behavior table for one node kind
#[derive(Clone)]
pub struct NodeHandlers {
    pub tag: NodeTypeTag,
    pub inline: bool,
    pub factory: NodeFactory,
    pub import_json: JsonImporter,
    pub export_json: JsonExporter,
    pub import_dom: Vec<DomConversion>,
    pub export_dom: DomExporter,
}

impl fmt::Debug for NodeHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeHandlers")
            .field("tag", &self.tag)
            .field("inline", &self.inline)
            .field("import_dom", &self.import_dom)
            .finish()
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    node_type: NodeTypeTag,
    conversion: DomConversion,
}

#[derive(Debug, Default, Clone)]
pub struct Registry {
    handlers: HashMap<String, NodeHandlers>,
    order: Vec<NodeTypeTag>,
    dom_candidates: HashMap<&'static str, Vec<Candidate>>,
}

impl Registry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the image, tag, unknown-attachment and file kinds
    pub fn with_builtin_nodes() -> Self {
        Self::from_handlers(builtin_handlers()).expect("built-in node types are distinct")
    }

    /// Register every handler set in order; a repeated type is fatal
    pub fn from_handlers(handlers: impl IntoIterator<Item = NodeHandlers>) -> EditorResult<Self> {
        let mut registry = Self::new();
        for handlers in handlers {
            registry.register(handlers)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, handlers: NodeHandlers) -> EditorResult<()> {
        let key = handlers.tag.as_str().to_string();
        if self.handlers.contains_key(&key) {
            return Err(EditorError::DuplicateType(key));
        }

        for conversion in &handlers.import_dom {
            let candidates = self.dom_candidates.entry(conversion.tag_name).or_default();
            candidates.push(Candidate {
                node_type: handlers.tag.clone(),
                conversion: *conversion,
            });
            // Stable: equal priorities keep registration order
            candidates.sort_by(|a, b| b.conversion.priority.cmp(&a.conversion.priority));
        }

        tracing::debug!("registered node type '{}'", key);
        self.order.push(handlers.tag.clone());
        self.handlers.insert(key, handlers);
        Ok(())
    }

    pub fn resolve(&self, node_type: &str) -> EditorResult<&NodeHandlers> {
        self.handlers
            .get(node_type)
            .ok_or_else(|| EditorError::UnknownType(node_type.to_string()))
    }

    pub fn contains(&self, node_type: &str) -> bool {
        self.handlers.contains_key(node_type)
    }

    /// Registered tags in registration order
    pub fn node_types(&self) -> &[NodeTypeTag] {
        &self.order
    }

    /// Construct a node of `node_type` from loose attributes
    pub fn create(&self, node_type: &str, attributes: &Map<String, Value>) -> EditorResult<DecoratorNode> {
        (self.resolve(node_type)?.factory)(attributes)
    }

    /// Import a record through its registered handler
    pub fn import_json(&self, record: &SerializedNode) -> EditorResult<DecoratorNode> {
        (self.resolve(&record.node_type)?.import_json)(record)
    }

    /// Import a record, substituting an unknown-attachment for unregistered types.
    ///
    /// `UnsupportedVersion` and malformed records are still returned as errors.
    pub fn import_json_or_fallback(&self, record: &SerializedNode) -> EditorResult<DecoratorNode> {
        match self.import_json(record) {
            Err(err) if err.is_recoverable() => {
                tracing::warn!("{}; substituting unknown-attachment", err);
                Ok(unknown_attachment_for(record.string_attribute("src")))
            }
            other => other,
        }
    }

    pub fn export_json(&self, node: &DecoratorNode) -> EditorResult<SerializedNode> {
        Ok((self.resolve(node.node_type().as_str())?.export_json)(node))
    }

    pub fn export_dom(&self, node: &DecoratorNode) -> EditorResult<DomElement> {
        Ok((self.resolve(node.node_type().as_str())?.export_dom)(node))
    }

    /// Try every importer that claims this element's name, highest priority first.
    ///
    /// Elements tagged with an unregistered `data-node-type` are recovered
    /// into an unknown-attachment carrying their `data-src`.
    pub fn import_element(&self, element: &DomElement) -> Option<DecoratorNode> {
        if let Some(node_type) = element.attribute(NODE_TYPE_ATTRIBUTE) {
            if let Err(err) = self.resolve(node_type) {
                tracing::warn!("{} in pasted content; substituting unknown-attachment", err);
                return Some(unknown_attachment_for(element.attribute("data-src")));
            }
        }

        let candidates = self.dom_candidates.get(element.tag_name())?;
        candidates.iter().find_map(|candidate| {
            let node = (candidate.conversion.convert)(element)?;
            tracing::trace!(
                "<{}> claimed by '{}'",
                element.tag_name(),
                candidate.node_type
            );
            Some(node)
        })
    }

    /// Inline classification for a registered tag
    pub fn is_inline(&self, node_type: &str) -> EditorResult<bool> {
        Ok(self.resolve(node_type)?.inline)
    }
}

fn unknown_attachment_for(src: Option<&str>) -> DecoratorNode {
    DecoratorNode::UnknownAttachment(UnknownAttachmentNode::new(src.unwrap_or_default()))
}
