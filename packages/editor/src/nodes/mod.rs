//! # Decorator Nodes
//!
//! Node kinds whose visual representation is produced by the host UI
//! rather than by the tree's own text rendering.
//!
//! The set is closed: every decorator is one variant of [`DecoratorNode`],
//! and per-kind behavior (construction, JSON and DOM conversion) lives in
//! the [`Registry`](crate::Registry) table built from each kind's
//! `handlers()`.
//!
//! | type                 | placement | attributes                 |
//! |----------------------|-----------|----------------------------|
//! | `image`              | block     | src, alt, width, height    |
//! | `tag`                | inline    | tag                        |
//! | `unknown-attachment` | inline    | src                        |
//! | `file`               | block     | src                        |

mod file;
mod image;
mod tag;
mod unknown_attachment;

pub use file::FileNode;
pub use image::{Dimension, ImageNode};
pub use tag::TagNode;
pub use unknown_attachment::UnknownAttachmentNode;

use crate::codec::SerializedNode;
use crate::dom::DomElement;
use crate::registry::NodeHandlers;
use std::borrow::Cow;
use std::fmt;

/// Stable string discriminator of a node kind
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeTypeTag(Cow<'static, str>);

impl NodeTypeTag {
    pub const IMAGE: NodeTypeTag = NodeTypeTag(Cow::Borrowed("image"));
    pub const TAG: NodeTypeTag = NodeTypeTag(Cow::Borrowed("tag"));
    pub const UNKNOWN_ATTACHMENT: NodeTypeTag = NodeTypeTag(Cow::Borrowed("unknown-attachment"));
    pub const FILE: NodeTypeTag = NodeTypeTag(Cow::Borrowed("file"));

    pub fn new(tag: impl Into<String>) -> Self {
        Self(Cow::Owned(tag.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeTypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeTypeTag {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl PartialEq<str> for NodeTypeTag {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for NodeTypeTag {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// A decorator node instance
///
/// Equality is attribute equality; the node's [`NodeKey`](crate::NodeKey)
/// lives in the document tree, not in the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecoratorNode {
    Image(ImageNode),
    Tag(TagNode),
    UnknownAttachment(UnknownAttachmentNode),
    File(FileNode),
}

impl DecoratorNode {
    pub fn node_type(&self) -> NodeTypeTag {
        match self {
            DecoratorNode::Image(_) => NodeTypeTag::IMAGE,
            DecoratorNode::Tag(_) => NodeTypeTag::TAG,
            DecoratorNode::UnknownAttachment(_) => NodeTypeTag::UNKNOWN_ATTACHMENT,
            DecoratorNode::File(_) => NodeTypeTag::FILE,
        }
    }

    /// Inline nodes live inside paragraphs; block nodes sit directly under the root.
    pub fn is_inline(&self) -> bool {
        is_inline_type(self.node_type().as_str())
    }

    pub fn export_json(&self) -> SerializedNode {
        match self {
            DecoratorNode::Image(node) => node.export_json(),
            DecoratorNode::Tag(node) => node.export_json(),
            DecoratorNode::UnknownAttachment(node) => node.export_json(),
            DecoratorNode::File(node) => node.export_json(),
        }
    }

    pub fn export_dom(&self) -> DomElement {
        match self {
            DecoratorNode::Image(node) => node.export_dom(),
            DecoratorNode::Tag(node) => node.export_dom(),
            DecoratorNode::UnknownAttachment(node) => node.export_dom(),
            DecoratorNode::File(node) => node.export_dom(),
        }
    }

    /// Plain-text stand-in used for text extraction
    pub fn text_content(&self) -> String {
        match self {
            DecoratorNode::Image(node) => node.alt_text().to_string(),
            DecoratorNode::Tag(node) => node.query(),
            DecoratorNode::UnknownAttachment(node) => node.file_name().to_string(),
            DecoratorNode::File(node) => node.file_name().to_string(),
        }
    }

    pub fn as_image(&self) -> Option<&ImageNode> {
        match self {
            DecoratorNode::Image(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_image_mut(&mut self) -> Option<&mut ImageNode> {
        match self {
            DecoratorNode::Image(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_tag(&self) -> Option<&TagNode> {
        match self {
            DecoratorNode::Tag(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_tag_mut(&mut self) -> Option<&mut TagNode> {
        match self {
            DecoratorNode::Tag(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_unknown_attachment(&self) -> Option<&UnknownAttachmentNode> {
        match self {
            DecoratorNode::UnknownAttachment(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileNode> {
        match self {
            DecoratorNode::File(node) => Some(node),
            _ => None,
        }
    }
}

impl From<ImageNode> for DecoratorNode {
    fn from(node: ImageNode) -> Self {
        DecoratorNode::Image(node)
    }
}

impl From<TagNode> for DecoratorNode {
    fn from(node: TagNode) -> Self {
        DecoratorNode::Tag(node)
    }
}

impl From<UnknownAttachmentNode> for DecoratorNode {
    fn from(node: UnknownAttachmentNode) -> Self {
        DecoratorNode::UnknownAttachment(node)
    }
}

impl From<FileNode> for DecoratorNode {
    fn from(node: FileNode) -> Self {
        DecoratorNode::File(node)
    }
}

/// Static inline/block classification of the built-in types
pub fn is_inline_type(node_type: &str) -> bool {
    matches!(node_type, "tag" | "unknown-attachment")
}

/// Handlers for every built-in decorator kind, in registration order
pub fn builtin_handlers() -> Vec<NodeHandlers> {
    vec![
        image::handlers(),
        tag::handlers(),
        unknown_attachment::handlers(),
        file::handlers(),
    ]
}

/// Last path segment of a URL or file path, ignoring query and fragment
pub(crate) fn file_name_of(src: &str) -> &str {
    let path = src.split(['?', '#']).next().unwrap_or(src);
    let path = path.trim_end_matches(['/', '\\']);
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
