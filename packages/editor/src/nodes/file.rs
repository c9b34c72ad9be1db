//! Block-level file attachment

use super::{file_name_of, DecoratorNode, NodeTypeTag};
use super::unknown_attachment::SRC_ATTRIBUTE;
use crate::codec::{decode_attributes, SerializedNode};
use crate::dom::{DomElement, NODE_TYPE_ATTRIBUTE};
use crate::registry::{DomConversion, NodeHandlers};
use crate::EditorResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    src: String,
}

impl FileNode {
    pub fn new(src: impl Into<String>) -> Self {
        Self { src: src.into() }
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn file_name(&self) -> &str {
        file_name_of(&self.src)
    }

    /// Lowercased extension, if the file name has one
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name();
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
                Some(ext.to_ascii_lowercase())
            }
            _ => None,
        }
    }

    pub fn export_json(&self) -> SerializedNode {
        SerializedNode::from_attributes(
            NodeTypeTag::FILE.as_str(),
            &FileAttributes {
                src: self.src.clone(),
            },
        )
    }

    pub fn export_dom(&self) -> DomElement {
        DomElement::new("div")
            .with_attribute(NODE_TYPE_ATTRIBUTE, NodeTypeTag::FILE.as_str())
            .with_attribute(SRC_ATTRIBUTE, self.src.as_str())
            .with_child(
                DomElement::new("a")
                    .with_attribute("href", self.src.as_str())
                    .with_text(self.file_name()),
            )
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct FileAttributes {
    #[serde(default)]
    src: String,
}

fn create(attributes: &Map<String, Value>) -> EditorResult<DecoratorNode> {
    let attributes: FileAttributes = decode_attributes(attributes)?;
    Ok(DecoratorNode::File(FileNode::new(attributes.src)))
}

fn import_json(record: &SerializedNode) -> EditorResult<DecoratorNode> {
    record.ensure_version()?;
    create(&record.attributes)
}

fn import_dom(element: &DomElement) -> Option<DecoratorNode> {
    if element.attribute(NODE_TYPE_ATTRIBUTE) != Some(NodeTypeTag::FILE.as_str()) {
        return None;
    }
    let src = element.attribute(SRC_ATTRIBUTE).unwrap_or_default();
    Some(DecoratorNode::File(FileNode::new(src)))
}

pub(super) fn handlers() -> NodeHandlers {
    NodeHandlers {
        tag: NodeTypeTag::FILE,
        inline: false,
        factory: create,
        import_json,
        export_json: DecoratorNode::export_json,
        import_dom: vec![DomConversion::new("div", 1, import_dom)],
        export_dom: DecoratorNode::export_dom,
    }
}
