//! Attachment the editor could not classify
//!
//! Also the recovery target for unregistered node types and for `<img>`
//! elements pointing at local files.

use super::{file_name_of, DecoratorNode, NodeTypeTag};
use crate::codec::{decode_attributes, SerializedNode};
use crate::dom::{DomElement, NODE_TYPE_ATTRIBUTE};
use crate::registry::{DomConversion, NodeHandlers};
use crate::EditorResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub(crate) const SRC_ATTRIBUTE: &str = "data-src";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAttachmentNode {
    src: String,
}

impl UnknownAttachmentNode {
    pub fn new(src: impl Into<String>) -> Self {
        Self { src: src.into() }
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn file_name(&self) -> &str {
        file_name_of(&self.src)
    }

    pub fn export_json(&self) -> SerializedNode {
        SerializedNode::from_attributes(
            NodeTypeTag::UNKNOWN_ATTACHMENT.as_str(),
            &UnknownAttachmentAttributes {
                src: self.src.clone(),
            },
        )
    }

    pub fn export_dom(&self) -> DomElement {
        DomElement::new("span")
            .with_attribute(NODE_TYPE_ATTRIBUTE, NodeTypeTag::UNKNOWN_ATTACHMENT.as_str())
            .with_attribute(SRC_ATTRIBUTE, self.src.as_str())
            .with_text(self.file_name())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct UnknownAttachmentAttributes {
    #[serde(default)]
    src: String,
}

fn create(attributes: &Map<String, Value>) -> EditorResult<DecoratorNode> {
    let attributes: UnknownAttachmentAttributes = decode_attributes(attributes)?;
    Ok(DecoratorNode::UnknownAttachment(UnknownAttachmentNode::new(
        attributes.src,
    )))
}

fn import_json(record: &SerializedNode) -> EditorResult<DecoratorNode> {
    record.ensure_version()?;
    create(&record.attributes)
}

/// Low-priority `<img>` claim: whatever the image importer declined
fn import_img(element: &DomElement) -> Option<DecoratorNode> {
    let src = element.attribute("src")?;
    Some(DecoratorNode::UnknownAttachment(UnknownAttachmentNode::new(src)))
}

fn import_span(element: &DomElement) -> Option<DecoratorNode> {
    if element.attribute(NODE_TYPE_ATTRIBUTE) != Some(NodeTypeTag::UNKNOWN_ATTACHMENT.as_str()) {
        return None;
    }
    let src = element.attribute(SRC_ATTRIBUTE).unwrap_or_default();
    Some(DecoratorNode::UnknownAttachment(UnknownAttachmentNode::new(src)))
}

pub(super) fn handlers() -> NodeHandlers {
    NodeHandlers {
        tag: NodeTypeTag::UNKNOWN_ATTACHMENT,
        inline: true,
        factory: create,
        import_json,
        export_json: DecoratorNode::export_json,
        import_dom: vec![
            DomConversion::new("img", 0, import_img),
            DomConversion::new("span", 1, import_span),
        ],
        export_dom: DecoratorNode::export_dom,
    }
}
