//! Inline tag reference (`#economics`)
//!
//! The stored value never carries the leading `#`; [`TagNode::query`] adds
//! it back for consumers that search by tag.

use super::{DecoratorNode, NodeTypeTag};
use crate::codec::{decode_attributes, SerializedNode};
use crate::dom::{DomElement, NODE_TYPE_ATTRIBUTE};
use crate::registry::{DomConversion, NodeHandlers};
use crate::EditorResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const TAG_ATTRIBUTE: &str = "data-tag";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagNode {
    tag: String,
}

impl TagNode {
    /// Empty tags are accepted; leading `#`s are dropped.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: strip_hash(tag.into()),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The `#`-prefixed form used in search queries
    pub fn query(&self) -> String {
        format!("#{}", self.tag)
    }

    pub fn is_empty(&self) -> bool {
        self.tag.is_empty()
    }

    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.tag = strip_hash(tag.into());
    }

    pub fn export_json(&self) -> SerializedNode {
        SerializedNode::from_attributes(
            NodeTypeTag::TAG.as_str(),
            &TagAttributes {
                tag: self.tag.clone(),
            },
        )
    }

    pub fn export_dom(&self) -> DomElement {
        DomElement::new("span")
            .with_attribute(NODE_TYPE_ATTRIBUTE, NodeTypeTag::TAG.as_str())
            .with_attribute(TAG_ATTRIBUTE, self.tag.as_str())
            .with_text(self.query())
    }
}

fn strip_hash(tag: String) -> String {
    match tag.strip_prefix('#') {
        Some(rest) => rest.trim_start_matches('#').to_string(),
        None => tag,
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TagAttributes {
    #[serde(default)]
    tag: String,
}

fn create(attributes: &Map<String, Value>) -> EditorResult<DecoratorNode> {
    let attributes: TagAttributes = decode_attributes(attributes)?;
    Ok(DecoratorNode::Tag(TagNode::new(attributes.tag)))
}

fn import_json(record: &SerializedNode) -> EditorResult<DecoratorNode> {
    record.ensure_version()?;
    create(&record.attributes)
}

fn import_dom(element: &DomElement) -> Option<DecoratorNode> {
    if element.attribute(NODE_TYPE_ATTRIBUTE) != Some(NodeTypeTag::TAG.as_str()) {
        return None;
    }
    let tag = match element.attribute(TAG_ATTRIBUTE) {
        Some(tag) => tag.to_string(),
        None => element.text_content().trim().to_string(),
    };
    Some(DecoratorNode::Tag(TagNode::new(tag)))
}

pub(super) fn handlers() -> NodeHandlers {
    NodeHandlers {
        tag: NodeTypeTag::TAG,
        inline: true,
        factory: create,
        import_json,
        export_json: DecoratorNode::export_json,
        import_dom: vec![DomConversion::new("span", 1, import_dom)],
        export_dom: DecoratorNode::export_dom,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_leading_hash_is_not_stored() {
        let tag = TagNode::new("#economics");
        assert_eq!(tag.tag(), "economics");
        assert_eq!(tag.query(), "#economics");
    }

    #[test]
    fn test_repeated_hashes_are_stripped() {
        assert_eq!(TagNode::new("##x").tag(), "x");
        assert_eq!(TagNode::new("x#y").tag(), "x#y");
    }

    #[test]
    fn test_empty_tag_is_accepted() {
        let tag = TagNode::new("");
        assert!(tag.is_empty());
        let exported = serde_json::to_value(tag.export_json()).unwrap();
        assert_eq!(exported, json!({"type": "tag", "version": 1, "tag": ""}));
    }

    #[test]
    fn test_round_trip() {
        for name in ["economics", "", "with space", "naïve"] {
            let node = DecoratorNode::Tag(TagNode::new(name));
            assert_eq!(import_json(&node.export_json()).unwrap(), node);
        }
    }

    proptest! {
        #[test]
        fn prop_round_trip(hashes in 0usize..3, name in ".*") {
            let node = DecoratorNode::Tag(TagNode::new(format!("{}{}", "#".repeat(hashes), name)));
            prop_assert_eq!(import_json(&node.export_json()).unwrap(), node);
        }
    }

    #[test]
    fn test_dom_round_trip() {
        let tag = TagNode::new("economics");
        let element = tag.export_dom();
        assert_eq!(
            element.to_html(),
            "<span data-node-type=\"tag\" data-tag=\"economics\">#economics</span>"
        );
        assert_eq!(import_dom(&element), Some(DecoratorNode::Tag(tag)));
    }

    #[test]
    fn test_dom_falls_back_to_text() {
        let element = DomElement::new("span")
            .with_attribute(NODE_TYPE_ATTRIBUTE, "tag")
            .with_text(" #reading ");
        assert_eq!(
            import_dom(&element),
            Some(DecoratorNode::Tag(TagNode::new("reading")))
        );
    }

    #[test]
    fn test_plain_span_is_declined() {
        let element = DomElement::new("span").with_text("#not-a-tag");
        assert_eq!(import_dom(&element), None);
    }
}
