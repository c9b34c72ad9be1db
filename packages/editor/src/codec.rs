//! # Serialization Codec
//!
//! Versioned JSON records for every node in a note.
//!
//! ```text
//! { "type": "image", "version": 1, "src": "...", "alt": "...", "width": 300, "height": 0 }
//! ```
//!
//! Decorator nodes serialize themselves through their registry handlers;
//! this module owns the shared record shape, the version gate and the
//! structural `paragraph` / `text` records used by the persisted document.

use crate::{EditorError, EditorResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Version written by every node type in this release
pub const CURRENT_VERSION: u64 = 1;

pub const PARAGRAPH_TYPE: &str = "paragraph";
pub const TEXT_TYPE: &str = "text";

/// `{ type, version, ...attributes }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedNode {
    #[serde(rename = "type")]
    pub node_type: String,

    pub version: u64,

    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl SerializedNode {
    pub fn new(node_type: impl Into<String>, attributes: Map<String, Value>) -> Self {
        Self {
            node_type: node_type.into(),
            version: CURRENT_VERSION,
            attributes,
        }
    }

    /// Build a record from a typed attribute struct
    pub fn from_attributes<T: Serialize>(node_type: &str, attributes: &T) -> Self {
        let attributes = match serde_json::to_value(attributes) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        Self::new(node_type, attributes)
    }

    /// Decode the attribute map into a typed attribute struct
    pub fn attributes_as<T: DeserializeOwned>(&self) -> EditorResult<T> {
        decode_attributes(&self.attributes)
    }

    /// Fail with `UnsupportedVersion` unless the record is at the current version
    pub fn ensure_version(&self) -> EditorResult<()> {
        if self.version != CURRENT_VERSION {
            return Err(EditorError::UnsupportedVersion {
                node_type: self.node_type.clone(),
                version: self.version,
            });
        }
        Ok(())
    }

    /// Read a string attribute, if present and a string
    pub fn string_attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }

    /// Child records of a structural node
    pub fn children(&self) -> EditorResult<Vec<SerializedNode>> {
        match self.attributes.get("children") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(value) => serde_json::from_value(value.clone()).map_err(|e| {
                EditorError::InvalidRecord(format!(
                    "children of '{}': {}",
                    self.node_type, e
                ))
            }),
        }
    }
}

pub(crate) fn decode_attributes<T: DeserializeOwned>(attributes: &Map<String, Value>) -> EditorResult<T> {
    serde_json::from_value(Value::Object(attributes.clone()))
        .map_err(|e| EditorError::InvalidRecord(e.to_string()))
}

#[derive(Debug, Serialize, Deserialize)]
struct TextAttributes {
    #[serde(default)]
    text: String,
}

pub(crate) fn text_record(text: &str) -> SerializedNode {
    SerializedNode::from_attributes(
        TEXT_TYPE,
        &TextAttributes {
            text: text.to_string(),
        },
    )
}

pub(crate) fn paragraph_record(children: Vec<SerializedNode>) -> SerializedNode {
    let children = children
        .into_iter()
        .filter_map(|child| serde_json::to_value(child).ok())
        .collect();
    let mut attributes = Map::new();
    attributes.insert("children".to_string(), Value::Array(children));
    SerializedNode::new(PARAGRAPH_TYPE, attributes)
}

pub(crate) fn read_text(record: &SerializedNode) -> EditorResult<String> {
    record.ensure_version()?;
    let attributes: TextAttributes = record.attributes_as()?;
    Ok(attributes.text)
}

/// Parse a persisted document: a JSON array of block records
pub fn parse_records(json: &str) -> EditorResult<Vec<SerializedNode>> {
    Ok(serde_json::from_str(json)?)
}
