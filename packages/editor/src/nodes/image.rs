//! Image decorator
//!
//! Persisted dimensions follow the note format's long-standing convention:
//! `inherit` is written as `0` and `0` reads back as `inherit`.

use super::{DecoratorNode, NodeTypeTag};
use crate::codec::{decode_attributes, SerializedNode};
use crate::dom::DomElement;
use crate::registry::{DomConversion, NodeHandlers};
use crate::EditorResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

const LOCAL_FILE_SCHEME: &str = "file:///";

/// Width or height of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dimension {
    /// Size follows the image's intrinsic size
    #[default]
    Inherit,
    Pixels(u32),
}

impl Dimension {
    /// `px(0)` is `Inherit`
    pub fn px(px: u32) -> Self {
        Dimension::Pixels(px).normalized()
    }

    pub fn pixels(self) -> Option<u32> {
        match self {
            Dimension::Inherit => None,
            Dimension::Pixels(px) => Some(px),
        }
    }

    pub fn is_inherit(self) -> bool {
        self == Dimension::Inherit
    }

    /// `Pixels(0)` has no persisted form distinct from `Inherit`
    pub fn normalized(self) -> Self {
        match self {
            Dimension::Pixels(0) => Dimension::Inherit,
            other => other,
        }
    }

    /// Numeric value written to the persisted record
    pub fn to_persisted(self) -> u32 {
        self.pixels().unwrap_or(0)
    }

    /// Read a persisted number; zero, negative and non-finite values are `Inherit`
    pub fn from_persisted(value: f64) -> Self {
        if !value.is_finite() || value < 0.5 {
            return Dimension::Inherit;
        }
        Dimension::Pixels(value.round().min(u32::MAX as f64) as u32)
    }

    /// Parse an HTML dimension attribute such as `300` or `300px`
    fn from_attribute(value: &str) -> Self {
        let digits: String = value
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits
            .parse::<u32>()
            .map(Dimension::from)
            .unwrap_or(Dimension::Inherit)
    }
}

impl From<u32> for Dimension {
    fn from(px: u32) -> Self {
        Dimension::px(px)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Inherit => f.write_str("inherit"),
            Dimension::Pixels(px) => write!(f, "{}", px),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageNode {
    src: String,
    alt: String,
    width: Dimension,
    height: Dimension,
}

impl ImageNode {
    /// Create an image with inherited dimensions
    pub fn new(src: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            alt: alt.into(),
            width: Dimension::Inherit,
            height: Dimension::Inherit,
        }
    }

    pub fn with_size(mut self, width: Dimension, height: Dimension) -> Self {
        self.width = width.normalized();
        self.height = height.normalized();
        self
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn alt_text(&self) -> &str {
        &self.alt
    }

    pub fn width(&self) -> Dimension {
        self.width
    }

    pub fn height(&self) -> Dimension {
        self.height
    }

    /// Whether the source points at the local filesystem
    pub fn is_local_file(&self) -> bool {
        self.src.starts_with(LOCAL_FILE_SCHEME)
    }

    pub fn set_width_and_height(&mut self, width: Dimension, height: Dimension) {
        self.width = width.normalized();
        self.height = height.normalized();
    }

    pub fn set_alt_text(&mut self, alt: impl Into<String>) {
        self.alt = alt.into();
    }

    pub fn export_json(&self) -> SerializedNode {
        SerializedNode::from_attributes(
            NodeTypeTag::IMAGE.as_str(),
            &PersistedImage {
                src: self.src.clone(),
                alt: self.alt.clone(),
                width: self.width.to_persisted(),
                height: self.height.to_persisted(),
            },
        )
    }

    pub fn export_dom(&self) -> DomElement {
        let mut element = DomElement::new("img")
            .with_attribute("src", self.src.as_str())
            .with_attribute("alt", self.alt.as_str());
        if let Some(width) = self.width.pixels() {
            element.set_attribute("width", width.to_string());
        }
        if let Some(height) = self.height.pixels() {
            element.set_attribute("height", height.to_string());
        }
        element
    }
}

#[derive(Debug, Serialize)]
struct PersistedImage {
    src: String,
    alt: String,
    width: u32,
    height: u32,
}

/// A stored dimension: normally a number, but older notes may hold
/// `"inherit"` or a CSS-style `"300px"`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredDimension {
    Number(f64),
    Text(String),
}

impl From<StoredDimension> for Dimension {
    fn from(stored: StoredDimension) -> Self {
        match stored {
            StoredDimension::Number(value) => Dimension::from_persisted(value),
            StoredDimension::Text(value) => Dimension::from_attribute(&value),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ImageAttributes {
    #[serde(default)]
    src: String,
    #[serde(default)]
    alt: String,
    #[serde(default)]
    width: Option<StoredDimension>,
    #[serde(default)]
    height: Option<StoredDimension>,
}

fn create(attributes: &Map<String, Value>) -> EditorResult<DecoratorNode> {
    let attributes: ImageAttributes = decode_attributes(attributes)?;
    let dimension = |value: Option<StoredDimension>| value.map(Dimension::from).unwrap_or_default();
    Ok(DecoratorNode::Image(ImageNode {
        src: attributes.src,
        alt: attributes.alt,
        width: dimension(attributes.width),
        height: dimension(attributes.height),
    }))
}

fn import_json(record: &SerializedNode) -> EditorResult<DecoratorNode> {
    record.ensure_version()?;
    create(&record.attributes)
}

/// Claims `<img>` unless it references a local `file:///` path; those are
/// left for the unknown-attachment importer.
fn import_dom(element: &DomElement) -> Option<DecoratorNode> {
    let src = element.attribute("src").unwrap_or_default();
    if src.starts_with(LOCAL_FILE_SCHEME) {
        return None;
    }

    let width = element
        .attribute("width")
        .map(Dimension::from_attribute)
        .unwrap_or_default();
    let height = element
        .attribute("height")
        .map(Dimension::from_attribute)
        .unwrap_or_default();

    Some(DecoratorNode::Image(
        ImageNode::new(src, element.attribute("alt").unwrap_or_default()).with_size(width, height),
    ))
}

pub(super) fn handlers() -> NodeHandlers {
    NodeHandlers {
        tag: NodeTypeTag::IMAGE,
        inline: false,
        factory: create,
        import_json,
        export_json: DecoratorNode::export_json,
        import_dom: vec![DomConversion::new("img", 1, import_dom)],
        export_dom: DecoratorNode::export_dom,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn record(value: Value) -> SerializedNode {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_defaults_to_inherit() {
        let image = ImageNode::new("https://x/y.png", "cat");
        assert_eq!(image.width(), Dimension::Inherit);
        assert_eq!(image.height(), Dimension::Inherit);
    }

    #[test]
    fn test_inherit_exports_as_zero() {
        let image = ImageNode::new("https://x/y.png", "cat").with_size(Dimension::px(300), Dimension::Inherit);
        let exported = serde_json::to_value(image.export_json()).unwrap();
        assert_eq!(
            exported,
            json!({
                "type": "image",
                "version": 1,
                "src": "https://x/y.png",
                "alt": "cat",
                "width": 300,
                "height": 0
            })
        );
    }

    #[test]
    fn test_zero_imports_as_inherit() {
        let node = import_json(&record(json!({
            "type": "image",
            "version": 1,
            "src": "https://x/y.png",
            "alt": "cat",
            "width": 300,
            "height": 0
        })))
        .unwrap();

        let image = node.as_image().unwrap();
        assert_eq!(image.src(), "https://x/y.png");
        assert_eq!(image.alt_text(), "cat");
        assert_eq!(image.width(), Dimension::Pixels(300));
        assert_eq!(image.height(), Dimension::Inherit);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let node = import_json(&record(json!({"type": "image", "version": 1}))).unwrap();
        assert_eq!(node, DecoratorNode::Image(ImageNode::new("", "")));
    }

    #[test]
    fn test_fractional_dimensions_round() {
        let node = import_json(&record(json!({
            "type": "image", "version": 1, "src": "a.png", "width": 199.6, "height": -3
        })))
        .unwrap();
        let image = node.as_image().unwrap();
        assert_eq!(image.width(), Dimension::Pixels(200));
        assert_eq!(image.height(), Dimension::Inherit);
    }

    #[test]
    fn test_inherit_keyword_is_accepted() {
        let node = import_json(&record(json!({
            "type": "image", "version": 1, "src": "a.png", "width": "inherit", "height": "240px"
        })))
        .unwrap();
        let image = node.as_image().unwrap();
        assert_eq!(image.width(), Dimension::Inherit);
        assert_eq!(image.height(), Dimension::Pixels(240));
    }

    #[test]
    fn test_unsupported_version() {
        let result = import_json(&record(json!({"type": "image", "version": 2, "src": "a.png"})));
        assert!(matches!(
            result,
            Err(crate::EditorError::UnsupportedVersion { version: 2, .. })
        ));
    }

    #[test]
    fn test_wrong_attribute_type_is_invalid_record() {
        let result = import_json(&record(json!({"type": "image", "version": 1, "src": 5})));
        assert!(matches!(result, Err(crate::EditorError::InvalidRecord(_))));
    }

    #[test]
    fn test_round_trip() {
        let cases = [
            ImageNode::new("https://x/y.png", "cat"),
            ImageNode::new("https://x/y.png", "").with_size(Dimension::px(640), Dimension::px(480)),
            ImageNode::new("asset://notes/a.jpg", "a").with_size(Dimension::Inherit, Dimension::px(20)),
            ImageNode::new("https://x/z.png", "zero").with_size(Dimension::px(0), Dimension::Pixels(0)),
        ];
        for image in cases {
            let node = DecoratorNode::Image(image);
            assert_eq!(import_json(&node.export_json()).unwrap(), node);
        }
    }

    fn dimension() -> impl Strategy<Value = Dimension> {
        prop_oneof![
            Just(Dimension::Inherit),
            Just(Dimension::Pixels(0)),
            Just(Dimension::Pixels(u32::MAX)),
            any::<u32>().prop_map(Dimension::Pixels),
        ]
    }

    proptest! {
        #[test]
        fn prop_round_trip(src in ".*", alt in ".*", width in dimension(), height in dimension()) {
            let node = DecoratorNode::Image(ImageNode::new(src, alt).with_size(width, height));
            prop_assert_eq!(import_json(&node.export_json()).unwrap(), node);
        }
    }

    #[test]
    fn test_set_width_and_height_normalizes_zero() {
        let mut image = ImageNode::new("a.png", "");
        image.set_width_and_height(Dimension::px(120), Dimension::Pixels(0));
        assert_eq!(image.width(), Dimension::Pixels(120));
        assert_eq!(image.height(), Dimension::Inherit);
    }

    #[test]
    fn test_dom_rejects_local_files() {
        let element = DomElement::new("img").with_attribute("src", "file:///Users/x/photo.png");
        assert_eq!(import_dom(&element), None);
    }

    #[test]
    fn test_dom_import() {
        let element = DomElement::new("img")
            .with_attribute("src", "https://x/y.png")
            .with_attribute("alt", "cat")
            .with_attribute("width", "300px");
        let node = import_dom(&element).unwrap();
        let image = node.as_image().unwrap();
        assert_eq!(image.width(), Dimension::Pixels(300));
        assert_eq!(image.height(), Dimension::Inherit);
    }

    #[test]
    fn test_dom_export_omits_inherit() {
        let image = ImageNode::new("https://x/y.png", "cat").with_size(Dimension::px(300), Dimension::Inherit);
        assert_eq!(
            image.export_dom().to_html(),
            "<img src=\"https://x/y.png\" alt=\"cat\" width=\"300\" />"
        );
        assert_eq!(import_dom(&image.export_dom()), Some(DecoratorNode::Image(image)));
    }

    #[test]
    fn test_dimension_display() {
        assert_eq!(Dimension::Inherit.to_string(), "inherit");
        assert_eq!(Dimension::px(12).to_string(), "12");
    }
}
