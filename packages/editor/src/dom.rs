//! # DOM fragments
//!
//! A small owned element tree used at the copy/paste and HTML export
//! boundary. Pasted HTML is parsed with `scraper` and converted into this
//! model so importers never hold borrows into the parser's tree.

use scraper::{ElementRef, Html};

/// Attribute naming the node type on elements produced by `export_dom`
pub const NODE_TYPE_ATTRIBUTE: &str = "data-node-type";

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomNode {
    Element(DomElement),
    Text(String),
}

impl DomNode {
    pub fn as_element(&self) -> Option<&DomElement> {
        match self {
            DomNode::Element(element) => Some(element),
            DomNode::Text(_) => None,
        }
    }
}

impl From<DomElement> for DomNode {
    fn from(element: DomElement) -> Self {
        DomNode::Element(element)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomElement {
    tag_name: String,
    attributes: Vec<(String, String)>,
    children: Vec<DomNode>,
}

impl DomElement {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into().to_ascii_lowercase(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_child(mut self, child: impl Into<DomNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(DomNode::Text(text.into()));
        self
    }

    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Set an attribute, replacing an existing value in place
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into().to_ascii_lowercase();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn children(&self) -> &[DomNode] {
        &self.children
    }

    pub fn push_child(&mut self, child: impl Into<DomNode>) {
        self.children.push(child.into());
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.tag_name.as_str())
    }

    /// Compact HTML for this element
    pub fn to_html(&self) -> String {
        let mut writer = HtmlWriter::new(HtmlOptions::compact());
        writer.write_element(self);
        writer.finish()
    }
}

fn collect_text(nodes: &[DomNode], out: &mut String) {
    for node in nodes {
        match node {
            DomNode::Text(text) => out.push_str(text),
            DomNode::Element(element) => collect_text(&element.children, out),
        }
    }
}

/// Options for HTML rendering
#[derive(Debug, Clone)]
pub struct HtmlOptions {
    /// Put each top-level node on its own line
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
}

impl HtmlOptions {
    pub fn compact() -> Self {
        Self {
            pretty: false,
            indent: String::new(),
        }
    }
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            indent: "  ".to_string(),
        }
    }
}

/// Render a sequence of nodes to HTML
pub fn render_html(nodes: &[DomNode], options: &HtmlOptions) -> String {
    let mut writer = HtmlWriter::new(options.clone());
    for node in nodes {
        writer.write_block(node);
    }
    writer.finish()
}

struct HtmlWriter {
    options: HtmlOptions,
    depth: usize,
    buffer: String,
}

impl HtmlWriter {
    fn new(options: HtmlOptions) -> Self {
        Self {
            options,
            depth: 0,
            buffer: String::new(),
        }
    }

    fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn add_indent(&mut self) {
        for _ in 0..self.depth {
            self.buffer.push_str(&self.options.indent);
        }
    }

    /// Block nodes get their own line in pretty mode; their children stay inline.
    fn write_block(&mut self, node: &DomNode) {
        if self.options.pretty {
            self.add_indent();
        }
        self.write_node(node);
        if self.options.pretty {
            self.add("\n");
        }
    }

    fn write_node(&mut self, node: &DomNode) {
        match node {
            DomNode::Text(text) => {
                let escaped = escape_text(text);
                self.add(&escaped);
            }
            DomNode::Element(element) => self.write_element(element),
        }
    }

    fn write_element(&mut self, element: &DomElement) {
        self.add("<");
        self.add(&element.tag_name);
        for (name, value) in &element.attributes {
            self.add(" ");
            self.add(name);
            self.add("=\"");
            let escaped = escape_attribute(value);
            self.add(&escaped);
            self.add("\"");
        }

        if element.is_void() {
            self.add(" />");
            return;
        }

        self.add(">");
        for child in &element.children {
            self.write_node(child);
        }
        self.add("</");
        self.add(&element.tag_name);
        self.add(">");
    }

    fn finish(self) -> String {
        self.buffer
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

/// Parse an HTML fragment (clipboard contents, exported notes) into owned nodes
pub fn parse_html_fragment(html: &str) -> Vec<DomNode> {
    let fragment = Html::parse_fragment(html);
    convert_children(fragment.root_element())
}

fn convert_children(parent: ElementRef<'_>) -> Vec<DomNode> {
    let mut nodes = Vec::new();
    for child in parent.children() {
        if let Some(element) = ElementRef::wrap(child) {
            nodes.push(DomNode::Element(convert_element(element)));
        } else if let Some(text) = child.value().as_text() {
            let text: &str = text;
            nodes.push(DomNode::Text(text.to_string()));
        }
    }
    nodes
}

fn convert_element(element: ElementRef<'_>) -> DomElement {
    let value = element.value();
    let mut out = DomElement::new(value.name());
    for (name, attribute) in value.attrs() {
        out.attributes.push((name.to_ascii_lowercase(), attribute.to_string()));
    }
    out.children = convert_children(element);
    out
}
