//! HTML → document import.
//!
//! Runs in two phases: [`import_dom`] turns a parsed DOM fragment into a
//! flat list of [`ImportedNode`]s, then [`insert_imported`] places them
//! through a transaction, one after the other.

use crate::dom::DomNode;
use crate::document::NodeKind;
use crate::insertion::InsertContext;
use crate::nodes::DecoratorNode;
use crate::registry::Registry;
use crate::transaction::Transaction;
use crate::{EditorResult, NodeKey};

/// Elements whose inline content becomes its own paragraph
const BLOCK_CONTAINERS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "li", "ul", "ol", "blockquote", "pre",
    "section", "article", "header", "footer", "main", "figure", "figcaption", "table", "tr",
    "td", "th",
];

/// Elements whose content is never text of the note
const SKIPPED: &[&str] = &["script", "style", "head", "title", "meta", "link", "template"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportedNode {
    /// Holds inline nodes only
    Paragraph(Vec<ImportedNode>),
    Text(String),
    Decorator(DecoratorNode),
}

impl ImportedNode {
    pub fn is_inline(&self) -> bool {
        match self {
            ImportedNode::Paragraph(_) => false,
            ImportedNode::Text(_) => true,
            ImportedNode::Decorator(node) => node.is_inline(),
        }
    }

    fn is_blank(&self) -> bool {
        matches!(self, ImportedNode::Text(text) if text.trim().is_empty())
    }
}

/// Convert a DOM fragment.
///
/// Elements claimed by the registry become decorators; block containers
/// group their inline content into paragraphs; any other element is
/// flattened into its children. A purely inline fragment stays inline so it
/// can be pasted at a caret.
pub fn import_dom(nodes: &[DomNode], registry: &Registry) -> Vec<ImportedNode> {
    let mut imported = Vec::new();
    for node in nodes {
        import_node(node, registry, &mut imported);
    }

    if imported.iter().all(ImportedNode::is_inline) {
        if imported.iter().all(ImportedNode::is_blank) {
            return Vec::new();
        }
        return imported;
    }
    group_inline(imported)
}

fn import_node(node: &DomNode, registry: &Registry, out: &mut Vec<ImportedNode>) {
    let element = match node {
        DomNode::Text(text) => {
            if !text.is_empty() {
                out.push(ImportedNode::Text(text.clone()));
            }
            return;
        }
        DomNode::Element(element) => element,
    };

    let tag_name = element.tag_name();
    if SKIPPED.contains(&tag_name) {
        return;
    }

    if let Some(decorator) = registry.import_element(element) {
        out.push(ImportedNode::Decorator(decorator));
        return;
    }

    if tag_name == "br" {
        out.push(ImportedNode::Text("\n".to_string()));
        return;
    }

    let mut children = Vec::new();
    for child in element.children() {
        import_node(child, registry, &mut children);
    }

    if BLOCK_CONTAINERS.contains(&tag_name) {
        let grouped = group_inline(children);
        if grouped.is_empty() && tag_name == "p" {
            out.push(ImportedNode::Paragraph(Vec::new()));
        } else {
            out.extend(grouped);
        }
    } else {
        out.extend(children);
    }
}

/// Collect runs of inline nodes into paragraphs; whitespace-only runs are
/// dropped.
fn group_inline(items: Vec<ImportedNode>) -> Vec<ImportedNode> {
    let mut grouped = Vec::new();
    let mut run: Vec<ImportedNode> = Vec::new();

    for item in items {
        if item.is_inline() {
            run.push(item);
            continue;
        }
        flush_run(&mut run, &mut grouped);
        grouped.push(item);
    }
    flush_run(&mut run, &mut grouped);
    grouped
}

fn flush_run(run: &mut Vec<ImportedNode>, grouped: &mut Vec<ImportedNode>) {
    if run.iter().all(ImportedNode::is_blank) {
        run.clear();
        return;
    }
    grouped.push(ImportedNode::Paragraph(std::mem::take(run)));
}

/// Insert imported nodes in order, starting at `context`.
///
/// Each node goes directly after the previous one. Returns the keys of the
/// top-level nodes that were created.
pub fn insert_imported(
    tx: &mut Transaction<'_>,
    items: Vec<ImportedNode>,
    context: InsertContext,
) -> EditorResult<Vec<NodeKey>> {
    let mut context = context;
    let mut keys = Vec::with_capacity(items.len());

    for item in items {
        let key = match item {
            ImportedNode::Text(text) => tx.insert(NodeKind::Text(text), &context)?,
            ImportedNode::Decorator(node) => tx.insert(NodeKind::Decorator(node), &context)?,
            ImportedNode::Paragraph(children) => {
                let paragraph = tx.insert(NodeKind::Paragraph, &context)?;
                let inner = InsertContext::caret(paragraph, 0).with_policy(context.policy);
                insert_imported(tx, children, inner)?;
                paragraph
            }
        };
        keys.push(key);
        context = context.after(tx.document(), key);
    }

    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html_fragment;
    use crate::nodes::{ImageNode, TagNode, UnknownAttachmentNode};

    fn import(html: &str) -> Vec<ImportedNode> {
        import_dom(&parse_html_fragment(html), &Registry::with_builtin_nodes())
    }

    #[test]
    fn test_paragraphs_and_images() {
        let imported = import(
            "<p>Hello <b>world</b></p>\n<img src=\"https://x/a.png\" alt=\"A\">\n<p>bye</p>",
        );
        assert_eq!(
            imported,
            vec![
                ImportedNode::Paragraph(vec![
                    ImportedNode::Text("Hello ".to_string()),
                    ImportedNode::Text("world".to_string()),
                ]),
                ImportedNode::Decorator(ImageNode::new("https://x/a.png", "A").into()),
                ImportedNode::Paragraph(vec![ImportedNode::Text("bye".to_string())]),
            ]
        );
    }

    #[test]
    fn test_inline_fragment_stays_inline() {
        let imported = import(
            "see <span data-node-type=\"tag\" data-tag=\"todo\">#todo</span> and <img src=\"file:///tmp/a.png\">",
        );
        assert_eq!(
            imported,
            vec![
                ImportedNode::Text("see ".to_string()),
                ImportedNode::Decorator(TagNode::new("todo").into()),
                ImportedNode::Text(" and ".to_string()),
                ImportedNode::Decorator(UnknownAttachmentNode::new("file:///tmp/a.png").into()),
            ]
        );
    }

    #[test]
    fn test_scripts_are_dropped() {
        let imported = import("<p>ok</p><script>alert(1)</script><style>p{}</style>");
        assert_eq!(
            imported,
            vec![ImportedNode::Paragraph(vec![ImportedNode::Text("ok".to_string())])]
        );
    }

    #[test]
    fn test_whitespace_only_is_empty() {
        assert!(import("  \n  ").is_empty());
    }

    #[test]
    fn test_block_inside_container_is_lifted() {
        let imported = import("<div>before<img src=\"https://x/a.png\">after</div>");
        assert_eq!(imported.len(), 3);
        assert!(matches!(imported[0], ImportedNode::Paragraph(_)));
        assert!(matches!(imported[1], ImportedNode::Decorator(_)));
        assert!(matches!(imported[2], ImportedNode::Paragraph(_)));
    }

    #[test]
    fn test_insert_imported_in_order() {
        let mut doc = crate::Document::new();
        let items = import("<p>one</p><img src=\"https://x/a.png\"><p>two</p>");
        let keys = {
            let mut tx = Transaction::new(&mut doc);
            insert_imported(&mut tx, items, InsertContext::append()).unwrap()
        };

        assert_eq!(keys.len(), 3);
        assert_eq!(doc.children(doc.root()), keys.as_slice());
        assert_eq!(doc.text_content(), "one\n\ntwo");
    }
}
