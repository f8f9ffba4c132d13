//! HTML5 Parser implementation
//!
//! Uses html5ever's RcDom and converts the result into our arena tree.

use crate::ParseError;
use fos_dom::{DomTree, NodeId};
use html5ever::tendril::TendrilSink;
use html5ever::{ns, parse_fragment, LocalName, QualName};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

/// Context used when the caller has no element in mind. `template`
/// accepts any content, table rows and cells included.
pub const DEFAULT_CONTEXT: &str = "template";

/// HTML5 parser
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self
    }

    /// Parse markup as the content of a `context` element into detached
    /// nodes owned by `tree`.
    ///
    /// The returned IDs are the fragment's top-level nodes in source order.
    /// Text is kept verbatim, whitespace included.
    pub fn parse_fragment(
        &self,
        tree: &mut DomTree,
        markup: &str,
        context: &str,
    ) -> Result<Vec<NodeId>, ParseError> {
        let context = QualName::new(None, ns!(html), LocalName::from(context));
        let dom = parse_fragment(RcDom::default(), Default::default(), context, Vec::new(), false)
            .one(markup);

        // The fragment's nodes are the children of the synthetic <html> root.
        let mut top_level = Vec::new();
        for root in dom.document.children.borrow().iter() {
            if !is_element(root, "html") {
                continue;
            }
            for child in root.children.borrow().iter() {
                if let Some(id) = self.convert_node(child, tree)? {
                    top_level.push(id);
                }
            }
        }

        tracing::trace!("Parsed fragment into {} top-level nodes", top_level.len());
        Ok(top_level)
    }

    /// Convert an RcDom node (and its subtree) into a detached node
    fn convert_node(&self, handle: &Handle, tree: &mut DomTree) -> Result<Option<NodeId>, ParseError> {
        match &handle.data {
            RcNodeData::Text { contents } => Ok(Some(tree.create_text(&contents.borrow()))),
            RcNodeData::Comment { contents } => Ok(Some(tree.create_comment(contents))),
            RcNodeData::Element { name, attrs, .. } => {
                let id = tree.create_element(name.local.as_ref());
                for attr in attrs.borrow().iter() {
                    tree.set_attribute(id, attr.name.local.as_ref(), &attr.value)?;
                }
                for child in handle.children.borrow().iter() {
                    if let Some(child_id) = self.convert_node(child, tree)? {
                        tree.append_child(id, child_id)?;
                    }
                }
                Ok(Some(id))
            }
            RcNodeData::Document
            | RcNodeData::Doctype { .. }
            | RcNodeData::ProcessingInstruction { .. } => Ok(None),
        }
    }
}

fn is_element(handle: &Handle, tag: &str) -> bool {
    matches!(&handle.data, RcNodeData::Element { name, .. } if name.local.as_ref() == tag)
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(tree: &mut DomTree, markup: &str, context: &str) -> Vec<NodeId> {
        HtmlParser::new().parse_fragment(tree, markup, context).unwrap()
    }

    #[test]
    fn test_parse_single_root() {
        let mut tree = DomTree::new();
        let nodes = parse(&mut tree, "<div class=\"card\"><span>Text</span></div>", DEFAULT_CONTEXT);

        assert_eq!(nodes.len(), 1);
        assert_eq!(tree.tag_name(nodes[0]), Some("div"));
        assert!(tree.has_class(nodes[0], "card"));
        assert_eq!(tree.text_content(nodes[0]), "Text");
        // fragments come back detached
        assert_eq!(tree.parent(nodes[0]), None);
    }

    #[test]
    fn test_top_level_whitespace_is_kept() {
        let mut tree = DomTree::new();
        let nodes = parse(&mut tree, "  <p>a</p>\n  <p>b</p>  ", DEFAULT_CONTEXT);
        let elements: Vec<_> = nodes.iter().filter_map(|&n| tree.tag_name(n)).collect();
        assert_eq!(elements, vec!["p", "p"]);
        assert_eq!(nodes.len(), 5);
    }

    #[test]
    fn test_inline_spacing_survives() {
        let mut tree = DomTree::new();
        let nodes = parse(&mut tree, "<p><b>hello</b> <i>world</i></p>", DEFAULT_CONTEXT);
        assert_eq!(tree.text_content(nodes[0]), "hello world");
    }

    #[test]
    fn test_table_content_needs_no_table() {
        let mut tree = DomTree::new();
        let rows = parse(&mut tree, "<tr><td class=\"name\">a</td></tr>", DEFAULT_CONTEXT);
        assert_eq!(rows.len(), 1);
        assert_eq!(tree.tag_name(rows[0]), Some("tr"));
        assert_eq!(tree.element_children(rows[0]).len(), 1);

        let cells = parse(&mut tree, "<td>x</td><td>y</td>", "tr");
        assert_eq!(cells.len(), 2);
        assert!(cells.iter().all(|&c| tree.tag_name(c) == Some("td")));
    }

    #[test]
    fn test_body_context_drops_stray_rows() {
        let mut tree = DomTree::new();
        let nodes = parse(&mut tree, "<tr><td>a</td></tr>", "body");
        assert!(nodes.iter().all(|&n| tree.tag_name(n).is_none()));
        assert_eq!(tree.text_content(nodes[0]), "a");
    }
}
