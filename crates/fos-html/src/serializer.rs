//! Markup serialization for `DomTree` subtrees

use fos_dom::{DomTree, NodeData, NodeId};

/// Elements written without an end tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Elements whose text children are written verbatim
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Markup of the node's children
pub fn inner_html(tree: &DomTree, node: NodeId) -> String {
    let mut writer = Writer::new(tree);
    writer.children(node);
    writer.out
}

/// Markup of the node itself, children included
pub fn outer_html(tree: &DomTree, node: NodeId) -> String {
    let mut writer = Writer::new(tree);
    writer.node(node);
    writer.out
}

struct Writer<'a> {
    tree: &'a DomTree,
    out: String,
}

impl<'a> Writer<'a> {
    fn new(tree: &'a DomTree) -> Self {
        Self {
            tree,
            out: String::new(),
        }
    }

    fn node(&mut self, id: NodeId) {
        let Some(node) = self.tree.get(id) else {
            return;
        };
        match &node.data {
            NodeData::Document => self.children(id),
            NodeData::Text(text) => escape_into(&mut self.out, &text.content, false),
            NodeData::Comment(body) => {
                self.out.push_str("<!--");
                self.out.push_str(body);
                self.out.push_str("-->");
            }
            NodeData::Element(elem) => {
                let tag = elem.tag.as_str();
                self.out.push('<');
                self.out.push_str(tag);
                for attr in &elem.attrs {
                    self.out.push(' ');
                    self.out.push_str(&attr.name);
                    if attr.value.is_empty() {
                        continue;
                    }
                    self.out.push_str("=\"");
                    escape_into(&mut self.out, &attr.value, true);
                    self.out.push('"');
                }
                if VOID_ELEMENTS.contains(&tag) {
                    self.out.push_str(" />");
                    return;
                }
                self.out.push('>');
                if RAW_TEXT_ELEMENTS.contains(&tag) {
                    let raw: String = self
                        .tree
                        .children(id)
                        .filter_map(|(_, child)| child.as_text())
                        .collect();
                    self.out.push_str(&raw);
                } else {
                    self.children(id);
                }
                self.out.push_str("</");
                self.out.push_str(tag);
                self.out.push('>');
            }
        }
    }

    fn children(&mut self, parent: NodeId) {
        for child in self.tree.child_ids(parent) {
            self.node(child);
        }
    }
}

/// Escape `&`, `<` and `>`, plus `"` inside attribute values
fn escape_into(out: &mut String, text: &str, in_attribute: bool) {
    for c in text.chars() {
        let entity = match c {
            '&' => "&amp;",
            '<' => "&lt;",
            '>' => "&gt;",
            '"' if in_attribute => "&quot;",
            _ => {
                out.push(c);
                continue;
            }
        };
        out.push_str(entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quotes_escaped_only_in_attributes() {
        let mut text = String::new();
        let mut attr = String::new();
        escape_into(&mut text, r#"a < "b" & c"#, false);
        escape_into(&mut attr, r#"a < "b" & c"#, true);
        assert_eq!(text, r#"a &lt; "b" &amp; c"#);
        assert_eq!(attr, "a &lt; &quot;b&quot; &amp; c");
    }

    #[test]
    fn test_void_raw_text_and_comments() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        tree.set_attribute(div, "class", "a b").unwrap();
        tree.set_attribute(div, "hidden", "").unwrap();
        let img = tree.create_element("img");
        tree.set_attribute(img, "src", "x.png").unwrap();
        let text = tree.create_text("1 < 2");
        let script = tree.create_element("script");
        let code = tree.create_text("if (a < b) {}");
        tree.append_child(script, code).unwrap();
        for child in [img, text, script] {
            tree.append_child(div, child).unwrap();
        }

        assert_eq!(
            outer_html(&tree, div),
            r#"<div class="a b" hidden><img src="x.png" />1 &lt; 2<script>if (a < b) {}</script></div>"#
        );
        assert_eq!(inner_html(&tree, img), "");
    }
}
