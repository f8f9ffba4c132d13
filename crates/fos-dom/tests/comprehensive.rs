//! Comprehensive tests for fos-dom
//!
//! Tree manipulation and selector queries working together.

use fos_dom::{Document, DomTree, ElementQuery, NodeId};

fn build_list(tree: &mut DomTree, parent: NodeId, count: usize) -> Vec<NodeId> {
    (0..count)
        .map(|i| {
            let li = tree.create_element("li");
            tree.set_attribute(li, "data-index", &i.to_string()).unwrap();
            tree.append_child(parent, li).unwrap();
            li
        })
        .collect()
}

#[test]
fn test_dom_tree_creation() {
    let mut tree = DomTree::new();

    // div > span > text
    let div = tree.create_element("div");
    let span = tree.create_element("span");
    let text = tree.create_text("Hello, World!");

    tree.append_child(tree.root(), div).unwrap();
    tree.append_child(div, span).unwrap();
    tree.append_child(span, text).unwrap();

    assert_eq!(tree.len(), 4); // root + div + span + text

    let div_node = tree.get(div).unwrap();
    assert_eq!(div_node.parent, tree.root());
    assert_eq!(div_node.first_child, span);
    assert_eq!(tree.text_content(div), "Hello, World!");
}

#[test]
fn test_dom_tree_siblings() {
    let mut tree = DomTree::new();
    let ul = tree.create_element("ul");
    let items = build_list(&mut tree, ul, 3);

    let node1 = tree.get(items[0]).unwrap();
    assert_eq!(node1.next_sibling, items[1]);
    assert!(!node1.prev_sibling.is_valid());

    let node3 = tree.get(items[2]).unwrap();
    assert_eq!(node3.prev_sibling, items[1]);
    assert!(!node3.next_sibling.is_valid());
}

#[test]
fn test_detach_one_by_one_empties_parent() {
    let mut tree = DomTree::new();
    let ul = tree.create_element("ul");
    let items = build_list(&mut tree, ul, 5);

    tree.clear_children(ul).unwrap();
    assert!(tree.child_ids(ul).is_empty());
    assert!(items.iter().all(|&li| tree.parent(li).is_none()));

    // nodes survive detachment and can be re-attached
    tree.append_child(ul, items[3]).unwrap();
    assert_eq!(tree.child_ids(ul), vec![items[3]]);
}

#[test]
fn test_attribute_selector_queries() {
    let mut doc = Document::default();
    let body = doc.body();
    let tree = doc.tree_mut();
    let ul = tree.create_element("ul");
    tree.append_child(body, ul).unwrap();
    let items = build_list(tree, ul, 4);
    tree.set_attribute(items[2], "role", "selected").unwrap();

    assert_eq!(
        tree.query_selector(body, "[role=\"selected\"]").unwrap(),
        Some(items[2])
    );
    assert_eq!(
        tree.query_selector_all(body, "ul > li[data-index]").unwrap().len(),
        4
    );
    assert_eq!(tree.query_selector_all(body, "body li").unwrap().len(), 4);
}

#[test]
fn test_class_mutation_reflects_in_queries() {
    let mut tree = DomTree::new();
    let div = tree.create_element("div");
    let span = tree.create_element("span");
    tree.append_child(div, span).unwrap();

    tree.add_class(span, "active busy").unwrap();
    assert_eq!(tree.query_selector_all(div, ".active.busy").unwrap(), vec![span]);
    assert_eq!(tree.attribute(span, "class"), Some("active busy"));

    tree.remove_class(span, "busy").unwrap();
    assert!(tree.query_selector_all(div, ".busy").unwrap().is_empty());
    assert!(tree.has_class(span, "active"));
}

#[test]
fn test_text_node_rejects_children() {
    let mut tree = DomTree::new();
    let text = tree.create_text("x");
    let span = tree.create_element("span");
    assert!(tree.append_child(text, span).is_err());
    assert!(tree.add_class(text, "a").is_err());
}
