//! Element resolution relative to a view root

use fos_dom::{DomTree, NodeId, Selector};

/// Targets for `selector` under `root`.
///
/// An empty selector resolves to the root itself, as does a selector the
/// root matches. Otherwise matching descendants are returned in document
/// order. Invalid selectors resolve to nothing.
pub fn resolve_by_selector(tree: &DomTree, root: NodeId, selector: &str) -> Vec<NodeId> {
    let selector = selector.trim();
    if selector.is_empty() {
        return vec![root];
    }
    let parsed = match Selector::parse(selector) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::warn!("ignoring selector '{}': {}", selector, err);
            return Vec::new();
        }
    };
    if parsed.matches(tree, root) {
        return vec![root];
    }
    tree.descendants(root)
        .into_iter()
        .filter(|&node| parsed.matches(tree, node))
        .collect()
}

/// First element under `root` whose `attribute` equals `role`, falling
/// back to the root itself
pub fn resolve_by_role(tree: &DomTree, root: NodeId, attribute: &str, role: &str) -> Option<NodeId> {
    tree.descendants(root)
        .into_iter()
        .find(|&node| tree.attribute(node, attribute) == Some(role))
        .or_else(|| (tree.attribute(root, attribute) == Some(role)).then_some(root))
}
