//! Host document
//!
//! A `DomTree` pre-populated with `<html><head></head><body></body></html>`.
//! Views render into detached nodes of the same tree and are attached
//! under `body` (or a descendant) when mounted.

use crate::{DomTree, ElementQuery, NodeId};

#[derive(Debug)]
pub struct Document {
    tree: DomTree,
    url: String,
    skeleton: [NodeId; 3],
}

impl Document {
    pub fn new(url: &str) -> Self {
        let mut tree = DomTree::new();
        let skeleton = ["html", "head", "body"].map(|tag| tree.create_element(tag));
        let [html, head, body] = skeleton;

        // Fresh nodes under a fresh root cannot violate the hierarchy.
        let _ = tree.append_child(tree.root(), html);
        let _ = tree.append_child(html, head);
        let _ = tree.append_child(html, body);

        Self {
            tree,
            url: url.to_owned(),
            skeleton,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The `<html>` element
    pub fn document_element(&self) -> NodeId {
        self.skeleton[0]
    }

    pub fn head(&self) -> NodeId {
        self.skeleton[1]
    }

    pub fn body(&self) -> NodeId {
        self.skeleton[2]
    }

    /// First connected element whose `id` attribute equals `id`
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let root = self.tree.root();
        self.tree
            .descendants(root)
            .into_iter()
            .find(|&node| self.tree.attribute(node, "id") == Some(id))
    }

    /// First element in the document matching `selector`. Invalid selectors
    /// match nothing.
    pub fn query_selector(&self, selector: &str) -> Option<NodeId> {
        self.tree
            .query_selector(self.tree.root(), selector)
            .unwrap_or_else(|err| {
                tracing::warn!("Document query failed: {}", err);
                None
            })
    }

    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}
