//! Element Query and Methods
//!
//! querySelector, querySelectorAll, closest, matches.

use crate::{DomResult, DomTree, NodeId, Selector};

/// Element query trait
pub trait ElementQuery {
    /// Query first descendant of `root` matching a CSS selector
    fn query_selector(&self, root: NodeId, selector: &str) -> DomResult<Option<NodeId>>;

    /// Query all descendants of `root` matching a CSS selector, in document order
    fn query_selector_all(&self, root: NodeId, selector: &str) -> DomResult<Vec<NodeId>>;

    /// Find closest inclusive ancestor matching selector
    fn closest(&self, element: NodeId, selector: &str) -> DomResult<Option<NodeId>>;

    /// Check if element matches selector
    fn matches(&self, element: NodeId, selector: &str) -> DomResult<bool>;
}

impl ElementQuery for DomTree {
    fn query_selector(&self, root: NodeId, selector: &str) -> DomResult<Option<NodeId>> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .descendants(root)
            .into_iter()
            .find(|&node| selector.matches(self, node)))
    }

    fn query_selector_all(&self, root: NodeId, selector: &str) -> DomResult<Vec<NodeId>> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .descendants(root)
            .into_iter()
            .filter(|&node| selector.matches(self, node))
            .collect())
    }

    fn closest(&self, element: NodeId, selector: &str) -> DomResult<Option<NodeId>> {
        let selector = Selector::parse(selector)?;
        let mut current = Some(element);
        while let Some(node) = current {
            if selector.matches(self, node) {
                return Ok(Some(node));
            }
            current = self.parent(node);
        }
        Ok(None)
    }

    fn matches(&self, element: NodeId, selector: &str) -> DomResult<bool> {
        Ok(Selector::parse(selector)?.matches(self, element))
    }
}
