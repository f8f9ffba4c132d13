//! Events dispatched through the tree by delegation

use crate::{DomTree, NodeId};

/// An event travelling from its target towards the document node
#[derive(Debug, Clone)]
pub struct DomEvent {
    /// Event type name (`click`, `input`, ...)
    pub event_type: String,
    /// Node the event was dispatched at
    pub target: NodeId,
    /// Node whose handler is currently running
    pub current_target: Option<NodeId>,
    pub bubbles: bool,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl DomEvent {
    /// Create a bubbling event
    pub fn new(event_type: &str, target: NodeId) -> Self {
        Self {
            event_type: event_type.to_owned(),
            target,
            current_target: None,
            bubbles: true,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Handlers on nodes further up the path are skipped
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// Bubbling path of an event: target first, document node last
pub fn event_path(tree: &DomTree, target: NodeId) -> Vec<NodeId> {
    let mut path = Vec::new();
    let mut current = tree.get(target).map(|_| target);
    while let Some(node) = current {
        path.push(node);
        current = tree.parent(node);
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_flags() {
        let mut event = DomEvent::new("click", NodeId::new(5, 0));
        assert!(event.bubbles);
        assert!(!event.is_propagation_stopped());

        event.stop_propagation();
        event.prevent_default();
        assert!(event.is_propagation_stopped());
        assert!(event.is_default_prevented());
    }

    #[test]
    fn test_event_path() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let span = tree.create_element("span");
        tree.append_child(tree.root(), div).unwrap();
        tree.append_child(div, span).unwrap();

        assert_eq!(event_path(&tree, span), vec![span, div, tree.root()]);
        assert!(event_path(&tree, NodeId::NONE).is_empty());
    }
}
