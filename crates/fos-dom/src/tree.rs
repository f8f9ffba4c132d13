//! DOM Tree (arena-based allocation)
//!
//! Detaching a node only unlinks it. `remove_subtree` frees the slots of a
//! detached subtree for reuse; each reuse bumps the slot's generation so
//! ids held from before resolve to nothing.

use crate::{DOMTokenList, DomError, DomResult, Node, NodeData, NodeId};

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena-based DOM tree
#[derive(Debug)]
pub struct DomTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(Node::document()),
            }],
            free: Vec::new(),
            live: 1,
        }
    }

    /// The document node
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::NotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> DomResult<&mut Node> {
        self.get_mut(id).ok_or(DomError::NotFound(id))
    }

    /// Number of live nodes (attached or not)
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId::new(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId::new(index, 0)
    }

    /// Detach `id` and free it together with every descendant.
    /// Nodes for which `keep` returns true are detached from the subtree
    /// first and survive, along with their own descendants.
    /// Freeing an unknown or already freed id is a no-op.
    pub fn remove_subtree_keeping(
        &mut self,
        id: NodeId,
        keep: impl Fn(NodeId) -> bool,
    ) -> DomResult<()> {
        if id == NodeId::ROOT {
            return Err(DomError::HierarchyRequest);
        }
        if self.get(id).is_none() {
            return Ok(());
        }
        if keep(id) {
            return self.detach(id);
        }
        self.detach(id)?;
        let mut doomed = vec![id];
        let mut stack = self.child_ids(id);
        while let Some(current) = stack.pop() {
            if keep(current) {
                self.detach(current)?;
                continue;
            }
            doomed.push(current);
            stack.extend(self.child_ids(current));
        }
        for node in doomed {
            self.release(node);
        }
        Ok(())
    }

    /// Detach and free `id` with its whole subtree
    pub fn remove_subtree(&mut self, id: NodeId) -> DomResult<()> {
        self.remove_subtree_keeping(id, |_| false)
    }

    fn release(&mut self, id: NodeId) {
        let Some(slot) = self.slots.get_mut(id.index as usize) else {
            return;
        };
        if slot.generation != id.generation || slot.node.take().is_none() {
            return;
        }
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Node::element(tag))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(Node::text(content.to_string()))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, content: &str) -> NodeId {
        self.push(Node::comment(content.to_string()))
    }

    /// Parent of a node, if attached
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|n| n.parent).filter(|p| p.is_valid())
    }

    /// Iterate over direct children
    pub fn children(&self, id: NodeId) -> Children<'_> {
        let next = self.get(id).map(|n| n.first_child).unwrap_or(NodeId::NONE);
        Children { tree: self, next }
    }

    /// Direct children IDs, collected so the tree can be mutated afterwards
    pub fn child_ids(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id).map(|(child, _)| child).collect()
    }

    /// All descendants of `id` in document (pre-)order, excluding `id`
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.child_ids(id).into_iter().rev().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            let children = self.child_ids(current);
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// Check whether `ancestor` is `node` or one of its ancestors
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Check whether a node is attached under the document node
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(NodeId::ROOT, id)
    }

    /// Unlink a node from its parent. Detaching a detached node is a no-op.
    pub fn detach(&mut self, id: NodeId) -> DomResult<()> {
        let (parent, prev, next) = {
            let node = self.node(id)?;
            (node.parent, node.prev_sibling, node.next_sibling)
        };
        if !parent.is_valid() {
            return Ok(());
        }

        if prev.is_valid() {
            self.node_mut(prev)?.next_sibling = next;
        } else {
            self.node_mut(parent)?.first_child = next;
        }
        if next.is_valid() {
            self.node_mut(next)?.prev_sibling = prev;
        } else {
            self.node_mut(parent)?.last_child = prev;
        }

        let node = self.node_mut(id)?;
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
        Ok(())
    }

    /// Insert `child` before `reference` (or at the end when `None`).
    /// The child is moved if it is already attached somewhere.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<NodeId> {
        self.node(parent)?;
        self.node(child)?;
        if child == NodeId::ROOT || self.contains(child, parent) {
            return Err(DomError::HierarchyRequest);
        }
        if matches!(self.node(parent)?.data, NodeData::Text(_) | NodeData::Comment(_)) {
            return Err(DomError::InvalidNodeType);
        }
        if let Some(reference) = reference {
            if reference == child {
                return Ok(child);
            }
            if self.parent(reference) != Some(parent) {
                return Err(DomError::NotAChild);
            }
        }

        self.detach(child)?;

        match reference {
            Some(reference) => {
                let prev = self.node(reference)?.prev_sibling;
                {
                    let node = self.node_mut(child)?;
                    node.parent = parent;
                    node.prev_sibling = prev;
                    node.next_sibling = reference;
                }
                self.node_mut(reference)?.prev_sibling = child;
                if prev.is_valid() {
                    self.node_mut(prev)?.next_sibling = child;
                } else {
                    self.node_mut(parent)?.first_child = child;
                }
            }
            None => {
                let last = self.node(parent)?.last_child;
                {
                    let node = self.node_mut(child)?;
                    node.parent = parent;
                    node.prev_sibling = last;
                    node.next_sibling = NodeId::NONE;
                }
                if last.is_valid() {
                    self.node_mut(last)?.next_sibling = child;
                } else {
                    self.node_mut(parent)?.first_child = child;
                }
                self.node_mut(parent)?.last_child = child;
            }
        }
        Ok(child)
    }

    /// Append a child node
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.insert_before(parent, child, None)
    }

    /// Insert a child as the first child
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        let first = self.node(parent)?.first_child;
        let reference = if first.is_valid() { Some(first) } else { None };
        self.insert_before(parent, child, reference)
    }

    /// Remove a child node
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        if self.parent(child) != Some(parent) {
            return Err(DomError::NotAChild);
        }
        self.detach(child)?;
        Ok(child)
    }

    /// Put `new` where `old` is and detach `old`.
    /// When `old` is detached only `new` is detached as well.
    pub fn replace_node(&mut self, old: NodeId, new: NodeId) -> DomResult<()> {
        if old == new {
            return Ok(());
        }
        match self.parent(old) {
            Some(parent) => {
                self.insert_before(parent, new, Some(old))?;
                self.detach(old)
            }
            None => self.detach(new),
        }
    }

    /// Detach every child, one node at a time. The children stay alive.
    pub fn clear_children(&mut self, id: NodeId) -> DomResult<()> {
        for child in self.child_ids(id) {
            self.detach(child)?;
        }
        Ok(())
    }

    /// Free every child subtree of `id`, sparing nodes `keep` selects
    pub fn remove_children_keeping(
        &mut self,
        id: NodeId,
        keep: impl Fn(NodeId) -> bool,
    ) -> DomResult<()> {
        for child in self.child_ids(id) {
            self.remove_subtree_keeping(child, &keep)?;
        }
        Ok(())
    }

    /// Lowercase tag name of an element
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.get(id)?.as_element().map(|e| e.tag.as_str())
    }

    /// Read an attribute
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id)?.as_element()?.get_attr(name)
    }

    /// Write an attribute
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        self.element_mut(id)?.set_attr(name, value);
        Ok(())
    }

    /// Remove an attribute
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> DomResult<Option<String>> {
        Ok(self.element_mut(id)?.remove_attr(name))
    }

    /// Class list of an element
    pub fn class_list(&self, id: NodeId) -> Option<&DOMTokenList> {
        self.get(id)?.as_element().map(|e| &e.classes)
    }

    /// Check an element for a class
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.class_list(id).is_some_and(|c| c.contains(class))
    }

    /// Add whitespace separated classes
    pub fn add_class(&mut self, id: NodeId, classes: &str) -> DomResult<()> {
        self.element_mut(id)?.add_class(classes);
        Ok(())
    }

    /// Remove whitespace separated classes
    pub fn remove_class(&mut self, id: NodeId, classes: &str) -> DomResult<()> {
        self.element_mut(id)?.remove_class(classes);
        Ok(())
    }

    fn element_mut(&mut self, id: NodeId) -> DomResult<&mut crate::ElementData> {
        self.node_mut(id)?
            .as_element_mut()
            .ok_or(DomError::InvalidNodeType)
    }

    /// Concatenated text of a node and its descendants
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.get(id).and_then(|n| n.as_text()) {
            return text.to_string();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|d| self.get(d).and_then(|n| n.as_text()))
            .collect()
    }

    /// Replace all children with a single text node (none for empty text).
    /// The old children are freed.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> DomResult<()> {
        if let Some(NodeData::Text(data)) = self.get_mut(id).map(|n| &mut n.data) {
            data.content = text.to_string();
            return Ok(());
        }
        for child in self.child_ids(id) {
            self.remove_subtree(child)?;
        }
        if !text.is_empty() {
            let text_node = self.create_text(text);
            self.append_child(id, text_node)?;
        }
        Ok(())
    }

    /// Element children only
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .filter(|(_, node)| node.is_element())
            .map(|(child, _)| child)
            .collect()
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the children of a node
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}
