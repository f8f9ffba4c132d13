//! fOS DOM - Document Object Model
//!
//! Arena-based DOM tree used as the host document for views.

mod classlist;
mod document;
mod dom_events;
mod element;
mod node;
mod operations;
mod selector;
mod tree;

pub use classlist::DOMTokenList;
pub use document::Document;
pub use dom_events::{event_path, DomEvent};
pub use element::ElementQuery;
pub use node::{Attribute, ElementData, Node, NodeData, TextData};
pub use operations::{DomError, DomResult};
pub use selector::{
    AttributeMatcher, AttributeSelector, Combinator, ComplexSelector, CompoundSelector, Selector,
};
pub use tree::{Children, DomTree};

/// Node identifier: arena slot plus the generation it was created in.
/// An id outlives its node; lookups through a stale id find nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl NodeId {
    /// Root node ID
    pub const ROOT: NodeId = NodeId::new(0, 0);
    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId::new(u32::MAX, 0);

    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Check that this is not the `NONE` sentinel
    #[inline]
    pub fn is_valid(self) -> bool {
        self.index != u32::MAX
    }

    /// Raw arena index
    pub fn index(self) -> u32 {
        self.index
    }
}
