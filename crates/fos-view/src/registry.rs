//! View Registry
//!
//! Generational arena holding every view's state. A view id stays valid
//! until the view is removed; after that the slot may be reused under a
//! new generation and the stale id resolves to nothing.

use crate::events::Subscription;
use crate::reconciler::ListState;
use crate::{Collection, Model, View, ViewOptions};
use fos_dom::NodeId;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Generational view identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId {
    index: u32,
    generation: u32,
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view{}v{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lifecycle {
    Live,
    Removing,
}

/// Something a view tears down with itself
pub(crate) enum Owned {
    View(ViewId),
    List(Rc<ListState>),
}

/// Per-view state
pub(crate) struct ViewSlot {
    pub behavior: Rc<dyn View>,
    pub el: Option<NodeId>,
    pub model: Option<Model>,
    pub collection: Option<Collection>,
    pub options: ViewOptions,
    pub parent: Option<ViewId>,
    pub subviews: Vec<Owned>,
    pub subscriptions: Vec<Subscription>,
    pub references: HashMap<String, Vec<NodeId>>,
    pub rendered_by_parent: bool,
    pub container_el: Option<NodeId>,
    pub lifecycle: Lifecycle,
}

impl ViewSlot {
    pub fn new(behavior: Rc<dyn View>) -> Self {
        Self {
            behavior,
            el: None,
            model: None,
            collection: None,
            options: ViewOptions::new(),
            parent: None,
            subviews: Vec::new(),
            subscriptions: Vec::new(),
            references: HashMap::new(),
            rendered_by_parent: false,
            container_el: None,
            lifecycle: Lifecycle::Live,
        }
    }

    pub fn is_live(&self) -> bool {
        self.lifecycle == Lifecycle::Live
    }

    /// Whether `id` is registered as one of this view's direct subviews
    pub fn owns(&self, id: ViewId) -> bool {
        self.subviews
            .iter()
            .any(|owned| matches!(owned, Owned::View(v) if *v == id))
    }
}

/// Generational arena of view slots
#[derive(Default)]
pub(crate) struct ViewArena {
    slots: Vec<Option<ViewSlot>>,
    generations: Vec<u32>,
    free_list: Vec<u32>,
}

impl ViewArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, slot: ViewSlot) -> ViewId {
        if let Some(index) = self.free_list.pop() {
            let generation = self.generations[index as usize];
            self.slots[index as usize] = Some(slot);
            ViewId { index, generation }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Some(slot));
            self.generations.push(0);
            ViewId {
                index,
                generation: 0,
            }
        }
    }

    fn is_current(&self, id: ViewId) -> bool {
        self.generations.get(id.index as usize) == Some(&id.generation)
    }

    pub fn get(&self, id: ViewId) -> Option<&ViewSlot> {
        if !self.is_current(id) {
            return None;
        }
        self.slots.get(id.index as usize)?.as_ref()
    }

    pub fn get_mut(&mut self, id: ViewId) -> Option<&mut ViewSlot> {
        if !self.is_current(id) {
            return None;
        }
        self.slots.get_mut(id.index as usize)?.as_mut()
    }

    /// Free the slot; a second remove of the same id is a no-op
    pub fn remove(&mut self, id: ViewId) -> Option<ViewSlot> {
        if !self.is_current(id) {
            return None;
        }
        let slot = self.slots.get_mut(id.index as usize)?.take()?;
        let generation = &mut self.generations[id.index as usize];
        *generation = generation.wrapping_add(1);
        self.free_list.push(id.index);
        Some(slot)
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Occupied slots with their current ids
    pub fn iter(&self) -> impl Iterator<Item = (ViewId, &ViewSlot)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let slot = slot.as_ref()?;
            let id = ViewId {
                index: index as u32,
                generation: self.generations[index],
            };
            Some((id, slot))
        })
    }
}
