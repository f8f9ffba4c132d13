//! Observable Collection
//!
//! Ordered set of models (by reference identity) that announces
//! membership and order changes.

use crate::events::{Emitter, Listenable, Subscription};
use crate::{Model, ViewResult};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

/// Membership / order notification
#[derive(Debug, Clone)]
pub enum CollectionEvent {
    Add(Model),
    Remove(Model),
    Move(Model),
    Sort,
    Refresh,
    Reset,
}

impl CollectionEvent {
    /// Topic the event is emitted under
    pub fn topic(&self) -> &'static str {
        match self {
            Self::Add(_) => "add",
            Self::Remove(_) => "remove",
            Self::Move(_) => "move",
            Self::Sort => "sort",
            Self::Refresh => "refresh",
            Self::Reset => "reset",
        }
    }

    /// Model the event is about, if any
    pub fn model(&self) -> Option<&Model> {
        match self {
            Self::Add(m) | Self::Remove(m) | Self::Move(m) => Some(m),
            _ => None,
        }
    }
}

struct CollectionInner {
    models: RefCell<Vec<Model>>,
    events: Emitter<CollectionEvent>,
}

/// Shared handle to an observable collection
#[derive(Clone)]
pub struct Collection {
    inner: Rc<CollectionInner>,
}

impl Collection {
    pub fn new() -> Self {
        Self::from_models(Vec::new())
    }

    /// Create with initial members (no events); duplicates are dropped
    pub fn from_models(models: impl IntoIterator<Item = Model>) -> Self {
        let mut unique: Vec<Model> = Vec::new();
        for model in models {
            if !unique.iter().any(|m| m.ptr_eq(&model)) {
                unique.push(model);
            }
        }
        Self {
            inner: Rc::new(CollectionInner {
                models: RefCell::new(unique),
                events: Emitter::new(),
            }),
        }
    }

    pub fn ptr_eq(&self, other: &Collection) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn len(&self) -> usize {
        self.inner.models.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the members in order
    pub fn models(&self) -> Vec<Model> {
        self.inner.models.borrow().clone()
    }

    pub fn at(&self, index: usize) -> Option<Model> {
        self.inner.models.borrow().get(index).cloned()
    }

    pub fn index_of(&self, model: &Model) -> Option<usize> {
        self.inner.models.borrow().iter().position(|m| m.ptr_eq(model))
    }

    pub fn contains(&self, model: &Model) -> bool {
        self.index_of(model).is_some()
    }

    /// Visit members in order. The callback may mutate the collection;
    /// iteration runs over the membership at call time.
    pub fn each<F: FnMut(&Model)>(&self, mut f: F) {
        for model in self.models() {
            f(&model);
        }
    }

    /// Members accepted by `predicate`, in order
    pub fn filter<F: Fn(&Model) -> bool>(&self, predicate: F) -> Vec<Model> {
        self.models().into_iter().filter(|m| predicate(m)).collect()
    }

    /// Append a model; returns false if it is already a member
    pub fn add(&self, model: Model) -> ViewResult<bool> {
        if self.contains(&model) {
            return Ok(false);
        }
        self.inner.models.borrow_mut().push(model.clone());
        self.emit(CollectionEvent::Add(model))?;
        Ok(true)
    }

    /// Remove a model; returns false if it was not a member
    pub fn remove(&self, model: &Model) -> ViewResult<bool> {
        let Some(index) = self.index_of(model) else {
            return Ok(false);
        };
        let removed = self.inner.models.borrow_mut().remove(index);
        self.emit(CollectionEvent::Remove(removed))?;
        Ok(true)
    }

    /// Replace the whole membership
    pub fn reset(&self, models: impl IntoIterator<Item = Model>) -> ViewResult<()> {
        let fresh = Collection::from_models(models).models();
        *self.inner.models.borrow_mut() = fresh;
        self.emit(CollectionEvent::Reset)
    }

    /// Reorder members
    pub fn sort_by<F>(&self, compare: F) -> ViewResult<()>
    where
        F: FnMut(&Model, &Model) -> Ordering,
    {
        self.inner.models.borrow_mut().sort_by(compare);
        self.emit(CollectionEvent::Sort)
    }

    /// Move a member to `index` (clamped); returns false if not a member
    pub fn move_to(&self, model: &Model, index: usize) -> ViewResult<bool> {
        let Some(from) = self.index_of(model) else {
            return Ok(false);
        };
        {
            let mut models = self.inner.models.borrow_mut();
            let moved = models.remove(from);
            let to = index.min(models.len());
            models.insert(to, moved);
        }
        self.emit(CollectionEvent::Move(model.clone()))?;
        Ok(true)
    }

    /// Announce that members should be re-rendered from scratch
    pub fn refresh(&self) -> ViewResult<()> {
        self.emit(CollectionEvent::Refresh)
    }

    fn emit(&self, event: CollectionEvent) -> ViewResult<()> {
        tracing::trace!("collection {} ({} members)", event.topic(), self.len());
        self.inner.events.emit(event.topic(), &event)
    }

    /// Subscribe directly to collection topics
    pub fn on<F>(&self, topics: &str, callback: F) -> Subscription
    where
        F: Fn(&CollectionEvent) -> ViewResult<()> + 'static,
    {
        self.inner.events.on(topics, callback)
    }
}

impl Default for Collection {
    fn default() -> Self {
        Self::new()
    }
}

impl Listenable for Collection {
    type Event = CollectionEvent;

    fn emitter(&self) -> &Emitter<CollectionEvent> {
        &self.inner.events
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("len", &self.len())
            .finish()
    }
}
