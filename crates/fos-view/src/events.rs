//! Event channels
//!
//! Topic-addressed listener registry shared by models and collections.
//! Dispatch runs over a snapshot of the listeners, in registration order,
//! and skips any listener released while the dispatch is in flight.

use crate::ViewResult;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Listener callback
pub type Callback<E> = Rc<dyn Fn(&E) -> ViewResult<()>>;

/// Listener identifier, unique per emitter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Listener<E> {
    id: ListenerId,
    topic: String,
    callback: Callback<E>,
}

struct Registry<E> {
    next_id: u64,
    listeners: Vec<Listener<E>>,
}

/// Event channel
pub struct Emitter<E> {
    registry: Rc<RefCell<Registry<E>>>,
}

impl<E> Clone for Emitter<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Rc::clone(&self.registry),
        }
    }
}

impl<E: 'static> Emitter<E> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Subscribe to whitespace separated topics (`"move sort"`).
    ///
    /// The listener stays registered until the returned subscription is
    /// cancelled or dropped.
    pub fn on<F>(&self, topics: &str, callback: F) -> Subscription
    where
        F: Fn(&E) -> ViewResult<()> + 'static,
    {
        let callback: Callback<E> = Rc::new(callback);
        let mut ids = Vec::new();
        {
            let mut registry = self.registry.borrow_mut();
            for topic in topics.split_whitespace() {
                let id = ListenerId(registry.next_id);
                registry.next_id += 1;
                registry.listeners.push(Listener {
                    id,
                    topic: topic.to_string(),
                    callback: Rc::clone(&callback),
                });
                ids.push(id);
            }
        }

        let weak: Weak<RefCell<Registry<E>>> = Rc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = weak.upgrade() {
                registry
                    .borrow_mut()
                    .listeners
                    .retain(|l| !ids.contains(&l.id));
            }
        })
    }

    /// Dispatch `event` to every listener of `topic`.
    ///
    /// Stops at, and returns, the first listener error.
    pub fn emit(&self, topic: &str, event: &E) -> ViewResult<()> {
        let snapshot: Vec<(ListenerId, Callback<E>)> = self
            .registry
            .borrow()
            .listeners
            .iter()
            .filter(|l| l.topic == topic)
            .map(|l| (l.id, Rc::clone(&l.callback)))
            .collect();

        tracing::trace!("emit '{}' to {} listeners", topic, snapshot.len());
        for (id, callback) in snapshot {
            if !self.is_registered(id) {
                continue;
            }
            callback(event)?;
        }
        Ok(())
    }

    fn is_registered(&self, id: ListenerId) -> bool {
        self.registry.borrow().listeners.iter().any(|l| l.id == id)
    }

    /// Number of registered listeners across all topics
    pub fn listener_count(&self) -> usize {
        self.registry.borrow().listeners.len()
    }

    /// Number of listeners registered for one topic
    pub fn topic_listener_count(&self, topic: &str) -> usize {
        self.registry
            .borrow()
            .listeners
            .iter()
            .filter(|l| l.topic == topic)
            .count()
    }
}

impl<E: 'static> Default for Emitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Emitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.registry.borrow().listeners.len())
            .finish()
    }
}

/// Anything views can listen to
pub trait Listenable {
    type Event: 'static;

    fn emitter(&self) -> &Emitter<Self::Event>;
}

/// Registration handle; releases its listeners when cancelled or dropped
#[must_use = "dropping a Subscription releases its listeners"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Release the listeners now
    pub fn cancel(mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }

    /// Keep the listeners registered for the emitter's whole lifetime
    pub fn forget(mut self) {
        self.release = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}
