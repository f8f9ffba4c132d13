//! Observable Model
//!
//! Key/value store with per-key change notification and previous-value
//! recall. Setting attributes emits `change:<key>` for every changed key,
//! then a single `change`.

use crate::events::{Emitter, Listenable, Subscription};
use crate::ViewResult;
use serde_json::{Map, Value};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CID: AtomicU64 = AtomicU64::new(1);

/// Client-side model identifier (for logging; identity is by reference)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(u64);

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Payload of `change` and `change:<key>`
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub model: Model,
    /// Changed key; `None` for the aggregate `change` topic
    pub key: Option<String>,
}

struct ModelInner {
    cid: ModelId,
    attributes: RefCell<Map<String, Value>>,
    previous: RefCell<Map<String, Value>>,
    changing: Cell<bool>,
    events: Emitter<ChangeEvent>,
}

/// Shared handle to an observable model
#[derive(Clone)]
pub struct Model {
    inner: Rc<ModelInner>,
}

impl Model {
    /// Create an empty model
    pub fn new() -> Self {
        Self::with_attributes(Map::new())
    }

    /// Create a model from initial attributes (no events are emitted)
    pub fn with_attributes(attributes: Map<String, Value>) -> Self {
        Self {
            inner: Rc::new(ModelInner {
                cid: ModelId(NEXT_CID.fetch_add(1, Ordering::Relaxed)),
                previous: RefCell::new(attributes.clone()),
                attributes: RefCell::new(attributes),
                changing: Cell::new(false),
                events: Emitter::new(),
            }),
        }
    }

    /// Create a model from a JSON object; other JSON values give an empty model
    pub fn from_json(json: Value) -> Self {
        match json {
            Value::Object(map) => Self::with_attributes(map),
            _ => Self::new(),
        }
    }

    pub fn cid(&self) -> ModelId {
        self.inner.cid
    }

    /// Reference identity
    pub fn ptr_eq(&self, other: &Model) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Current value of `key` (`Null` when unset)
    pub fn get(&self, key: &str) -> Value {
        self.inner
            .attributes
            .borrow()
            .get(key)
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Whether `key` holds a non-null value
    pub fn has(&self, key: &str) -> bool {
        !self.get(key).is_null()
    }

    /// Value of `key` before the most recent `set`
    pub fn previous(&self, key: &str) -> Option<Value> {
        self.inner.previous.borrow().get(key).cloned()
    }

    /// Copy of all attributes
    pub fn attributes(&self) -> Map<String, Value> {
        self.inner.attributes.borrow().clone()
    }

    /// Set one attribute; returns whether it changed
    pub fn set(&self, key: &str, value: impl Into<Value>) -> ViewResult<bool> {
        let changed = self.set_many([(key.to_string(), value.into())])?;
        Ok(!changed.is_empty())
    }

    /// Remove one attribute; returns whether it was present
    pub fn unset(&self, key: &str) -> ViewResult<bool> {
        let changed = self.apply(|attrs| {
            if attrs.remove(key).is_some() {
                vec![key.to_string()]
            } else {
                Vec::new()
            }
        })?;
        Ok(!changed.is_empty())
    }

    /// Set several attributes at once; returns the keys that changed
    pub fn set_many<I>(&self, values: I) -> ViewResult<Vec<String>>
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        self.apply(|attrs| {
            let mut changed = Vec::new();
            for (key, value) in values {
                if attrs.get(&key) != Some(&value) {
                    attrs.insert(key.clone(), value);
                    changed.push(key);
                }
            }
            changed
        })
    }

    fn apply<F>(&self, mutate: F) -> ViewResult<Vec<String>>
    where
        F: FnOnce(&mut Map<String, Value>) -> Vec<String>,
    {
        // Nested sets (from change handlers) keep the outer previous snapshot.
        let nested = self.inner.changing.replace(true);
        if !nested {
            let snapshot = self.inner.attributes.borrow().clone();
            *self.inner.previous.borrow_mut() = snapshot;
        }

        let changed = {
            let mut attrs = self.inner.attributes.borrow_mut();
            mutate(&mut attrs)
        };

        let result = self.dispatch_changes(&changed, nested);
        if !nested {
            self.inner.changing.set(false);
        }
        result.map(|_| changed)
    }

    fn dispatch_changes(&self, changed: &[String], nested: bool) -> ViewResult<()> {
        for key in changed {
            tracing::trace!("model {} change:{}", self.inner.cid, key);
            let event = ChangeEvent {
                model: self.clone(),
                key: Some(key.clone()),
            };
            self.inner.events.emit(&format!("change:{}", key), &event)?;
        }
        if !nested && !changed.is_empty() {
            let event = ChangeEvent {
                model: self.clone(),
                key: None,
            };
            self.inner.events.emit("change", &event)?;
        }
        Ok(())
    }

    /// Subscribe directly to model topics
    pub fn on<F>(&self, topics: &str, callback: F) -> Subscription
    where
        F: Fn(&ChangeEvent) -> ViewResult<()> + 'static,
    {
        self.inner.events.on(topics, callback)
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Listenable for Model {
    type Event = ChangeEvent;

    fn emitter(&self) -> &Emitter<ChangeEvent> {
        &self.inner.events
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("cid", &self.inner.cid)
            .field("attributes", &self.inner.attributes.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_and_previous() {
        let model = Model::from_json(json!({ "state": "idle" }));
        assert_eq!(model.get("state"), json!("idle"));
        assert_eq!(model.get("missing"), Value::Null);

        assert!(model.set("state", "busy").unwrap());
        assert_eq!(model.previous("state"), Some(json!("idle")));
        assert_eq!(model.get("state"), json!("busy"));
    }

    #[test]
    fn test_unchanged_set_emits_nothing() {
        let model = Model::from_json(json!({ "n": 1 }));
        let hits = Rc::new(Cell::new(0));
        let seen = Rc::clone(&hits);
        let _sub = model.on("change:n change", move |_| {
            seen.set(seen.get() + 1);
            Ok(())
        });

        assert!(!model.set("n", 1).unwrap());
        assert_eq!(hits.get(), 0);
        assert!(model.set("n", 2).unwrap());
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_key_events_precede_aggregate_change() {
        let model = Model::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&order);
        let _sub = model.on("change:a change:b change", move |event| {
            log.borrow_mut().push(event.key.clone().unwrap_or_else(|| "*".to_string()));
            Ok(())
        });

        model
            .set_many([("a".to_string(), json!(1)), ("b".to_string(), json!(2))])
            .unwrap();
        assert_eq!(*order.borrow(), vec!["a", "b", "*"]);
    }

    #[test]
    fn test_unset() {
        let model = Model::from_json(json!({ "x": true }));
        assert!(model.unset("x").unwrap());
        assert!(!model.has("x"));
        assert_eq!(model.previous("x"), Some(json!(true)));
        assert!(!model.unset("x").unwrap());
    }

    #[test]
    fn test_identity() {
        let a = Model::new();
        let b = Model::new();
        assert!(a.ptr_eq(&a.clone()));
        assert!(!a.ptr_eq(&b));
        assert_ne!(a.cid(), b.cid());
    }
}
