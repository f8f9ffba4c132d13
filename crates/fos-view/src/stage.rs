//! Stage
//!
//! Owns the host document, the view registry and the delegated event
//! table. Views are created through a stage and addressed by `ViewId`.

use crate::registry::{ViewArena, ViewSlot};
use crate::{AppContext, EventBinding, EventHandler, StageConfig, View, ViewHandle, ViewId, ViewInit, ViewResult};
use fos_dom::{event_path, Document, DomEvent, NodeId, Selector};
use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

/// Delegated handler registered by a view on its root element
struct Delegation {
    view: ViewId,
    root: NodeId,
    event: String,
    /// `None` handles events on the root itself
    selector: Option<Selector>,
    handler: EventHandler,
}

/// Host document plus every view living in it
pub struct Stage {
    config: StageConfig,
    context: AppContext,
    document: RefCell<Document>,
    pub(crate) views: RefCell<ViewArena>,
    delegations: RefCell<Vec<Delegation>>,
}

impl Stage {
    pub fn new(config: StageConfig, context: AppContext) -> Rc<Self> {
        tracing::debug!("stage created for {}", config.document_url);
        Rc::new(Self {
            document: RefCell::new(Document::new(&config.document_url)),
            config,
            context,
            views: RefCell::new(ViewArena::new()),
            delegations: RefCell::new(Vec::new()),
        })
    }

    /// Stage with default configuration and an empty context
    pub fn with_defaults() -> Rc<Self> {
        Self::new(StageConfig::default(), AppContext::new())
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    /// Borrow the document. Do not hold the borrow across view calls.
    pub fn document(&self) -> Ref<'_, Document> {
        self.document.borrow()
    }

    pub fn document_mut(&self) -> RefMut<'_, Document> {
        self.document.borrow_mut()
    }

    pub fn body(&self) -> NodeId {
        self.document.borrow().body()
    }

    /// Register a view. Without `init.el` the view gets a fresh detached
    /// element named by its `tag_name`.
    pub fn create_view(self: &Rc<Self>, behavior: Rc<dyn View>, init: ViewInit) -> ViewHandle {
        let el = match init.el {
            Some(el) => el,
            None => {
                let tag = behavior.tag_name().to_string();
                self.document.borrow_mut().tree_mut().create_element(&tag)
            }
        };
        let mut slot = ViewSlot::new(behavior);
        slot.el = Some(el);
        slot.model = init.model;
        slot.collection = init.collection;
        slot.options = init.options;
        let id = self.views.borrow_mut().insert(slot);
        tracing::debug!("{} created", id);
        let view = ViewHandle::new(Rc::clone(self), id);
        view.delegate_events();
        view
    }

    /// Create a view whose element is the document body
    pub fn mount(self: &Rc<Self>, behavior: Rc<dyn View>, init: ViewInit) -> ViewHandle {
        let body = self.body();
        self.create_view(behavior, ViewInit { el: Some(body), ..init })
    }

    /// Handle for `id` if the view still exists (live or being removed)
    pub fn view(self: &Rc<Self>, id: ViewId) -> Option<ViewHandle> {
        self.views
            .borrow()
            .get(id)
            .map(|_| ViewHandle::new(Rc::clone(self), id))
    }

    /// Handle for `id` only while the view is live
    pub fn live_view(self: &Rc<Self>, id: ViewId) -> Option<ViewHandle> {
        let live = self.views.borrow().get(id).is_some_and(|slot| slot.is_live());
        live.then(|| ViewHandle::new(Rc::clone(self), id))
    }

    /// Number of views not yet removed
    pub fn view_count(&self) -> usize {
        self.views.borrow().len()
    }

    /// Root elements of every registered view other than `except`.
    /// Freeing markup spares these so views rendered elsewhere keep their
    /// elements.
    pub(crate) fn view_roots(&self, except: Option<ViewId>) -> HashSet<NodeId> {
        self.views
            .borrow()
            .iter()
            .filter(|(id, _)| Some(*id) != except)
            .filter_map(|(_, slot)| slot.el)
            .collect()
    }

    /// Number of delegated handlers a view has registered
    pub fn delegation_count(&self, id: ViewId) -> usize {
        self.delegations
            .borrow()
            .iter()
            .filter(|d| d.view == id)
            .count()
    }

    pub(crate) fn delegate(&self, view: ViewId, root: NodeId, bindings: Vec<EventBinding>) {
        let mut delegations = self.delegations.borrow_mut();
        for binding in bindings {
            let selector = binding.selector.trim();
            let selector = if selector.is_empty() {
                None
            } else {
                match Selector::parse(selector) {
                    Ok(parsed) => Some(parsed),
                    Err(err) => {
                        tracing::warn!("{} skipping '{}' handler: {}", view, binding.event, err);
                        continue;
                    }
                }
            };
            delegations.push(Delegation {
                view,
                root,
                event: binding.event,
                selector,
                handler: binding.handler,
            });
        }
    }

    pub(crate) fn undelegate(&self, view: ViewId) {
        self.delegations.borrow_mut().retain(|d| d.view != view);
    }

    /// Dispatch a bubbling event at `target` through delegated handlers.
    ///
    /// At each ancestor carrying delegations, handlers run for every node
    /// between the target and that ancestor matching their selector
    /// (innermost first), or for the ancestor itself when they have none.
    pub fn dispatch(self: &Rc<Self>, target: NodeId, event_type: &str) -> ViewResult<DomEvent> {
        let path = event_path(self.document.borrow().tree(), target);
        let mut event = DomEvent::new(event_type, target);
        tracing::trace!("dispatch '{}' along {} nodes", event_type, path.len());

        for (depth, &node) in path.iter().enumerate() {
            let matched: Vec<(ViewId, NodeId, EventHandler)> = {
                let delegations = self.delegations.borrow();
                let document = self.document.borrow();
                let tree = document.tree();
                let mut matched = Vec::new();
                for d in delegations
                    .iter()
                    .filter(|d| d.root == node && d.event == event_type)
                {
                    match &d.selector {
                        None => matched.push((d.view, node, Rc::clone(&d.handler))),
                        Some(selector) => {
                            for &inner in &path[..depth] {
                                if selector.matches(tree, inner) {
                                    matched.push((d.view, inner, Rc::clone(&d.handler)));
                                }
                            }
                        }
                    }
                }
                matched
            };

            for (view_id, current, handler) in matched {
                let Some(view) = self.live_view(view_id) else {
                    continue;
                };
                event.current_target = Some(current);
                handler(&view, &mut event)?;
                if event.is_propagation_stopped() {
                    break;
                }
            }
            if event.is_propagation_stopped() {
                break;
            }
        }
        event.current_target = None;
        Ok(event)
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("config", &self.config)
            .field("views", &self.view_count())
            .field("delegations", &self.delegations.borrow().len())
            .finish()
    }
}
