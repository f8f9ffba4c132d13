//! View handle
//!
//! Shared capabilities of every view: element access, subview ownership,
//! listener bookkeeping, event delegation and teardown.

use crate::events::Listenable;
use crate::reconciler::CollectionViews;
use crate::registry::{Lifecycle, Owned, ViewSlot};
use crate::resolver::{resolve_by_role, resolve_by_selector};
use crate::{AppContext, Collection, Model, Stage, View, ViewError, ViewId, ViewOptions, ViewResult};
use fos_dom::{ElementQuery, NodeId};
use std::fmt;
use std::rc::Rc;

/// Where a subview's element is appended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Container {
    Element(NodeId),
    /// Looked up in the owner's element first, then the whole document
    Selector(String),
}

impl From<NodeId> for Container {
    fn from(node: NodeId) -> Self {
        Self::Element(node)
    }
}

impl From<&str> for Container {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_string())
    }
}

/// Something a view can own and tear down
pub enum Subview {
    View(ViewHandle),
    List(CollectionViews),
}

impl From<ViewHandle> for Subview {
    fn from(view: ViewHandle) -> Self {
        Self::View(view)
    }
}

impl From<&ViewHandle> for Subview {
    fn from(view: &ViewHandle) -> Self {
        Self::View(view.clone())
    }
}

impl From<CollectionViews> for Subview {
    fn from(list: CollectionViews) -> Self {
        Self::List(list)
    }
}

/// Handle to a view registered on a stage
#[derive(Clone)]
pub struct ViewHandle {
    stage: Rc<Stage>,
    id: ViewId,
}

impl ViewHandle {
    pub(crate) fn new(stage: Rc<Stage>, id: ViewId) -> Self {
        Self { stage, id }
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn stage(&self) -> &Rc<Stage> {
        &self.stage
    }

    pub fn context(&self) -> &AppContext {
        self.stage.context()
    }

    fn with_slot<R>(&self, f: impl FnOnce(&ViewSlot) -> R) -> Option<R> {
        self.stage.views.borrow().get(self.id).map(f)
    }

    fn with_slot_mut<R>(&self, f: impl FnOnce(&mut ViewSlot) -> R) -> Option<R> {
        self.stage.views.borrow_mut().get_mut(self.id).map(f)
    }

    /// Whether the view exists and has not started teardown
    pub fn is_live(&self) -> bool {
        self.with_slot(|slot| slot.is_live()).unwrap_or(false)
    }

    pub(crate) fn ensure_live(&self) -> ViewResult<()> {
        if self.is_live() {
            Ok(())
        } else {
            Err(ViewError::Removed(self.id))
        }
    }

    pub(crate) fn behavior(&self) -> ViewResult<Rc<dyn View>> {
        self.with_slot(|slot| Rc::clone(&slot.behavior))
            .ok_or(ViewError::Removed(self.id))
    }

    /// Root element
    pub fn el(&self) -> Option<NodeId> {
        self.with_slot(|slot| slot.el).flatten()
    }

    /// Swap the root element, re-delegating events when `delegate` is set
    pub fn set_element(&self, el: NodeId, delegate: bool) {
        self.undelegate_events();
        self.with_slot_mut(|slot| slot.el = Some(el));
        if delegate {
            self.delegate_events();
        }
    }

    pub fn model(&self) -> Option<Model> {
        self.with_slot(|slot| slot.model.clone()).flatten()
    }

    pub fn collection(&self) -> Option<Collection> {
        self.with_slot(|slot| slot.collection.clone()).flatten()
    }

    pub fn options(&self) -> ViewOptions {
        self.with_slot(|slot| slot.options.clone())
            .unwrap_or_default()
    }

    /// Owning view
    pub fn parent(&self) -> Option<ViewHandle> {
        let parent = self.with_slot(|slot| slot.parent).flatten()?;
        self.stage.view(parent)
    }

    pub(crate) fn set_parent(&self, parent: Option<ViewId>) {
        self.with_slot_mut(|slot| slot.parent = parent);
    }

    /// Container a collection parent inserts this view into
    pub fn container_el(&self) -> Option<NodeId> {
        self.with_slot(|slot| slot.container_el).flatten()
    }

    pub(crate) fn set_container_el(&self, container: Option<NodeId>) {
        self.with_slot_mut(|slot| slot.container_el = container);
    }

    /// Whether a collection parent drives this view's rendering
    pub fn rendered_by_parent(&self) -> bool {
        self.with_slot(|slot| slot.rendered_by_parent)
            .unwrap_or(false)
    }

    pub(crate) fn set_rendered_by_parent(&self, value: bool) {
        self.with_slot_mut(|slot| slot.rendered_by_parent = value);
    }

    /// Whether the view inserts its own element into `container_el`
    pub fn insert_self(&self) -> bool {
        self.behavior().map(|b| b.insert_self()).unwrap_or(false)
    }

    /// Number of directly owned views and lists
    pub fn subview_count(&self) -> usize {
        self.with_slot(|slot| slot.subviews.len()).unwrap_or(0)
    }

    /// Number of model/collection subscriptions held
    pub fn listener_count(&self) -> usize {
        self.with_slot(|slot| slot.subscriptions.len()).unwrap_or(0)
    }

    /// Run the view's render hook
    pub fn render(&self) -> ViewResult<()> {
        self.ensure_live()?;
        self.behavior()?.render(self)
    }

    /// First match for `selector` inside the root
    pub fn query(&self, selector: &str) -> Option<NodeId> {
        self.query_all(selector).into_iter().next()
    }

    /// Matches for `selector` inside the root (the root itself when it
    /// matches or the selector is empty)
    pub fn query_all(&self, selector: &str) -> Vec<NodeId> {
        let Some(root) = self.el() else {
            return Vec::new();
        };
        resolve_by_selector(self.stage.document().tree(), root, selector)
    }

    /// Element carrying the configured role attribute value `role`
    pub fn get_by_role(&self, role: &str) -> Option<NodeId> {
        let root = self.el()?;
        let attribute = &self.stage.config().role_attribute;
        resolve_by_role(self.stage.document().tree(), root, attribute, role)
    }

    /// Resolve the `(name, selector)` pairs against the root's
    /// descendants now and store the results
    pub fn add_references(&self, pairs: &[(&str, &str)]) {
        let Some(root) = self.el() else {
            return;
        };
        let resolved: Vec<(String, Vec<NodeId>)> = {
            let document = self.stage.document();
            let tree = document.tree();
            pairs
                .iter()
                .map(|(name, selector)| {
                    let found = tree.query_selector_all(root, selector).unwrap_or_else(|err| {
                        tracing::warn!("{} reference '{}': {}", self.id, name, err);
                        Vec::new()
                    });
                    (name.to_string(), found)
                })
                .collect()
        };
        self.with_slot_mut(|slot| slot.references.extend(resolved));
    }

    /// Elements stored under `name` by `add_references`
    pub fn reference(&self, name: &str) -> Vec<NodeId> {
        self.with_slot(|slot| slot.references.get(name).cloned())
            .flatten()
            .unwrap_or_default()
    }

    /// Subscribe to `topics` on `target` for the rest of the view's life.
    /// The handler never runs once teardown has started.
    pub fn listen_to<T, F>(&self, target: &T, topics: &str, handler: F) -> ViewResult<()>
    where
        T: Listenable,
        F: Fn(&ViewHandle, &T::Event) -> ViewResult<()> + 'static,
    {
        self.ensure_live()?;
        let stage = Rc::downgrade(&self.stage);
        let id = self.id;
        let subscription = target.emitter().on(topics, move |event| {
            let Some(view) = stage.upgrade().and_then(|stage| stage.live_view(id)) else {
                return Ok(());
            };
            handler(&view, event)
        });
        self.with_slot_mut(move |slot| slot.subscriptions.push(subscription));
        Ok(())
    }

    /// `listen_to`, then run the handler once immediately
    pub fn listen_to_and_run<T, F>(&self, target: &T, topics: &str, handler: F) -> ViewResult<()>
    where
        T: Listenable,
        F: Fn(&ViewHandle) -> ViewResult<()> + 'static,
    {
        let handler = Rc::new(handler);
        let on_event = Rc::clone(&handler);
        self.listen_to(target, topics, move |view, _| on_event(view))?;
        handler(self)
    }

    /// Release every subscription the view holds
    pub fn stop_listening(&self) {
        let subscriptions = self
            .with_slot_mut(|slot| std::mem::take(&mut slot.subscriptions))
            .unwrap_or_default();
        drop(subscriptions);
    }

    /// (Re)register the declared events on the current root
    pub fn delegate_events(&self) {
        let Some(el) = self.el() else {
            return;
        };
        let Ok(behavior) = self.behavior() else {
            return;
        };
        let events = behavior.events();
        self.stage.undelegate(self.id);
        self.stage.delegate(self.id, el, events);
    }

    pub fn undelegate_events(&self) {
        self.stage.undelegate(self.id);
    }

    /// Take ownership of a view or a rendered list so it is torn down
    /// with this view. A view moves away from any previous owner.
    pub fn register_subview(&self, subview: impl Into<Subview>) -> ViewResult<()> {
        self.ensure_live()?;
        match subview.into() {
            Subview::View(child) => {
                if child.id == self.id {
                    return Err(ViewError::Config("a view cannot own itself".to_string()));
                }
                if let Some(previous) = child.with_slot(|slot| slot.parent).flatten() {
                    if previous != self.id {
                        if let Some(slot) = self.stage.views.borrow_mut().get_mut(previous) {
                            slot.subviews
                                .retain(|owned| !matches!(owned, Owned::View(v) if *v == child.id));
                        }
                    }
                }
                let already = self.with_slot(|slot| slot.owns(child.id)).unwrap_or(false);
                if !already {
                    self.with_slot_mut(|slot| slot.subviews.push(Owned::View(child.id)));
                }
                child.set_parent(Some(self.id));
            }
            Subview::List(list) => {
                self.with_slot_mut(|slot| slot.subviews.push(Owned::List(list.state())));
            }
        }
        Ok(())
    }

    /// Resolve a container against this view, then the document
    pub(crate) fn resolve_container(&self, container: Container) -> ViewResult<NodeId> {
        match container {
            Container::Element(node) => Ok(node),
            Container::Selector(selector) => {
                if let Some(found) = self.query(&selector) {
                    return Ok(found);
                }
                self.stage
                    .document()
                    .query_selector(&selector)
                    .ok_or(ViewError::MissingContainer(selector))
            }
        }
    }

    /// Own `child`, render it and append its element to `container`
    pub fn render_subview(&self, child: &ViewHandle, container: impl Into<Container>) -> ViewResult<()> {
        self.ensure_live()?;
        let target = self.resolve_container(container.into())?;
        self.register_subview(child)?;
        child.render()?;
        if let Some(el) = child.el() {
            self.stage.document_mut().tree_mut().append_child(target, el)?;
        }
        Ok(())
    }

    /// Run the view's exit hook, which ends in `remove`
    pub fn animate_remove(&self) {
        match self.behavior() {
            Ok(behavior) if self.is_live() => behavior.animate_remove(self),
            _ => {}
        }
    }

    /// Tear down owned views and lists first, then release events,
    /// subscriptions and the element. The element's nodes are freed except
    /// for roots of other views. Repeated calls are no-ops.
    pub fn remove(&self) {
        let subviews = self.with_slot_mut(|slot| {
            if slot.lifecycle != Lifecycle::Live {
                return None;
            }
            slot.lifecycle = Lifecycle::Removing;
            Some(std::mem::take(&mut slot.subviews))
        });
        let Some(Some(subviews)) = subviews else {
            return;
        };

        for owned in subviews {
            match owned {
                Owned::View(id) => {
                    if let Some(child) = self.stage.view(id) {
                        child.remove();
                    }
                }
                Owned::List(list) => list.remove_all(),
            }
        }

        self.undelegate_events();
        self.stop_listening();
        if let Some(el) = self.el() {
            let body = self.stage.body();
            let spared = self.stage.view_roots(Some(self.id));
            let mut document = self.stage.document_mut();
            let tree = document.tree_mut();
            let freed = if el == body {
                tree.remove_children_keeping(el, |n| spared.contains(&n))
            } else {
                tree.remove_subtree_keeping(el, |n| spared.contains(&n))
            };
            if let Err(err) = freed {
                tracing::warn!("{} element cleanup failed: {}", self.id, err);
            }
        }
        let slot = self.stage.views.borrow_mut().remove(self.id);
        drop(slot);
        tracing::debug!("{} removed", self.id);
    }
}

impl fmt::Debug for ViewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewHandle")
            .field("id", &self.id)
            .field("el", &self.el())
            .finish()
    }
}
