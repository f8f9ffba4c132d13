//! Collection Reconciler
//!
//! Keeps one child view per (filtered) collection member inside a
//! container element. Adds insert at the boundary, removals go through
//! the child's exit hook, reorders rebuild the container's children and
//! refresh/reset recreate every child view.

use crate::{
    AppContext, Collection, CollectionEvent, Container, Model, Stage, View, ViewHandle, ViewId,
    ViewInit, ViewOptions, ViewResult,
};
use fos_dom::NodeId;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// What a factory gets to build one child view
pub struct ChildSpec<'a> {
    pub model: &'a Model,
    pub collection: &'a Collection,
    pub view_options: &'a ViewOptions,
    pub context: &'a AppContext,
}

/// Builds the behaviour of one child view
pub type ViewFactory = Rc<dyn Fn(&ChildSpec<'_>) -> Rc<dyn View>>;

/// Model predicate
pub type ModelFilter = Rc<dyn Fn(&Model) -> bool>;

/// Options for `render_collection`
#[derive(Clone, Default)]
pub struct CollectionOptions {
    /// Only members accepted by the filter get a view
    pub filter: Option<ModelFilter>,
    /// Passed to every child view
    pub view_options: ViewOptions,
    /// Insert at the start of the container instead of the end
    pub reverse: bool,
}

impl CollectionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&Model) -> bool + 'static,
    {
        self.filter = Some(Rc::new(filter));
        self
    }

    pub fn view_options(mut self, options: ViewOptions) -> Self {
        self.view_options = options;
        self
    }

    pub fn reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }
}

impl fmt::Debug for CollectionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionOptions")
            .field("filter", &self.filter.is_some())
            .field("view_options", &self.view_options)
            .field("reverse", &self.reverse)
            .finish()
    }
}

struct Entry {
    model: Model,
    view: ViewId,
}

/// Live state of one rendered collection
pub(crate) struct ListState {
    stage: Weak<Stage>,
    parent: ViewId,
    collection: Collection,
    factory: ViewFactory,
    container: NodeId,
    options: CollectionOptions,
    entries: RefCell<Vec<Entry>>,
}

impl ListState {
    fn accepts(&self, model: &Model) -> bool {
        self.options.filter.as_ref().is_none_or(|filter| filter(model))
    }

    fn entry_for(&self, model: &Model) -> Option<ViewId> {
        self.entries
            .borrow()
            .iter()
            .find(|e| e.model.ptr_eq(model))
            .map(|e| e.view)
    }

    fn add(&self, model: &Model) -> ViewResult<()> {
        if !self.accepts(model) {
            return Ok(());
        }
        let Some(stage) = self.stage.upgrade() else {
            return Ok(());
        };

        let existing = match self.entry_for(model) {
            Some(id) => match stage.live_view(id) {
                Some(view) => Some(view),
                None => {
                    self.entries.borrow_mut().retain(|e| e.view != id);
                    None
                }
            },
            None => None,
        };

        let child = match existing {
            Some(view) => view,
            None => {
                let behavior = (self.factory)(&ChildSpec {
                    model,
                    collection: &self.collection,
                    view_options: &self.options.view_options,
                    context: stage.context(),
                });
                let init = ViewInit::new()
                    .model(model.clone())
                    .collection(self.collection.clone())
                    .options(self.options.view_options.clone());
                let child = stage.create_view(behavior, init);
                child.set_parent(Some(self.parent));
                child.set_rendered_by_parent(true);
                child.set_container_el(Some(self.container));
                if let Err(err) = child.render() {
                    child.remove();
                    return Err(err);
                }
                self.entries.borrow_mut().push(Entry {
                    model: model.clone(),
                    view: child.id(),
                });
                child
            }
        };

        if !child.insert_self() {
            if let Some(el) = child.el() {
                let mut document = stage.document_mut();
                let tree = document.tree_mut();
                if self.options.reverse {
                    tree.prepend_child(self.container, el)?;
                } else {
                    tree.append_child(self.container, el)?;
                }
            }
        }
        child.delegate_events();
        Ok(())
    }

    fn remove(&self, model: &Model) {
        let removed = {
            let mut entries = self.entries.borrow_mut();
            entries
                .iter()
                .position(|e| e.model.ptr_eq(model))
                .map(|index| entries.remove(index).view)
        };
        let Some(id) = removed else {
            return;
        };
        if let Some(view) = self.stage.upgrade().and_then(|stage| stage.live_view(id)) {
            view.animate_remove();
        }
    }

    /// Empty the container node by node, then add every member in order.
    /// View roots are detached for reuse; any other content is freed.
    fn reconcile(&self) -> ViewResult<()> {
        let Some(stage) = self.stage.upgrade() else {
            return Ok(());
        };
        let spared = stage.view_roots(None);
        stage
            .document_mut()
            .tree_mut()
            .remove_children_keeping(self.container, |n| spared.contains(&n))?;
        for model in self.collection.models() {
            self.add(&model)?;
        }
        tracing::debug!(
            "{} reconciled {} child views",
            self.parent,
            self.entries.borrow().len()
        );
        Ok(())
    }

    /// Remove every child view, last first
    pub(crate) fn remove_all(&self) {
        let stage = self.stage.upgrade();
        loop {
            let next = self.entries.borrow_mut().pop();
            let Some(entry) = next else {
                break;
            };
            if let Some(view) = stage.as_ref().and_then(|stage| stage.live_view(entry.view)) {
                view.remove();
            }
        }
    }
}

/// Child views of a rendered collection
#[derive(Clone)]
pub struct CollectionViews {
    state: Rc<ListState>,
}

impl CollectionViews {
    pub(crate) fn state(&self) -> Rc<ListState> {
        Rc::clone(&self.state)
    }

    pub fn len(&self) -> usize {
        self.state.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn container(&self) -> NodeId {
        self.state.container
    }

    /// Child views in entry order
    pub fn views(&self) -> Vec<ViewHandle> {
        let Some(stage) = self.state.stage.upgrade() else {
            return Vec::new();
        };
        let ids: Vec<ViewId> = self.state.entries.borrow().iter().map(|e| e.view).collect();
        ids.into_iter().filter_map(|id| stage.view(id)).collect()
    }

    /// Models with a child view, in entry order
    pub fn models(&self) -> Vec<Model> {
        self.state
            .entries
            .borrow()
            .iter()
            .map(|e| e.model.clone())
            .collect()
    }

    pub fn view_for(&self, model: &Model) -> Option<ViewHandle> {
        let id = self.state.entry_for(model)?;
        self.state.stage.upgrade()?.view(id)
    }
}

impl fmt::Debug for CollectionViews {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionViews")
            .field("parent", &self.state.parent)
            .field("container", &self.state.container)
            .field("len", &self.len())
            .finish()
    }
}

impl ViewHandle {
    /// Render one `factory` view per member of `collection` into
    /// `container` and keep them in step with the collection. The
    /// returned list is owned by this view.
    pub fn render_collection<F>(
        &self,
        collection: &Collection,
        factory: F,
        container: impl Into<Container>,
        options: CollectionOptions,
    ) -> ViewResult<CollectionViews>
    where
        F: Fn(&ChildSpec<'_>) -> Rc<dyn View> + 'static,
    {
        self.ensure_live()?;
        let container = self.resolve_container(container.into())?;
        let state = Rc::new(ListState {
            stage: Rc::downgrade(self.stage()),
            parent: self.id(),
            collection: collection.clone(),
            factory: Rc::new(factory),
            container,
            options,
            entries: RefCell::new(Vec::new()),
        });
        // Nothing is registered until every initial child has rendered.
        if let Err(err) = state.reconcile() {
            state.remove_all();
            return Err(err);
        }
        let views = CollectionViews {
            state: Rc::clone(&state),
        };
        self.register_subview(views.clone())?;

        let list = Rc::downgrade(&state);
        self.listen_to(collection, "add", move |_, event| match (list.upgrade(), event) {
            (Some(list), CollectionEvent::Add(model)) => list.add(model),
            _ => Ok(()),
        })?;
        let list = Rc::downgrade(&state);
        self.listen_to(collection, "remove", move |_, event| {
            if let (Some(list), CollectionEvent::Remove(model)) = (list.upgrade(), event) {
                list.remove(model);
            }
            Ok(())
        })?;
        let list = Rc::downgrade(&state);
        self.listen_to(collection, "move sort", move |_, _| match list.upgrade() {
            Some(list) => list.reconcile(),
            None => Ok(()),
        })?;
        let list = Rc::downgrade(&state);
        self.listen_to(collection, "refresh reset", move |_, _| match list.upgrade() {
            Some(list) => {
                list.remove_all();
                list.reconcile()
            }
            None => Ok(()),
        })?;
        Ok(views)
    }
}
