//! View behaviour
//!
//! A `View` implementation supplies the per-view pieces (template,
//! bindings, delegated events, hooks). Everything shared lives on
//! `ViewHandle`, which every hook receives.

use crate::{Bindings, Collection, Model, Template, ViewHandle, ViewResult};
use fos_dom::{DomEvent, NodeId};
use serde_json::{Map, Value};
use std::fmt;
use std::rc::Rc;

/// Extra options handed to a view at creation
pub type ViewOptions = Map<String, Value>;

/// Delegated event handler
pub type EventHandler = Rc<dyn Fn(&ViewHandle, &mut DomEvent) -> ViewResult<()>>;

/// Per-view behaviour
pub trait View {
    /// Build the view's DOM. Default: render the declared template and bind.
    fn render(&self, cx: &ViewHandle) -> ViewResult<()> {
        cx.render_and_bind(None, None)
    }

    /// Declared template
    fn template(&self) -> Option<Template> {
        None
    }

    /// Declared bindings
    fn bindings(&self) -> Bindings {
        Bindings::new()
    }

    /// Declared delegated events
    fn events(&self) -> Vec<EventBinding> {
        Vec::new()
    }

    /// Tag of the placeholder root created with the view
    fn tag_name(&self) -> &str {
        "div"
    }

    /// When true, a collection parent leaves DOM insertion to the view
    fn insert_self(&self) -> bool {
        false
    }

    /// Called when the view's model leaves a rendered collection.
    /// Overrides may run an exit effect but must end with `cx.remove()`.
    fn animate_remove(&self, cx: &ViewHandle) {
        cx.remove();
    }
}

/// Delegated event declaration: `event` on nodes matching `selector`
/// inside the view root (empty selector: the root itself)
#[derive(Clone)]
pub struct EventBinding {
    pub event: String,
    pub selector: String,
    pub handler: EventHandler,
}

impl EventBinding {
    pub fn new<F>(event: &str, selector: &str, handler: F) -> Self
    where
        F: Fn(&ViewHandle, &mut DomEvent) -> ViewResult<()> + 'static,
    {
        Self {
            event: event.to_string(),
            selector: selector.to_string(),
            handler: Rc::new(handler),
        }
    }
}

impl fmt::Debug for EventBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBinding")
            .field("event", &self.event)
            .field("selector", &self.selector)
            .finish()
    }
}

/// Construction parameters for a view
#[derive(Debug, Clone, Default)]
pub struct ViewInit {
    pub model: Option<Model>,
    pub collection: Option<Collection>,
    /// Existing root element; a detached placeholder is created otherwise
    pub el: Option<NodeId>,
    pub options: ViewOptions,
}

impl ViewInit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(mut self, model: Model) -> Self {
        self.model = Some(model);
        self
    }

    pub fn collection(mut self, collection: Collection) -> Self {
        self.collection = Some(collection);
        self
    }

    pub fn el(mut self, el: NodeId) -> Self {
        self.el = Some(el);
        self
    }

    pub fn options(mut self, options: ViewOptions) -> Self {
        self.options = options;
        self
    }
}
