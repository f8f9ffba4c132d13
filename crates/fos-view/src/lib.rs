//! fOS View
//!
//! View binding and lifecycle layer on top of the fOS DOM.
//!
//! # Features
//! - Observable models and collections
//! - Declarative one-way bindings (text, markup, attributes, classes)
//! - Template rendering with a single-root check
//! - Subview ownership with cascading teardown
//! - Collection rendering kept in step with membership and order
//!
//! # Example
//! ```rust,ignore
//! use fos_view::{Bindings, Model, Stage, Template, View, ViewInit};
//! use std::rc::Rc;
//!
//! struct Card;
//!
//! impl View for Card {
//!     fn template(&self) -> Option<Template> {
//!         Some("<div class=\"card\"><h1 class=\"name\"></h1></div>".into())
//!     }
//!
//!     fn bindings(&self) -> Bindings {
//!         Bindings::new().text("name", ".name").class("state", "")
//!     }
//! }
//!
//! let stage = Stage::with_defaults();
//! let model = Model::from_json(serde_json::json!({ "name": "Ada", "state": "idle" }));
//! let card = stage.create_view(Rc::new(Card), ViewInit::new().model(model.clone()));
//! card.render()?;
//! model.set("name", "Grace")?;
//! ```

mod binding;
mod collection;
mod config;
mod context;
mod error;
mod events;
mod handle;
mod model;
mod reconciler;
mod registry;
mod resolver;
mod stage;
mod template;
mod view;

pub use binding::{BindingDescriptor, BindingKind, Bindings};
pub use collection::{Collection, CollectionEvent};
pub use config::StageConfig;
pub use context::AppContext;
pub use error::{ViewError, ViewResult};
pub use events::{Callback, Emitter, ListenerId, Listenable, Subscription};
pub use handle::{Container, Subview, ViewHandle};
pub use model::{ChangeEvent, Model, ModelId};
pub use reconciler::{ChildSpec, CollectionOptions, CollectionViews, ModelFilter, ViewFactory};
pub use registry::ViewId;
pub use resolver::{resolve_by_role, resolve_by_selector};
pub use stage::Stage;
pub use template::Template;
pub use view::{EventBinding, EventHandler, View, ViewInit, ViewOptions};

pub use fos_dom::{DomEvent, NodeId};
