//! Binding Engine
//!
//! Declarative one-way bindings from model attributes to DOM targets.
//! Each binding is applied once at registration and again on every
//! `change:<key>` of the bound model, for as long as the view is live.

use crate::resolver::resolve_by_selector;
use crate::{Model, ViewError, ViewHandle, ViewResult};
use fos_dom::{DomTree, NodeId};
use serde_json::Value;
use std::rc::Rc;

/// What a binding writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingKind {
    /// Text content
    Text,
    /// Inner markup
    Html,
    /// `src` attribute
    Src,
    /// `href` attribute
    Href,
    /// Named attribute
    Attribute(String),
    /// `value` of form controls
    Input,
    /// Class tokens. Booleans toggle a class named after the key, other
    /// values replace the previous value's tokens. Null and empty strings
    /// add nothing; `0` adds class `0`.
    Class,
}

/// One binding: write `key` into the targets `selector` resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingDescriptor {
    pub kind: BindingKind,
    pub key: String,
    pub selector: String,
}

impl BindingDescriptor {
    pub fn new(kind: BindingKind, key: &str, selector: &str) -> Self {
        Self {
            kind,
            key: key.to_string(),
            selector: selector.to_string(),
        }
    }

    /// Write the model's current value into the view's targets
    pub(crate) fn apply(&self, view: &ViewHandle, model: &Model) -> ViewResult<()> {
        let Some(root) = view.el() else {
            return Ok(());
        };
        let value = model.get(&self.key);
        let stage = view.stage();
        let mut document = stage.document_mut();
        let tree = document.tree_mut();
        let targets = resolve_by_selector(tree, root, &self.selector);
        tracing::trace!(
            "{} {:?} '{}' -> {} targets",
            view.id(),
            self.kind,
            self.key,
            targets.len()
        );

        match &self.kind {
            BindingKind::Text => {
                let text = display(&value);
                let spared = stage.view_roots(None);
                for target in targets {
                    tree.remove_children_keeping(target, |n| spared.contains(&n))?;
                    tree.set_text_content(target, &text)?;
                }
            }
            BindingKind::Html => {
                let markup = display(&value);
                let spared = stage.view_roots(None);
                for target in targets {
                    // Parse as the target's content so `<tr>` in a `<tbody>` survives.
                    let context = tree
                        .tag_name(target)
                        .unwrap_or(fos_html::DEFAULT_CONTEXT)
                        .to_string();
                    let nodes = fos_html::parse_fragment_in(tree, &markup, &context)?;
                    tree.remove_children_keeping(target, |n| spared.contains(&n))?;
                    for node in nodes {
                        tree.append_child(target, node)?;
                    }
                }
            }
            BindingKind::Src => write_attribute(tree, &targets, "src", &value)?,
            BindingKind::Href => write_attribute(tree, &targets, "href", &value)?,
            BindingKind::Attribute(name) => write_attribute(tree, &targets, name, &value)?,
            BindingKind::Input => write_attribute(tree, &targets, "value", &value)?,
            BindingKind::Class => {
                // Booleans toggle a class named after the key itself.
                if let Value::Bool(on) = value {
                    for target in targets {
                        if on {
                            tree.add_class(target, &self.key)?;
                        } else {
                            tree.remove_class(target, &self.key)?;
                        }
                    }
                    return Ok(());
                }
                let previous = model
                    .previous(&self.key)
                    .filter(|p| !p.is_boolean())
                    .map(|p| display(&p))
                    .filter(|tokens| !tokens.is_empty());
                let current = display(&value);
                for target in targets {
                    if let Some(previous) = &previous {
                        tree.remove_class(target, previous)?;
                    }
                    if !current.is_empty() {
                        tree.add_class(target, &current)?;
                    }
                }
            }
        }
        Ok(())
    }
}

/// Ordered binding declarations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    descriptors: Vec<BindingDescriptor>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(self, key: &str, selector: &str) -> Self {
        self.with(BindingDescriptor::new(BindingKind::Text, key, selector))
    }

    pub fn html(self, key: &str, selector: &str) -> Self {
        self.with(BindingDescriptor::new(BindingKind::Html, key, selector))
    }

    pub fn src(self, key: &str, selector: &str) -> Self {
        self.with(BindingDescriptor::new(BindingKind::Src, key, selector))
    }

    pub fn href(self, key: &str, selector: &str) -> Self {
        self.with(BindingDescriptor::new(BindingKind::Href, key, selector))
    }

    pub fn attribute(self, key: &str, selector: &str, name: &str) -> Self {
        self.with(BindingDescriptor::new(
            BindingKind::Attribute(name.to_string()),
            key,
            selector,
        ))
    }

    pub fn input(self, key: &str, selector: &str) -> Self {
        self.with(BindingDescriptor::new(BindingKind::Input, key, selector))
    }

    pub fn class(self, key: &str, selector: &str) -> Self {
        self.with(BindingDescriptor::new(BindingKind::Class, key, selector))
    }

    pub fn with(mut self, descriptor: BindingDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &BindingDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl ViewHandle {
    /// Bind `model` (default: the view's model) using `bindings` (default:
    /// the declared ones). Class bindings are registered last.
    pub fn register_bindings(
        &self,
        model: Option<&Model>,
        bindings: Option<Bindings>,
    ) -> ViewResult<()> {
        self.ensure_live()?;
        let model = match model {
            Some(model) => model.clone(),
            None => self.model().ok_or(ViewError::MissingModel)?,
        };
        let bindings = match bindings {
            Some(bindings) => bindings,
            None => self.behavior()?.bindings(),
        };

        let (classes, others): (Vec<_>, Vec<_>) = bindings
            .descriptors
            .into_iter()
            .partition(|d| d.kind == BindingKind::Class);

        for descriptor in others.into_iter().chain(classes) {
            let descriptor = Rc::new(descriptor);
            let bound = Rc::clone(&descriptor);
            let topic = format!("change:{}", descriptor.key);
            self.listen_to(&model, &topic, move |view, event| {
                bound.apply(view, &event.model)
            })?;
            descriptor.apply(self, &model)?;
        }
        Ok(())
    }
}

/// Text form of a model value: strings verbatim, null empty, others as JSON
fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Null removes the attribute
fn write_attribute(
    tree: &mut DomTree,
    targets: &[NodeId],
    name: &str,
    value: &Value,
) -> ViewResult<()> {
    for &target in targets {
        if value.is_null() {
            tree.remove_attribute(target, name)?;
        } else {
            tree.set_attribute(target, name, &display(value))?;
        }
    }
    Ok(())
}
