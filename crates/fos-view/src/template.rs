//! Templates and the renderer
//!
//! A template turns a JSON context into markup. Rendering parses the
//! markup, checks it has exactly one root element, and swaps that root in
//! for the view's current element.

use crate::{ViewError, ViewHandle, ViewResult};
use fos_dom::{DomTree, NodeData, NodeId};
use serde_json::{Map, Value};
use std::fmt;
use std::rc::Rc;

/// Markup source
#[derive(Clone)]
pub enum Template {
    Static(String),
    Function(Rc<dyn Fn(&Value) -> String>),
}

impl Template {
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&Value) -> String + 'static,
    {
        Self::Function(Rc::new(f))
    }

    /// Produce markup for `context`; static templates ignore it
    pub fn render(&self, context: &Value) -> String {
        match self {
            Self::Static(markup) => markup.clone(),
            Self::Function(f) => f(context),
        }
    }
}

impl From<&str> for Template {
    fn from(markup: &str) -> Self {
        Self::Static(markup.to_string())
    }
}

impl From<String> for Template {
    fn from(markup: String) -> Self {
        Self::Static(markup)
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(markup) => f.debug_tuple("Static").field(markup).finish(),
            Self::Function(_) => f.write_str("Function(..)"),
        }
    }
}

/// The single root element among parsed top-level nodes.
/// Comments and whitespace-only text do not count. Every other top-level
/// node is freed, and on error the whole fragment is.
fn single_root(tree: &mut DomTree, nodes: &[NodeId]) -> ViewResult<NodeId> {
    let roots: Vec<NodeId> = nodes
        .iter()
        .copied()
        .filter(|&id| match tree.get(id).map(|n| &n.data) {
            Some(NodeData::Element(_)) => true,
            Some(NodeData::Text(text)) => !text.content.trim().is_empty(),
            _ => false,
        })
        .collect();
    let root = match roots.as_slice() {
        [root] if tree.get(*root).is_some_and(|n| n.is_element()) => Ok(*root),
        [] | [_] => Err(ViewError::EmptyTemplate),
        _ => Err(ViewError::MultipleRoots { count: roots.len() }),
    };
    for &node in nodes {
        if root.as_ref().ok() != Some(&node) {
            tree.remove_subtree(node)?;
        }
    }
    root
}

impl ViewHandle {
    /// Render `template` (or the declared one) with `context` and make the
    /// result the view's element.
    ///
    /// A view whose element is the document body keeps the body and has
    /// its content replaced instead. Events are re-delegated unless the
    /// view is rendered by a collection parent.
    pub fn render_with_template(
        &self,
        context: Option<&Value>,
        template: Option<Template>,
    ) -> ViewResult<()> {
        self.ensure_live()?;
        let template = match template {
            Some(template) => template,
            None => self
                .behavior()?
                .template()
                .ok_or(ViewError::MissingTemplate)?,
        };
        let empty = Value::Object(Map::new());
        let markup = template.render(context.unwrap_or(&empty));
        let body = self.stage().body();
        let current = self.el();

        let spared = self.stage().view_roots(Some(self.id()));
        if current == Some(body) {
            {
                let mut document = self.stage().document_mut();
                let tree = document.tree_mut();
                let nodes = fos_html::parse_fragment_in(tree, &markup, "body")?;
                tree.remove_children_keeping(body, |n| spared.contains(&n))?;
                for node in nodes {
                    tree.append_child(body, node)?;
                }
            }
            tracing::debug!("{} rendered into body", self.id());
            self.delegate_events();
            return Ok(());
        }

        let root = {
            let mut document = self.stage().document_mut();
            let tree = document.tree_mut();
            let nodes = fos_html::parse_fragment(tree, &markup)?;
            let root = single_root(tree, &nodes)?;
            if let Some(old) = current {
                tree.replace_node(old, root)?;
                tree.remove_subtree_keeping(old, |n| spared.contains(&n))?;
            }
            root
        };
        let delegate = !self.rendered_by_parent();
        self.set_element(root, delegate);
        tracing::debug!("{} rendered", self.id());
        Ok(())
    }

    /// Render (see `render_with_template`) then bind the view's model
    /// when it has one
    pub fn render_and_bind(
        &self,
        context: Option<&Value>,
        template: Option<Template>,
    ) -> ViewResult<()> {
        self.render_with_template(context, template)?;
        if self.model().is_some() {
            self.register_bindings(None, None)?;
        }
        Ok(())
    }
}
