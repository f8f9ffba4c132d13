//! Example: a todo list kept in step with its collection

use fos_view::{
    Bindings, ChildSpec, Collection, CollectionOptions, Model, Stage, Template, View, ViewInit,
    ViewResult,
};
use serde_json::json;
use std::rc::Rc;

struct TodoItem;

impl View for TodoItem {
    fn template(&self) -> Option<Template> {
        Some(r#"<li class="todo"><span class="title"></span></li>"#.into())
    }

    fn bindings(&self) -> Bindings {
        Bindings::new().text("title", ".title").class("done", "")
    }
}

struct TodoApp;

impl View for TodoApp {
    fn template(&self) -> Option<Template> {
        Some(r#"<main><h1>Todos</h1><ul class="todos"></ul></main>"#.into())
    }
}

fn main() -> ViewResult<()> {
    // Initialize logging (RUST_LOG=fos_view=debug for lifecycle output)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let todos = Collection::from_models([
        Model::from_json(json!({ "title": "write parser", "done": true })),
        Model::from_json(json!({ "title": "bind views", "done": false })),
    ]);

    let stage = Stage::with_defaults();
    let app = stage.mount(Rc::new(TodoApp), ViewInit::new());
    app.render()?;
    app.render_collection(
        &todos,
        |_: &ChildSpec<'_>| Rc::new(TodoItem) as Rc<dyn View>,
        ".todos",
        CollectionOptions::new(),
    )?;

    todos.add(Model::from_json(json!({ "title": "ship it", "done": false })))?;
    if let Some(second) = todos.at(1) {
        second.set("done", true)?;
    }

    println!("{}", fos_html::inner_html(stage.document().tree(), stage.body()));
    app.remove();
    Ok(())
}
