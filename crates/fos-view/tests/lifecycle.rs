//! Subview ownership, teardown, listeners and delegated events

use fos_view::{
    AppContext, Bindings, Container, DomEvent, EventBinding, Listenable, Model, Stage,
    StageConfig, Template, View, ViewError, ViewHandle, ViewInit,
};
use serde_json::json;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

struct Markup(&'static str);

impl View for Markup {
    fn template(&self) -> Option<Template> {
        Some(self.0.into())
    }
}

struct Labelled;

impl View for Labelled {
    fn template(&self) -> Option<Template> {
        Some(r#"<span class="label"></span>"#.into())
    }

    fn bindings(&self) -> Bindings {
        Bindings::new().text("label", "")
    }
}

fn shell(stage: &Rc<Stage>) -> ViewHandle {
    let view = stage.create_view(
        Rc::new(Markup(r#"<div class="shell"><aside class="side"></aside></div>"#)),
        ViewInit::new(),
    );
    view.render().unwrap();
    view
}

#[test]
fn test_render_subview_into_selector_container() {
    let stage = Stage::with_defaults();
    let parent = shell(&stage);
    let model = Model::from_json(json!({ "label": "hi" }));
    let child = stage.create_view(Rc::new(Labelled), ViewInit::new().model(model.clone()));

    parent.render_subview(&child, ".side").unwrap();

    let side = parent.query(".side").unwrap();
    let child_el = child.el().unwrap();
    assert_eq!(stage.document().tree().parent(child_el), Some(side));
    assert_eq!(child.parent().map(|p| p.id()), Some(parent.id()));
    assert_eq!(parent.subview_count(), 1);
    assert_eq!(stage.document().tree().text_content(child_el), "hi");
}

#[test]
fn test_missing_container_leaves_no_partial_state() {
    let stage = Stage::with_defaults();
    let parent = shell(&stage);
    let child = stage.create_view(Rc::new(Markup("<p></p>")), ViewInit::new());

    let err = parent.render_subview(&child, ".nowhere").unwrap_err();
    assert!(matches!(err, ViewError::MissingContainer(ref s) if s == ".nowhere"));
    assert_eq!(parent.subview_count(), 0);
    assert!(child.parent().is_none());
}

#[test]
fn test_remove_cascades_and_releases_subscriptions() {
    init_tracing();
    let stage = Stage::with_defaults();
    let parent = shell(&stage);
    let model = Model::from_json(json!({ "label": "a" }));
    let children: Vec<ViewHandle> = (0..3)
        .map(|_| {
            let child = stage.create_view(Rc::new(Labelled), ViewInit::new().model(model.clone()));
            parent.render_subview(&child, Container::Selector(".side".into())).unwrap();
            child
        })
        .collect();
    assert_eq!(model.emitter().listener_count(), 3);

    parent.remove();

    assert!(!parent.is_live());
    assert!(children.iter().all(|c| !c.is_live()));
    assert_eq!(model.emitter().listener_count(), 0);
    assert_eq!(stage.view_count(), 0);
}

#[test]
fn test_remove_twice_is_a_no_op() {
    let stage = Stage::with_defaults();
    let body = stage.body();
    let view = shell(&stage);
    let root = view.el().unwrap();
    stage.document_mut().tree_mut().append_child(body, root).unwrap();

    view.remove();
    let nodes = stage.document().tree().len();
    assert_eq!(stage.document().tree().parent(root), None);

    view.remove();
    assert_eq!(stage.document().tree().len(), nodes);
    assert_eq!(stage.view_count(), 0);
    assert!(matches!(view.render(), Err(ViewError::Removed(id)) if id == view.id()));
}

#[test]
fn test_stale_id_does_not_reach_new_view() {
    let stage = Stage::with_defaults();
    let old = stage.create_view(Rc::new(Markup("<p></p>")), ViewInit::new());
    let old_id = old.id();
    old.remove();

    let fresh = stage.create_view(Rc::new(Markup("<p></p>")), ViewInit::new());
    assert_ne!(fresh.id(), old_id);
    assert!(stage.view(old_id).is_none());
    assert!(stage.view(fresh.id()).is_some());
}

#[test]
fn test_register_subview_moves_ownership() {
    let stage = Stage::with_defaults();
    let first = shell(&stage);
    let second = shell(&stage);
    let child = stage.create_view(Rc::new(Markup("<p></p>")), ViewInit::new());

    first.register_subview(&child).unwrap();
    first.register_subview(&child).unwrap();
    assert_eq!(first.subview_count(), 1);

    second.register_subview(child.clone()).unwrap();
    assert_eq!(first.subview_count(), 0);
    assert_eq!(second.subview_count(), 1);

    first.remove();
    assert!(child.is_live());
    second.remove();
    assert!(!child.is_live());
}

#[test]
fn test_listen_to_and_run_fires_immediately_and_on_change() {
    let stage = Stage::with_defaults();
    let view = shell(&stage);
    let model = Model::from_json(json!({ "n": 1 }));
    let seen = Rc::new(RefCell::new(Vec::new()));

    let sink = Rc::clone(&seen);
    let source = model.clone();
    view.listen_to_and_run(&model, "change:n", move |_| {
        sink.borrow_mut().push(source.get("n"));
        Ok(())
    })
    .unwrap();
    model.set("n", 2).unwrap();
    assert_eq!(*seen.borrow(), vec![json!(1), json!(2)]);

    view.stop_listening();
    model.set("n", 3).unwrap();
    assert_eq!(seen.borrow().len(), 2);
    assert_eq!(view.listener_count(), 0);
}

#[test]
fn test_listener_error_propagates_to_emitter() {
    let stage = Stage::with_defaults();
    let view = shell(&stage);
    let model = Model::new();
    view.listen_to(&model, "change", |_, _| Err(ViewError::Config("boom".into())))
        .unwrap();

    assert!(matches!(model.set("x", 1), Err(ViewError::Config(_))));
}

#[test]
fn test_role_lookup_uses_configured_attribute() {
    let config = StageConfig::from_json(r#"{ "role_attribute": "data-role" }"#).unwrap();
    let stage = Stage::new(config, AppContext::new());
    let view = stage.create_view(
        Rc::new(Markup(
            r#"<nav data-role="menu"><a data-role="home"></a><a role="about"></a></nav>"#,
        )),
        ViewInit::new(),
    );
    view.render().unwrap();

    let home = view.get_by_role("home").unwrap();
    assert_eq!(stage.document().tree().tag_name(home), Some("a"));
    assert_eq!(view.get_by_role("menu"), view.el());
    assert_eq!(view.get_by_role("about"), None);
}

#[test]
fn test_references_resolve_descendants() {
    init_tracing();
    let stage = Stage::with_defaults();
    let view = stage.create_view(
        Rc::new(Markup(
            r#"<ul class="pages"><li class="page"></li><li class="page"></li></ul>"#,
        )),
        ViewInit::new(),
    );
    view.render().unwrap();

    view.add_references(&[("pages", ".page"), ("root", ".pages"), ("broken", "[[")]);
    assert_eq!(view.reference("pages").len(), 2);
    assert!(view.reference("root").is_empty());
    assert!(view.reference("broken").is_empty());
    assert!(view.reference("unknown").is_empty());
}

#[test]
fn test_app_context_reaches_views() {
    #[derive(Debug)]
    struct CurrentUser(String);

    struct Greeter;
    impl View for Greeter {
        fn render(&self, cx: &ViewHandle) -> fos_view::ViewResult<()> {
            let name = cx
                .context()
                .get::<CurrentUser>()
                .map(|u| u.0.clone())
                .unwrap_or_default();
            cx.render_with_template(None, Some(format!("<p>{}</p>", name).into()))
        }
    }

    let context = AppContext::new().with(CurrentUser("ada".into()));
    let stage = Stage::new(StageConfig::default(), context);
    let view = stage.create_view(Rc::new(Greeter), ViewInit::new());
    view.render().unwrap();
    assert_eq!(stage.document().tree().text_content(view.el().unwrap()), "ada");
}

struct Clicker {
    clicks: Rc<Cell<usize>>,
    stop: bool,
}

impl View for Clicker {
    fn template(&self) -> Option<Template> {
        Some(r#"<div class="toolbar"><button class="save"><i class="icon"></i></button></div>"#.into())
    }

    fn events(&self) -> Vec<EventBinding> {
        let clicks = Rc::clone(&self.clicks);
        let stop = self.stop;
        vec![EventBinding::new("click", ".save", move |_, event: &mut DomEvent| {
            clicks.set(clicks.get() + 1);
            if stop {
                event.stop_propagation();
            }
            Ok(())
        })]
    }
}

#[test]
fn test_delegated_events_follow_root_and_teardown() {
    init_tracing();
    let stage = Stage::with_defaults();
    let clicks = Rc::new(Cell::new(0));
    let view = stage.create_view(
        Rc::new(Clicker {
            clicks: Rc::clone(&clicks),
            stop: false,
        }),
        ViewInit::new(),
    );
    view.render().unwrap();
    assert_eq!(stage.delegation_count(view.id()), 1);

    let icon = view.query(".icon").unwrap();
    let save = view.query(".save").unwrap();
    let event = stage.dispatch(icon, "click").unwrap();
    assert_eq!(clicks.get(), 1);
    assert_eq!(event.target, icon);

    stage.dispatch(view.el().unwrap(), "click").unwrap();
    stage.dispatch(save, "keydown").unwrap();
    assert_eq!(clicks.get(), 1);

    view.remove();
    assert_eq!(stage.delegation_count(view.id()), 0);
    stage.dispatch(icon, "click").unwrap();
    assert_eq!(clicks.get(), 1);
}

#[test]
fn test_stop_propagation_halts_outer_handlers() {
    let stage = Stage::with_defaults();
    let inner_clicks = Rc::new(Cell::new(0));
    let outer_clicks = Rc::new(Cell::new(0));

    let outer = stage.create_view(
        Rc::new(Clicker {
            clicks: Rc::clone(&outer_clicks),
            stop: false,
        }),
        ViewInit::new(),
    );
    outer.render().unwrap();
    let inner = stage.create_view(
        Rc::new(Clicker {
            clicks: Rc::clone(&inner_clicks),
            stop: true,
        }),
        ViewInit::new(),
    );
    outer.render_subview(&inner, ".save").unwrap();

    let icon = inner.query(".icon").unwrap();
    let event = stage.dispatch(icon, "click").unwrap();
    assert!(event.is_propagation_stopped());
    assert_eq!(inner_clicks.get(), 1);
    assert_eq!(outer_clicks.get(), 0);
}
