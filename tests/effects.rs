//! Hooks and scheduling end to end.
//!
//! Effects run from the queue, never inside a render; cleanups run before
//! the next setup of the same call site and on teardown. Async setups are
//! driven by the drain loop through their wakers.
//!
//! Run with: cargo test --test effects

use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::oneshot;

use spark_reconciler::{
    Applier, Cleanup, Component, EffectKind, EffectOptions, MemoryRenderer, Priority, Root, Setup,
    State, StateKind, StateOptions, native,
};

// =============================================================================
// HELPERS
// =============================================================================

type Log = Rc<RefCell<Vec<String>>>;

fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

/// Logs setup and cleanup of one effect keyed by the `id` prop.
fn watcher(log: &Log, name: &'static str) -> Component {
    let log = log.clone();
    Component::new(name, move |scope, props, children| {
        let id = props.get("id").and_then(|v| v.as_int()).unwrap_or(0);
        let log = log.clone();
        scope.use_effect(id, move |id| {
            log.borrow_mut().push(format!("setup {name} {id}"));
            let id = *id;
            Setup::cleanup(move || log.borrow_mut().push(format!("cleanup {name} {id}")))
        });
        native("div").children(children.iter().cloned()).into()
    })
}

// =============================================================================
// SYNCHRONOUS EFFECTS
// =============================================================================

#[test]
fn test_effects_run_from_the_queue() {
    let log = log();
    let watcher = watcher(&log, "w");
    let mut root = Root::new();

    root.render(watcher.seed().prop("id", 1)).unwrap();
    assert!(entries(&log).is_empty(), "render never runs setups");
    assert_eq!(root.pending_tasks_at(Priority::Minimum), 1);

    assert_eq!(root.drain().unwrap(), 1);
    assert_eq!(entries(&log), ["setup w 1"]);
}

#[test]
fn test_cleanup_precedes_next_setup() {
    let log = log();
    let watcher = watcher(&log, "w");
    let mut root = Root::new();

    root.render(watcher.seed().prop("id", 1)).unwrap();
    root.drain().unwrap();
    root.render(watcher.seed().prop("id", 2)).unwrap();
    root.drain().unwrap();

    assert_eq!(entries(&log), ["setup w 1", "cleanup w 1", "setup w 2"]);
}

#[test]
fn test_unchanged_params_skip_setup() {
    let log = log();
    let watcher = watcher(&log, "w");
    let mut root = Root::new();

    root.render(watcher.seed().prop("id", 1).prop("label", "a")).unwrap();
    root.drain().unwrap();
    root.render(watcher.seed().prop("id", 1).prop("label", "b")).unwrap();

    assert_eq!(root.drain().unwrap(), 0);
    assert_eq!(entries(&log), ["setup w 1"]);
}

#[test]
fn test_newer_request_replaces_pending_run() {
    let log = log();
    let watcher = watcher(&log, "w");
    let mut root = Root::new();

    root.render(watcher.seed().prop("id", 1)).unwrap();
    root.render(watcher.seed().prop("id", 2)).unwrap();
    assert_eq!(root.pending_tasks(), 1, "one pending run per call site");

    root.drain().unwrap();
    assert_eq!(entries(&log), ["setup w 2"]);
}

#[test]
fn test_effect_kinds() {
    let log = log();
    let sink = log.clone();
    let probe = Component::new("Probe", move |scope, _, _| {
        for (kind, name) in [
            (EffectKind::Default, "default"),
            (EffectKind::Once, "once"),
            (EffectKind::Always, "always"),
        ] {
            let sink = sink.clone();
            scope.use_effect_with(EffectOptions::default().kind(kind), (), move |_| {
                sink.borrow_mut().push(name.to_string());
                Setup::none()
            });
        }
        native("span").into()
    });

    let mut root = Root::new();
    for n in 0..3 {
        root.render(probe.seed().prop("n", n)).unwrap();
        root.drain().unwrap();
    }

    let seen = entries(&log);
    let count = |name: &str| seen.iter().filter(|e| *e == name).count();
    assert_eq!(count("default"), 1);
    assert_eq!(count("once"), 1);
    assert_eq!(count("always"), 3);
}

#[test]
fn test_realtime_effect_runs_with_the_render() {
    let log = log();
    let sink = log.clone();
    let eager = Component::new("Eager", move |scope, _, _| {
        let sink = sink.clone();
        let options = EffectOptions::default().priority(Priority::Realtime);
        scope.use_effect_with(options, (), move |_| {
            sink.borrow_mut().push("setup".to_string());
            Setup::none()
        });
        native("span").into()
    });

    let mut root = Root::new();
    root.render(eager.seed()).unwrap();

    assert_eq!(entries(&log), ["setup"]);
    assert_eq!(root.pending_tasks(), 0);
}

#[test]
fn test_disabled_effect_never_runs() {
    let log = log();
    let sink = log.clone();
    let idle = Component::new("Idle", move |scope, _, _| {
        let sink = sink.clone();
        let options = EffectOptions::default().priority(Priority::Disabled);
        scope.use_effect_with(options, (), move |_| {
            sink.borrow_mut().push("setup".to_string());
            Setup::none()
        });
        native("span").into()
    });

    let mut root = Root::new();
    root.render(idle.seed()).unwrap();
    root.drain().unwrap();
    assert!(entries(&log).is_empty());
}

#[test]
fn test_failed_setup_is_reported_not_raised() {
    let flaky = Component::new("Flaky", |scope, _, _| {
        scope.use_effect((), |_| Setup::failed("connection refused"));
        native("span").into()
    });

    let mut root = Root::new();
    root.render(flaky.seed()).unwrap();
    assert!(root.drain().is_ok());

    let errors = root.take_effect_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "connection refused");
    assert_eq!(errors[0].slot, 0);
    assert_eq!(errors[0].element, root.mounted()[0]);
    assert!(root.take_effect_errors().is_empty(), "errors are handed out once");
}

// =============================================================================
// TEARDOWN
// =============================================================================

#[test]
fn test_teardown_cleans_up_children_first() {
    let log = log();
    let outer = watcher(&log, "outer");
    let inner = watcher(&log, "inner");
    let mut root = Root::new();

    root.render(outer.seed().prop("id", 1).child(inner.seed().prop("id", 2))).unwrap();
    root.drain().unwrap();
    log.borrow_mut().clear();

    root.unmount().unwrap();
    assert_eq!(entries(&log), ["cleanup inner 2", "cleanup outer 1"]);
}

#[test]
fn test_replaced_output_cleans_up_before_replace() {
    let log = log();
    let leaf = watcher(&log, "leaf");
    let switch = Component::new("Switch", move |_, props, _| {
        if props.get("on").and_then(|v| v.as_int()) == Some(1) {
            native("p").into()
        } else {
            leaf.seed().prop("id", 7).into()
        }
    });

    let mut root = Root::new();
    let host = MemoryRenderer::new();
    let mount = host.root();
    let mut applier = Applier::new(host, root.container(), mount);

    root.render(switch.seed().prop("on", 0)).unwrap();
    root.drain().unwrap();
    applier.apply(root.take_instructions()).unwrap();
    assert_eq!(applier.renderer().to_markup(), "<div></div>");

    root.render(switch.seed().prop("on", 1)).unwrap();
    assert_eq!(entries(&log), ["setup leaf 7", "cleanup leaf 7"]);

    applier.apply(root.take_instructions()).unwrap();
    assert_eq!(applier.renderer().to_markup(), "<p></p>");
}

#[test]
fn test_pending_effect_of_removed_element_is_dropped() {
    let log = log();
    let watcher = watcher(&log, "w");
    let mut root = Root::new();

    root.render(watcher.seed().prop("id", 1)).unwrap();
    root.unmount().unwrap();

    assert_eq!(root.pending_tasks(), 0);
    root.drain().unwrap();
    assert!(entries(&log).is_empty());
}

// =============================================================================
// STATE
// =============================================================================

fn stateful(cell: &Rc<RefCell<Option<State<i64>>>>, options: StateOptions) -> Component {
    let cell = cell.clone();
    Component::new("Stateful", move |scope, _, _| {
        let value = scope.use_state_with(options, (), || 0i64);
        let shown = value.get();
        *cell.borrow_mut() = Some(value);
        native("output").child(shown).into()
    })
}

fn harness() -> (Root, Applier<MemoryRenderer>) {
    let root = Root::new();
    let host = MemoryRenderer::new();
    let mount = host.root();
    let applier = Applier::new(host, root.container(), mount);
    (root, applier)
}

#[test]
fn test_state_updates_batch_into_one_evaluation() {
    let cell = Rc::new(RefCell::new(None));
    let component = stateful(&cell, StateOptions::default());
    let (mut root, mut applier) = harness();

    root.render(component.seed()).unwrap();
    applier.apply(root.take_instructions()).unwrap();

    let state = cell.borrow().clone().unwrap();
    state.set(1);
    state.update(|v| v + 1);
    state.update(|v| v + 1);

    assert_eq!(root.drain().unwrap(), 1);
    applier.apply(root.take_instructions()).unwrap();
    assert_eq!(applier.renderer().to_markup(), "<output>3</output>");
}

#[test]
fn test_silent_state_does_not_rerender() {
    let cell = Rc::new(RefCell::new(None));
    let component = stateful(&cell, StateOptions::default().silent());
    let (mut root, _) = harness();

    root.render(component.seed()).unwrap();
    let state = cell.borrow().clone().unwrap();
    assert!(state.set(5));

    assert_eq!(root.drain().unwrap(), 0);
    assert_eq!(state.get(), 5);
}

#[test]
fn test_state_priority_orders_the_queue() {
    let urgent_cell = Rc::new(RefCell::new(None));
    let lazy_cell = Rc::new(RefCell::new(None));
    let urgent = stateful(&urgent_cell, StateOptions::default().priority(Priority::User));
    let lazy = stateful(&lazy_cell, StateOptions::default());
    let (mut root, _) = harness();

    root.render(native("main").children([lazy.seed().key("lazy"), urgent.seed().key("urgent")]))
        .unwrap();
    lazy_cell.borrow().clone().unwrap().set(1);
    urgent_cell.borrow().clone().unwrap().set(1);

    root.flush_updates().unwrap();
    assert_eq!(root.pending_tasks_at(Priority::User), 1);
    assert_eq!(root.pending_tasks_at(Priority::Minimum), 1);

    assert!(root.run_next().unwrap());
    assert_eq!(root.pending_tasks_at(Priority::User), 0, "the urgent update ran first");
    assert_eq!(root.pending_tasks_at(Priority::Minimum), 1);
}

#[test]
fn test_state_reinitializes_when_params_change() {
    let cell: Rc<RefCell<Option<State<i64>>>> = Rc::new(RefCell::new(None));
    let sink = cell.clone();
    let paged = Component::new("Paged", move |scope, props, _| {
        let page = props.get("page").and_then(|v| v.as_int()).unwrap_or(0);
        let options = StateOptions::default().kind(StateKind::Default);
        let offset = scope.use_state_with(options, page, || page * 10);
        *sink.borrow_mut() = Some(offset.clone());
        native("span").child(offset.get()).into()
    });

    let mut root = Root::new();
    root.render(paged.seed().prop("page", 1)).unwrap();
    cell.borrow().clone().unwrap().set(15);
    root.drain().unwrap();
    assert_eq!(cell.borrow().clone().unwrap().get(), 15, "same params keep the value");

    root.render(paged.seed().prop("page", 2)).unwrap();
    assert_eq!(cell.borrow().clone().unwrap().get(), 20);
}

// =============================================================================
// ASYNC EFFECTS
// =============================================================================

type Gate = Rc<RefCell<Option<oneshot::Receiver<()>>>>;

/// First setup waits on the gate, later ones finish synchronously.
fn gated(log: &Log, gate: &Gate) -> Component {
    let (log, gate) = (log.clone(), gate.clone());
    Component::new("Gated", move |scope, props, _| {
        let id = props.get("id").and_then(|v| v.as_int()).unwrap_or(0);
        let (log, gate) = (log.clone(), gate.clone());
        scope.use_effect(id, move |id| {
            let id = *id;
            log.borrow_mut().push(format!("start {id}"));
            match gate.borrow_mut().take() {
                Some(receiver) => Setup::future(async move {
                    if receiver.await.is_err() {
                        return Err("gate dropped".to_string());
                    }
                    let cleanup: Cleanup = Box::new(move || log.borrow_mut().push(format!("cleanup {id}")));
                    Ok(Some(cleanup))
                }),
                None => Setup::none(),
            }
        });
        native("span").into()
    })
}

#[test]
fn test_runs_wait_for_in_flight_setup() {
    let log = log();
    let (sender, receiver) = oneshot::channel();
    let gate: Gate = Rc::new(RefCell::new(Some(receiver)));
    let component = gated(&log, &gate);
    let mut root = Root::new();

    root.render(component.seed().prop("id", 1)).unwrap();
    root.drain().unwrap();
    assert_eq!(root.in_flight_effects(), 1);

    root.render(component.seed().prop("id", 2)).unwrap();
    root.drain().unwrap();
    assert_eq!(entries(&log), ["start 1"], "second run waits");

    sender.send(()).unwrap();
    root.drain().unwrap();

    assert_eq!(root.in_flight_effects(), 0);
    assert_eq!(entries(&log), ["start 1", "cleanup 1", "start 2"]);
}

#[test]
fn test_late_setup_of_removed_element_cleans_up() {
    let log = log();
    let (sender, receiver) = oneshot::channel();
    let gate: Gate = Rc::new(RefCell::new(Some(receiver)));
    let component = gated(&log, &gate);
    let mut root = Root::new();

    root.render(component.seed().prop("id", 1)).unwrap();
    root.drain().unwrap();
    root.unmount().unwrap();
    assert_eq!(entries(&log), ["start 1"]);

    sender.send(()).unwrap();
    assert_eq!(root.poll_effects(), 1);
    assert_eq!(entries(&log), ["start 1", "cleanup 1"]);
    assert_eq!(root.in_flight_effects(), 0);
}

#[test]
fn test_failed_async_setup_is_reported() {
    let log = log();
    let (sender, receiver) = oneshot::channel::<()>();
    let gate: Gate = Rc::new(RefCell::new(Some(receiver)));
    let component = gated(&log, &gate);
    let mut root = Root::new();

    root.render(component.seed().prop("id", 1)).unwrap();
    root.drain().unwrap();
    drop(sender);
    root.drain().unwrap();

    let errors = root.take_effect_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "gate dropped");
    assert_eq!(root.in_flight_effects(), 0);
}
