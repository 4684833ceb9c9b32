//! End-to-end reconciliation against the in-memory host.
//!
//! Every test renders through a Root, applies the instruction log with an
//! Applier and checks what the host ended up with: markup, node identity,
//! and the exact instructions a pass produced.
//!
//! Run with: cargo test --test reconcile

use std::cell::Cell;
use std::rc::Rc;

use spark_reconciler::{
    Applier, ApplyError, Component, Error, HostId, Instruction, InstructionKind, MemoryRenderer,
    Node, Root, Value, count_kind, fragment, native, plain,
};

// =============================================================================
// HARNESS
// =============================================================================

struct Harness {
    root: Root,
    applier: Applier<MemoryRenderer>,
}

impl Harness {
    fn new() -> Self {
        let root = Root::new();
        let host = MemoryRenderer::new();
        let mount = host.root();
        let applier = Applier::new(host, root.container(), mount);
        Self { root, applier }
    }

    /// Render, apply, and hand back the instructions of the pass.
    fn render(&mut self, node: impl Into<Node>) -> Vec<Instruction> {
        self.root.render(node).unwrap();
        self.apply()
    }

    fn apply(&mut self) -> Vec<Instruction> {
        let instructions = self.root.take_instructions();
        self.applier.apply(instructions.clone()).unwrap();
        self.applier.retain_live(&self.root);
        instructions
    }

    fn markup(&self) -> String {
        self.applier.renderer().to_markup()
    }

    /// Host node of the first mounted element.
    fn host_of_top(&self) -> HostId {
        *self.applier.handle(self.root.mounted()[0]).unwrap()
    }

    /// Host node of the first mounted element's n-th child.
    fn host_child(&self, index: usize) -> HostId {
        let top = self.root.mounted()[0];
        let child = self.root.element(top).unwrap().child_elements()[index];
        *self.applier.handle(child).unwrap()
    }
}

fn list(items: &[&str]) -> Node {
    native("ul")
        .children(items.iter().map(|&item| native("li").key(item).child(item)))
        .into()
}

// =============================================================================
// IDENTITY
// =============================================================================

#[test]
fn test_first_render_builds_host_tree() {
    let mut h = Harness::new();
    h.render(native("div").prop("id", "app").children([
        Node::from(native("h1").child("Title")),
        Node::from("body text"),
        Node::from(native("br")),
    ]));

    assert_eq!(h.markup(), "<div id=\"app\"><h1>Title</h1>body text<br></br></div>");
}

#[test]
fn test_rerender_of_equal_tree_is_silent() {
    let mut h = Harness::new();
    let tree = || native("div").prop("class", "x").children([native("span").child(1)]);
    h.render(tree());

    let second = h.render(tree());
    assert!(second.is_empty(), "equal tree produced {second:?}");

    // The very same node: nothing is even compared below the top.
    let node: Node = tree().into();
    h.render(node.clone());
    assert!(h.render(node).is_empty());
}

#[test]
fn test_keyed_reorder_moves_host_nodes() {
    let mut h = Harness::new();
    h.render(list(&["a", "b", "c", "d"]));
    let before: Vec<HostId> = (0..4).map(|i| h.host_child(i)).collect();

    let instructions = h.render(list(&["d", "a", "b", "c"]));

    assert_eq!(h.markup(), "<ul><li>d</li><li>a</li><li>b</li><li>c</li></ul>");
    assert_eq!(h.host_child(0), before[3], "d keeps its host node");
    assert_eq!(h.host_child(1), before[0]);
    assert_eq!(count_kind(&instructions, InstructionKind::CreateNode), 0);
    assert_eq!(count_kind(&instructions, InstructionKind::PreinsertNode), 1, "one move for one displaced item");
}

#[test]
fn test_keyed_insert_remove() {
    let mut h = Harness::new();
    h.render(list(&["a", "b", "c"]));
    let a = h.host_child(0);

    let instructions = h.render(list(&["x", "a", "c"]));

    assert_eq!(h.markup(), "<ul><li>x</li><li>a</li><li>c</li></ul>");
    assert_eq!(h.host_child(1), a);
    assert_eq!(count_kind(&instructions, InstructionKind::RemoveNode), 1);
    assert_eq!(count_kind(&instructions, InstructionKind::ReplaceNode), 0);
}

#[test]
fn test_type_change_replaces_in_place() {
    let mut h = Harness::new();
    h.render(native("div").children([native("a"), native("b"), native("c")]));

    let instructions = h.render(native("div").children([native("a"), native("i"), native("c")]));

    assert_eq!(h.markup(), "<div><a></a><i></i><c></c></div>");
    assert_eq!(count_kind(&instructions, InstructionKind::ReplaceNode), 1);
    assert_eq!(count_kind(&instructions, InstructionKind::RemoveNode), 0);
    assert_eq!(count_kind(&instructions, InstructionKind::PreinsertNode), 0, "replace keeps the position");
}

// =============================================================================
// PLAIN RUNS
// =============================================================================

#[test]
fn test_shrinking_literal_run() {
    let mut h = Harness::new();
    h.render(native("p").children(["a", "b", "c"]));

    let instructions = h.render(native("p").children(["a", "b"]));

    assert_eq!(h.markup(), "<p>ab</p>");
    assert_eq!(instructions.len(), 1, "only the trailing literal goes: {instructions:?}");
    assert_eq!(instructions[0].kind(), InstructionKind::RemoveNode);
}

#[test]
fn test_literal_edit_is_an_attribute_write() {
    let mut h = Harness::new();
    h.render(native("p").children(["count: ", "1"]));
    let literal = h.host_child(1);

    let instructions = h.render(native("p").children(["count: ", "2"]));

    assert_eq!(h.markup(), "<p>count: 2</p>");
    assert_eq!(h.host_child(1), literal);
    assert_eq!(instructions.len(), 1);
    assert_eq!(instructions[0].kind(), InstructionKind::SetAttribute);
}

#[test]
fn test_literals_give_way_to_element() {
    let mut h = Harness::new();
    h.render(native("p").children(["a", "b", "c"]));

    let instructions = h.render(native("p").child(native("hr")));

    assert_eq!(h.markup(), "<p><hr></hr></p>");
    assert_eq!(count_kind(&instructions, InstructionKind::RemoveNode), 3);
    assert_eq!(count_kind(&instructions, InstructionKind::ReplaceNode), 0);
}

#[test]
fn test_element_gives_way_to_literals() {
    let mut h = Harness::new();
    h.render(native("p").child(native("hr")));

    h.render(native("p").children(["a", "b", "c"]));
    assert_eq!(h.markup(), "<p>abc</p>");

    h.render(native("p").children([Node::from("a"), Node::from(native("hr")), Node::from("c")]));
    assert_eq!(h.markup(), "<p>a<hr></hr>c</p>");
}

#[test]
fn test_keyed_literal_and_none() {
    let mut h = Harness::new();
    h.render(native("p").children([
        Node::from(plain("x").key("k")),
        Node::from(plain(Value::None)),
        Node::from(Option::<&str>::None),
    ]));
    assert_eq!(h.markup(), "<p>x</p>");
}

// =============================================================================
// ATTRIBUTES
// =============================================================================

#[test]
fn test_attribute_diff() {
    let mut h = Harness::new();
    h.render(native("input").prop("class", "x").prop("id", "name"));
    let input = h.host_of_top();

    let instructions = h.render(native("input").prop("class", "y").prop("title", "t"));

    let target = h.root.mounted()[0];
    assert_eq!(
        instructions,
        vec![
            Instruction::SetAttribute {
                target,
                name: Rc::from("class"),
                value: Value::from("y"),
            },
            Instruction::SetAttribute {
                target,
                name: Rc::from("title"),
                value: Value::from("t"),
            },
            Instruction::RemoveAttribute {
                target,
                name: Rc::from("id"),
            },
        ]
    );
    let host = h.applier.renderer();
    assert_eq!(host.attribute(input, "class"), Some(&Value::from("y")));
    assert_eq!(host.attribute(input, "id"), None);
}

#[test]
fn test_opaque_values_compare_by_identity() {
    let mut h = Harness::new();
    let handler = Value::opaque(|| ());
    h.render(native("button").prop("onclick", handler.clone()));

    assert!(h.render(native("button").prop("onclick", handler)).is_empty());
    let fresh = h.render(native("button").prop("onclick", Value::opaque(|| ())));
    assert_eq!(count_kind(&fresh, InstructionKind::SetAttribute), 1);
}

// =============================================================================
// COMPONENTS
// =============================================================================

#[test]
fn test_component_output_and_bail_out() {
    let renders = Rc::new(Cell::new(0));
    let counter = renders.clone();
    let badge = Component::new("Badge", move |_, props, _| {
        counter.set(counter.get() + 1);
        let label = props.get("label").cloned().unwrap_or_default();
        native("em").child(label.to_string()).into()
    });

    let mut h = Harness::new();
    let page = |label: &str, title: &str| {
        native("div").children([
            Node::from(native("h1").child(title.to_string())),
            Node::from(badge.seed().prop("label", label)),
        ])
    };

    h.render(page("new", "Inbox"));
    assert_eq!(h.markup(), "<div><h1>Inbox</h1><em>new</em></div>");

    h.render(page("new", "Archive"));
    assert_eq!(renders.get(), 1, "equal props skip the render");
    assert_eq!(h.markup(), "<div><h1>Archive</h1><em>new</em></div>");

    h.render(page("old", "Archive"));
    assert_eq!(renders.get(), 2);
    assert_eq!(h.markup(), "<div><h1>Archive</h1><em>old</em></div>");
}

#[test]
fn test_component_switching_output_type() {
    let view = Component::new("View", |_, props, _| {
        if props.get("editing") == Some(&Value::Bool(true)) {
            native("input").prop("value", "draft").into()
        } else {
            native("span").child("draft").into()
        }
    });

    let mut h = Harness::new();
    h.render(native("div").children([Node::from(view.seed().prop("editing", false)), Node::from(native("hr"))]));

    let instructions = h.render(native("div").children([
        Node::from(view.seed().prop("editing", true)),
        Node::from(native("hr")),
    ]));

    assert_eq!(h.markup(), "<div><input value=\"draft\"></input><hr></hr></div>");
    assert_eq!(count_kind(&instructions, InstructionKind::ReplaceNode), 1);
    assert_eq!(count_kind(&instructions, InstructionKind::RemoveNode), 0);
}

#[test]
fn test_component_children_are_passed_through() {
    let card = Component::new("Card", |_, _, children| {
        native("section").children(children.iter().cloned()).into()
    });

    let mut h = Harness::new();
    h.render(card.seed().child(native("p").child("one")).child("two"));
    assert_eq!(h.markup(), "<section><p>one</p>two</section>");

    h.render(card.seed().child("three"));
    assert_eq!(h.markup(), "<section>three</section>");
}

#[test]
fn test_fragment_children_render_inline() {
    let mut h = Harness::new();
    h.render(native("ul").child(fragment([native("li").child(1), native("li").child(2)])));
    assert_eq!(h.markup(), "<ul><li>1</li><li>2</li></ul>");
}

// =============================================================================
// ERRORS / LIFECYCLE
// =============================================================================

#[test]
fn test_conditional_hook_is_rejected() {
    let flag = Rc::new(Cell::new(false));
    let seen = flag.clone();
    let shifty = Component::new("Shifty", move |scope, _, _| {
        if seen.get() {
            scope.use_state((), || 0);
        }
        native("i").into()
    });

    let mut root = Root::new();
    root.render(shifty.seed().prop("n", 1)).unwrap();

    flag.set(true);
    let result = root.render(shifty.seed().prop("n", 2));
    assert!(matches!(result, Err(Error::InvalidHook { slot: 0, .. })));
}

#[test]
fn test_unmount_clears_host_and_arena() {
    let mut h = Harness::new();
    h.render(list(&["a", "b"]));
    assert!(h.root.element_count() > 1);

    h.root.unmount().unwrap();
    let instructions = h.apply();

    assert_eq!(h.markup(), "");
    assert_eq!(instructions.len(), 1, "one removal for the whole subtree");
    assert_eq!(h.root.element_count(), 1, "only the container is left");
    assert_eq!(h.applier.renderer().node_count(), 1);
    assert_eq!(h.applier.len(), 1);
}

#[test]
fn test_applier_rejects_unknown_elements() {
    let mut root = Root::new();
    root.render(native("div")).unwrap();
    let created = root.take_instructions();

    // Skipping the creation leaves the applier without a handle.
    let host = MemoryRenderer::new();
    let mount = host.root();
    let mut applier = Applier::new(host, root.container(), mount);
    let placement: Vec<Instruction> = created
        .into_iter()
        .filter(|i| i.kind() != InstructionKind::CreateNode)
        .collect();

    let div = root.mounted()[0];
    assert_eq!(applier.apply(placement), Err(ApplyError::UnknownElement(div)));
}

#[test]
fn test_instruction_log_survives_across_passes() {
    let mut root = Root::new();
    root.render(native("a")).unwrap();
    root.render(native("b")).unwrap();
    let log = root.take_instructions();

    let host = MemoryRenderer::new();
    let mount = host.root();
    let mut applier = Applier::new(host, root.container(), mount);
    let applied = applier.apply(log.iter().cloned()).unwrap();

    assert_eq!(applied, log.len());
    assert_eq!(applier.renderer().to_markup(), "<b></b>");
}
