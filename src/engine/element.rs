//! Elements - persistent nodes retained across passes.
//!
//! One Element mirrors one tree position. The reconciler mutates it in place
//! pass after pass; its identity only changes when the underlying type of the
//! position changes (replace-with-new-identity).
//!
//! # State transitions
//!
//! ```text
//! Default ──evaluate──▶ Attached ──state change──▶ Dirty
//!                          ▲                         │
//!                          └────────evaluate─────────┘
//! (any) ──teardown scheduled or performed──▶ Detached (terminal)
//! ```
//!
//! Relations (`parent`, `previous`, `next`, `output`, result records) are arena
//! ids, never owning pointers.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::hooks::HookSlot;
use crate::scheduler::TaskId;
use crate::types::{Key, Props, Value};

use super::seed::{Node, Seed};

slotmap::new_key_type! {
    /// Arena index of an [`Element`] inside its [`Root`](crate::Root).
    pub struct ElementId;
}

// =============================================================================
// Element State
// =============================================================================

/// Lifecycle state of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElementState {
    /// Created, never evaluated.
    #[default]
    Default,
    /// Evaluated and placed.
    Attached,
    /// Attached, but a state change requires another evaluation.
    Dirty,
    /// Torn down or scheduled for teardown. Terminal.
    Detached,
}

// =============================================================================
// Result Map
// =============================================================================

/// Identity of a child within its parent's result map.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum ChildKey {
    Explicit(Key),
    /// Ordinal among the unkeyed siblings.
    Implicit(usize),
}

impl ChildKey {
    pub(crate) fn is_implicit(&self) -> bool {
        matches!(self, ChildKey::Implicit(_))
    }
}

/// The raw node a child was last built from, and the element built for it.
#[derive(Debug, Clone)]
pub(crate) struct ResultRecord {
    pub node: Node,
    pub element: ElementId,
}

/// Insertion-ordered: iteration follows the order children were placed in.
pub(crate) type ResultMap = IndexMap<ChildKey, ResultRecord>;

// =============================================================================
// Kind-specific payload
// =============================================================================

pub(crate) struct CustomState {
    /// Element built from the last render output.
    pub output: Option<ElementId>,
    /// One slot per hook call site, in call order.
    pub hooks: Vec<HookSlot>,
}

pub(crate) struct NativeState {
    pub results: ResultMap,
    /// Attribute values last sent to the host.
    pub attributes: IndexMap<Rc<str>, Value>,
    /// Head of the live sibling list (host order of the children).
    pub first: Option<ElementId>,
}

pub(crate) enum ElementKind {
    Custom(CustomState),
    Native(NativeState),
}

// =============================================================================
// Element
// =============================================================================

/// A retained tree node.
pub struct Element {
    pub(crate) seed: Rc<Seed>,
    pub(crate) state: ElementState,
    pub(crate) parent: Option<ElementId>,
    pub(crate) previous: Option<ElementId>,
    pub(crate) next: Option<ElementId>,
    /// Pending evaluation task, at most one.
    pub(crate) evaluation: Option<TaskId>,
    /// Native element that physically represents this one on the host.
    pub(crate) host: Option<ElementId>,
    /// Props/children of the seed last evaluated.
    pub(crate) props: Option<Rc<Props>>,
    pub(crate) children: Option<Rc<[Node]>>,
    pub(crate) kind: ElementKind,
}

impl Element {
    pub(crate) fn new(seed: Rc<Seed>) -> Self {
        let kind = if seed.is_custom() {
            ElementKind::Custom(CustomState {
                output: None,
                hooks: Vec::new(),
            })
        } else {
            ElementKind::Native(NativeState {
                results: ResultMap::new(),
                attributes: IndexMap::new(),
                first: None,
            })
        };

        Self {
            seed,
            state: ElementState::Default,
            parent: None,
            previous: None,
            next: None,
            evaluation: None,
            host: None,
            props: None,
            children: None,
            kind,
        }
    }

    pub fn seed(&self) -> &Rc<Seed> {
        &self.seed
    }

    pub fn state(&self) -> ElementState {
        self.state
    }

    pub fn is_custom(&self) -> bool {
        matches!(self.kind, ElementKind::Custom(_))
    }

    pub fn is_attached(&self) -> bool {
        matches!(self.state, ElementState::Attached | ElementState::Dirty)
    }

    pub fn is_detached(&self) -> bool {
        self.state == ElementState::Detached
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn previous_sibling(&self) -> Option<ElementId> {
        self.previous
    }

    pub fn next_sibling(&self) -> Option<ElementId> {
        self.next
    }

    pub fn host(&self) -> Option<ElementId> {
        self.host
    }

    pub fn has_pending_evaluation(&self) -> bool {
        self.evaluation.is_some()
    }

    /// Rendered output of a custom element.
    pub fn output(&self) -> Option<ElementId> {
        match &self.kind {
            ElementKind::Custom(custom) => custom.output,
            ElementKind::Native(_) => None,
        }
    }

    /// Children of a native element in placement order.
    pub fn child_elements(&self) -> Vec<ElementId> {
        match &self.kind {
            ElementKind::Native(native) => native.results.values().map(|r| r.element).collect(),
            ElementKind::Custom(_) => Vec::new(),
        }
    }

    /// Attribute value last sent to the host.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        match &self.kind {
            ElementKind::Native(native) => native.attributes.get(name),
            ElementKind::Custom(_) => None,
        }
    }

    /// Number of hook slots registered by a custom element.
    pub fn hook_count(&self) -> usize {
        match &self.kind {
            ElementKind::Custom(custom) => custom.hooks.len(),
            ElementKind::Native(_) => 0,
        }
    }

    pub(crate) fn custom_mut(&mut self) -> Option<&mut CustomState> {
        match &mut self.kind {
            ElementKind::Custom(custom) => Some(custom),
            ElementKind::Native(_) => None,
        }
    }

    pub(crate) fn native(&self) -> Option<&NativeState> {
        match &self.kind {
            ElementKind::Native(native) => Some(native),
            ElementKind::Custom(_) => None,
        }
    }

    pub(crate) fn native_mut(&mut self) -> Option<&mut NativeState> {
        match &mut self.kind {
            ElementKind::Native(native) => Some(native),
            ElementKind::Custom(_) => None,
        }
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Element");
        s.field("kind", self.seed.kind())
            .field("state", &self.state)
            .field("parent", &self.parent)
            .field("host", &self.host);
        match &self.kind {
            ElementKind::Custom(custom) => {
                s.field("output", &custom.output).field("hooks", &custom.hooks.len());
            }
            ElementKind::Native(native) => {
                s.field("children", &native.results.len())
                    .field("attributes", &native.attributes.len());
            }
        }
        s.finish()
    }
}
