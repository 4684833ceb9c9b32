//! Seeds and Nodes - the per-pass description of what a slot renders.
//!
//! A [`Node`] is whatever the authoring layer hands over: nothing, a literal,
//! a built [`Seed`], or a list. Normalization turns every Node into a Seed so
//! each child-list slot can be diffed the same way:
//!
//! ```text
//! Node::Empty / Text / Int / Float  →  Plain seed { value }
//! Node::List([...])                 →  Fragment seed, children = the list
//! Node::Seed(seed)                  →  seed (same allocation)
//! ```
//!
//! Seeds are immutable once built and are rebuilt every pass.

use std::fmt;
use std::rc::Rc;

use crate::primitives::Component;
use crate::types::{Key, NativeType, PLAIN_VALUE, Props, Value};

use super::ElementId;

// =============================================================================
// Seed
// =============================================================================

/// What renders a seed: a user component or a host primitive.
#[derive(Debug, Clone)]
pub enum SeedKind {
    Custom(Component),
    Native(NativeType),
}

impl SeedKind {
    /// Underlying type identity. Components compare by allocation, native
    /// types by tag.
    pub fn same_type(&self, other: &SeedKind) -> bool {
        match (self, other) {
            (SeedKind::Custom(a), SeedKind::Custom(b)) => a.ptr_eq(b),
            (SeedKind::Native(a), SeedKind::Native(b)) => a == b,
            _ => false,
        }
    }
}

/// Immutable, normalized description of one slot.
pub struct Seed {
    kind: SeedKind,
    key: Option<Key>,
    props: Rc<Props>,
    children: Rc<[Node]>,
    owner: Option<ElementId>,
}

impl Seed {
    pub fn kind(&self) -> &SeedKind {
        &self.kind
    }

    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    pub fn props(&self) -> &Rc<Props> {
        &self.props
    }

    pub fn children(&self) -> &Rc<[Node]> {
        &self.children
    }

    /// Element whose render built this seed, when recorded.
    pub fn owner(&self) -> Option<ElementId> {
        self.owner
    }

    pub fn is_custom(&self) -> bool {
        matches!(self.kind, SeedKind::Custom(_))
    }

    pub fn native_type(&self) -> Option<&NativeType> {
        match &self.kind {
            SeedKind::Native(native_type) => Some(native_type),
            SeedKind::Custom(_) => None,
        }
    }

    pub fn is_plain(&self) -> bool {
        self.native_type().is_some_and(NativeType::is_plain)
    }

    pub fn same_type(&self, other: &Seed) -> bool {
        self.kind.same_type(&other.kind)
    }

    /// Literal leaf carrying `value` as its only prop.
    pub(crate) fn plain(value: Value) -> Rc<Seed> {
        let mut props = Props::new();
        props.insert(PLAIN_VALUE, value);
        Rc::new(Seed {
            kind: SeedKind::Native(NativeType::Plain),
            key: None,
            props: Rc::new(props),
            children: Rc::from(Vec::new()),
            owner: None,
        })
    }

    /// Fragment wrapping an existing child list without copying it.
    pub(crate) fn fragment(children: Rc<[Node]>) -> Rc<Seed> {
        Rc::new(Seed {
            kind: SeedKind::Native(NativeType::Fragment),
            key: None,
            props: Rc::new(Props::new()),
            children,
            owner: None,
        })
    }

    /// The seed the root container carries for a given child list.
    pub(crate) fn container(children: Rc<[Node]>) -> Rc<Seed> {
        Rc::new(Seed {
            kind: SeedKind::Native(NativeType::Container),
            key: None,
            props: Rc::new(Props::new()),
            children,
            owner: None,
        })
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seed")
            .field("kind", &self.kind)
            .field("key", &self.key)
            .field("props", &self.props)
            .field("children", &self.children.len())
            .finish()
    }
}

// =============================================================================
// SeedBuilder
// =============================================================================

/// Builds a [`Seed`]. Obtain one from [`native`](crate::native),
/// [`fragment`](crate::fragment) or [`Component::seed`].
///
/// # Example
///
/// ```ignore
/// let item = native("li")
///     .key(7)
///     .prop("class", "done")
///     .child("write the docs");
/// ```
#[derive(Debug)]
pub struct SeedBuilder {
    kind: SeedKind,
    key: Option<Key>,
    props: Props,
    children: Vec<Node>,
    owner: Option<ElementId>,
}

impl SeedBuilder {
    pub fn new(kind: SeedKind) -> Self {
        Self {
            kind,
            key: None,
            props: Props::new(),
            children: Vec::new(),
            owner: None,
        }
    }

    /// Stable identity within the sibling list.
    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn prop(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.props.insert(name, value);
        self
    }

    /// Replace all props at once.
    pub fn props(mut self, props: Props) -> Self {
        self.props = props;
        self
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn children<I, N>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        self.children.extend(nodes.into_iter().map(Into::into));
        self
    }

    pub fn owner(mut self, owner: ElementId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn build(self) -> Rc<Seed> {
        Rc::new(Seed {
            kind: self.kind,
            key: self.key,
            props: Rc::new(self.props),
            children: Rc::from(self.children),
            owner: self.owner,
        })
    }
}

// =============================================================================
// Node
// =============================================================================

/// Raw render input.
#[derive(Debug, Clone, Default)]
pub enum Node {
    /// Absent / false / none. Renders as an empty Plain leaf.
    #[default]
    Empty,
    Text(Rc<str>),
    Int(i64),
    Float(f64),
    Seed(Rc<Seed>),
    List(Rc<[Node]>),
}

impl Node {
    /// Raw-node identity used to skip unchanged children.
    ///
    /// Literals compare by value (floats bitwise), seeds and lists by
    /// allocation.
    pub fn same(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Empty, Node::Empty) => true,
            (Node::Text(a), Node::Text(b)) => Rc::ptr_eq(a, b) || a == b,
            (Node::Int(a), Node::Int(b)) => a == b,
            (Node::Float(a), Node::Float(b)) => a.to_bits() == b.to_bits(),
            (Node::Seed(a), Node::Seed(b)) => Rc::ptr_eq(a, b),
            (Node::List(a), Node::List(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Normalize into a seed.
    pub fn to_seed(&self) -> Rc<Seed> {
        match self {
            Node::Empty => Seed::plain(Value::None),
            Node::Text(text) => Seed::plain(Value::Str(text.clone())),
            Node::Int(i) => Seed::plain(Value::Int(*i)),
            Node::Float(x) => Seed::plain(Value::Float(*x)),
            Node::Seed(seed) => seed.clone(),
            Node::List(list) => Seed::fragment(list.clone()),
        }
    }

    /// Build a list node.
    pub fn list<I, N>(nodes: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        Node::List(nodes.into_iter().map(Into::into).collect())
    }
}

/// Element-wise [`Node::same`].
pub(crate) fn same_children(a: &[Node], b: &[Node]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same(y))
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::Text(Rc::from(value))
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::Text(Rc::from(value))
    }
}

impl From<Rc<str>> for Node {
    fn from(value: Rc<str>) -> Self {
        Node::Text(value)
    }
}

impl From<i32> for Node {
    fn from(value: i32) -> Self {
        Node::Int(value as i64)
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Node::Int(value)
    }
}

impl From<usize> for Node {
    fn from(value: usize) -> Self {
        Node::Int(value as i64)
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Node::Float(value)
    }
}

impl From<Rc<Seed>> for Node {
    fn from(value: Rc<Seed>) -> Self {
        Node::Seed(value)
    }
}

impl From<SeedBuilder> for Node {
    fn from(value: SeedBuilder) -> Self {
        Node::Seed(value.build())
    }
}

impl From<Vec<Node>> for Node {
    fn from(value: Vec<Node>) -> Self {
        Node::List(Rc::from(value))
    }
}

impl<T: Into<Node>> From<Option<T>> for Node {
    fn from(value: Option<T>) -> Self {
        value.map_or(Node::Empty, Into::into)
    }
}
