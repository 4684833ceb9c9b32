//! Components - user render functions with a stable identity.
//!
//! Two seeds render the same component only if they carry clones of the same
//! [`Component`]: identity is the allocation, never the name. Define a
//! component once and clone it wherever it is used.
//!
//! ```ignore
//! let greeting = Component::new("Greeting", |_scope, props, _children| {
//!     let name = props.get("name").cloned().unwrap_or_default();
//!     native("p").child(format!("hello {name}")).into()
//! });
//!
//! root.render(greeting.seed().prop("name", "ada"))?;
//! ```

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use crate::engine::{Node, SeedBuilder, SeedKind};
use crate::hooks::Scope;
use crate::types::Props;

use super::types::RenderFn;

struct Inner {
    name: Cow<'static, str>,
    render: RenderFn,
}

/// A named render function.
#[derive(Clone)]
pub struct Component(Rc<Inner>);

impl Component {
    pub fn new<F>(name: impl Into<Cow<'static, str>>, render: F) -> Self
    where
        F: Fn(&mut Scope<'_>, &Props, &[Node]) -> Node + 'static,
    {
        Self(Rc::new(Inner {
            name: name.into(),
            render: Box::new(render),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Start a seed rendered by this component.
    pub fn seed(&self) -> SeedBuilder {
        SeedBuilder::new(SeedKind::Custom(self.clone()))
    }

    /// Same component (same allocation).
    pub fn ptr_eq(&self, other: &Component) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn render(&self, scope: &mut Scope<'_>, props: &Props, children: &[Node]) -> Node {
        (self.0.render)(scope, props, children)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({})", self.0.name)
    }
}
