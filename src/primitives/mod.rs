//! Primitives - authoring building blocks.
//!
//! This module provides what render functions return:
//! - [`Component`] - user render function with a stable identity
//! - [`native`] - host primitive seed (`"div"`, `"box"`, ...)
//! - [`fragment`] - groups children without a tag of its own
//! - [`plain`] - literal leaf
//!
//! Bare literals convert into [`Node`]s directly, so `plain` is only needed
//! for a keyed literal:
//!
//! ```ignore
//! native("ul").children(items.iter().map(|item| {
//!     native("li").key(item.id).child(item.title.as_str())
//! }))
//! ```

mod component;
mod types;

pub use component::Component;
pub use types::*;

use crate::engine::{Node, SeedBuilder, SeedKind};
use crate::types::{NativeType, PLAIN_VALUE, Value};

/// Seed of a host primitive.
pub fn native(tag: &str) -> SeedBuilder {
    SeedBuilder::new(SeedKind::Native(NativeType::tag(tag)))
}

/// Seed grouping `children` in place.
pub fn fragment<I, N>(children: I) -> SeedBuilder
where
    I: IntoIterator<Item = N>,
    N: Into<Node>,
{
    SeedBuilder::new(SeedKind::Native(NativeType::Fragment)).children(children)
}

/// Literal leaf seed.
pub fn plain(value: impl Into<Value>) -> SeedBuilder {
    SeedBuilder::new(SeedKind::Native(NativeType::Plain)).prop(PLAIN_VALUE, value)
}
