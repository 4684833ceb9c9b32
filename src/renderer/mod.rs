//! Renderer - the host boundary.
//!
//! The reconciler never calls a host. Hosts implement [`Renderer`]; an
//! [`Applier`] drains a root's instruction buffer into it, resolving element
//! ids to host handles on the way.
//!
//! - [`Renderer`] - host operations on opaque handles
//! - [`Applier`] - element id → handle mapping, instruction dispatch
//! - [`MemoryRenderer`] - in-memory host tree, serializable to markup
//!
//! # Example
//!
//! ```ignore
//! let mut root = Root::new();
//! let host = MemoryRenderer::new();
//! let mount = host.root();
//! let mut applier = Applier::new(host, root.container(), mount);
//!
//! root.render(native("p").child("hi"))?;
//! applier.apply(root.take_instructions())?;
//! assert_eq!(applier.renderer().to_markup(), "<p>hi</p>");
//! ```

mod applier;
mod memory;

pub use applier::Applier;
pub use memory::{HostId, MemoryRenderer};

use crate::types::{NativeType, Value};

/// Host operations.
///
/// Placement is expressed with two primitives; [`preinsert_node`] combines
/// them the way instructions use them.
///
/// [`preinsert_node`]: Renderer::preinsert_node
pub trait Renderer {
    /// Host node handle.
    type Handle: Clone;

    fn create_node(&mut self, native_type: &NativeType) -> Self::Handle;

    /// Put `new` where `old` is and drop `old` with its subtree.
    fn replace_node(&mut self, old: &Self::Handle, new: &Self::Handle);

    /// Detach `old` from its parent and drop it with its subtree.
    fn remove_node(&mut self, old: &Self::Handle);

    /// Place `node` first in `parent`, moving it if it is placed elsewhere.
    fn prepend_node(&mut self, parent: &Self::Handle, node: &Self::Handle);

    /// Place `node` right after `previous` in `parent`, moving it if it is
    /// placed elsewhere.
    fn insert_after_node(&mut self, parent: &Self::Handle, previous: &Self::Handle, node: &Self::Handle);

    fn set_attribute(&mut self, target: &Self::Handle, name: &str, value: &Value);

    fn remove_attribute(&mut self, target: &Self::Handle, name: &str);

    /// Place `node` after `previous`, or first when there is none.
    fn preinsert_node(&mut self, parent: &Self::Handle, previous: Option<&Self::Handle>, node: &Self::Handle) {
        match previous {
            Some(previous) => self.insert_after_node(parent, previous, node),
            None => self.prepend_node(parent, node),
        }
    }
}
