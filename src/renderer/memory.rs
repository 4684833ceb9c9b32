//! MemoryRenderer - an in-memory host tree.
//!
//! Reference host for tests and headless use. Nodes live in a slotmap; every
//! operation keeps parent/children links consistent, and [`to_markup`]
//! serializes the mounted tree:
//!
//! ```text
//! Tag       → <tag name="value">children</tag>
//! Plain     → the literal (None renders nothing)
//! Fragment  → children, inline
//! Container → children, inline
//! ```
//!
//! [`to_markup`]: MemoryRenderer::to_markup

use std::fmt::Write;
use std::rc::Rc;

use indexmap::IndexMap;
use slotmap::SlotMap;

use crate::types::{NativeType, PLAIN_VALUE, Value};

use super::Renderer;

slotmap::new_key_type! {
    /// Handle of a [`MemoryRenderer`] node.
    pub struct HostId;
}

struct HostNode {
    native_type: NativeType,
    attributes: IndexMap<Rc<str>, Value>,
    children: Vec<HostId>,
    parent: Option<HostId>,
}

impl HostNode {
    fn new(native_type: NativeType) -> Self {
        Self {
            native_type,
            attributes: IndexMap::new(),
            children: Vec::new(),
            parent: None,
        }
    }
}

/// In-memory host.
pub struct MemoryRenderer {
    nodes: SlotMap<HostId, HostNode>,
    root: HostId,
}

impl MemoryRenderer {
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(HostNode::new(NativeType::Container));
        Self { nodes, root }
    }

    /// The mount point.
    pub fn root(&self) -> HostId {
        self.root
    }

    /// Live nodes, the mount point included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, id: HostId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn native_type(&self, id: HostId) -> Option<&NativeType> {
        self.nodes.get(id).map(|node| &node.native_type)
    }

    pub fn children(&self, id: HostId) -> &[HostId] {
        self.nodes.get(id).map_or(&[][..], |node| node.children.as_slice())
    }

    pub fn parent(&self, id: HostId) -> Option<HostId> {
        self.nodes.get(id).and_then(|node| node.parent)
    }

    pub fn attribute(&self, id: HostId, name: &str) -> Option<&Value> {
        self.nodes.get(id).and_then(|node| node.attributes.get(name))
    }

    /// Serialize everything under the mount point.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for &child in self.children(self.root) {
            self.write_markup(child, &mut out);
        }
        out
    }

    /// Serialize one subtree.
    pub fn markup_of(&self, id: HostId) -> String {
        let mut out = String::new();
        self.write_markup(id, &mut out);
        out
    }

    fn write_markup(&self, id: HostId, out: &mut String) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        match &node.native_type {
            NativeType::Plain => {
                if let Some(value) = node.attributes.get(PLAIN_VALUE) {
                    let _ = write!(out, "{value}");
                }
            }
            NativeType::Fragment | NativeType::Container => {
                for &child in &node.children {
                    self.write_markup(child, out);
                }
            }
            NativeType::Tag(tag) => {
                let _ = write!(out, "<{tag}");
                for (name, value) in &node.attributes {
                    let _ = write!(out, " {name}=\"{value}\"");
                }
                out.push('>');
                for &child in &node.children {
                    self.write_markup(child, out);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }

    /// Unhook `id` from its parent's child list.
    fn detach(&mut self, id: HostId) {
        let Some(parent) = self.nodes.get_mut(id).and_then(|node| node.parent.take()) else {
            return;
        };
        if let Some(parent) = self.nodes.get_mut(parent) {
            parent.children.retain(|&child| child != id);
        }
    }

    /// Drop `id` and every node below it.
    fn drop_subtree(&mut self, id: HostId) {
        if let Some(node) = self.nodes.remove(id) {
            for child in node.children {
                self.drop_subtree(child);
            }
        }
    }

    fn insert_at(&mut self, parent: HostId, index: usize, node: HostId) {
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            let index = index.min(parent_node.children.len());
            parent_node.children.insert(index, node);
        }
        if let Some(child) = self.nodes.get_mut(node) {
            child.parent = Some(parent);
        }
    }
}

impl Default for MemoryRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for MemoryRenderer {
    type Handle = HostId;

    fn create_node(&mut self, native_type: &NativeType) -> HostId {
        self.nodes.insert(HostNode::new(native_type.clone()))
    }

    fn replace_node(&mut self, old: &HostId, new: &HostId) {
        self.detach(*new);
        if let Some(parent) = self.parent(*old) {
            let index = self.children(parent).iter().position(|c| c == old);
            self.detach(*old);
            if let Some(index) = index {
                self.insert_at(parent, index, *new);
            }
        }
        self.drop_subtree(*old);
    }

    fn remove_node(&mut self, old: &HostId) {
        self.detach(*old);
        self.drop_subtree(*old);
    }

    fn prepend_node(&mut self, parent: &HostId, node: &HostId) {
        self.detach(*node);
        self.insert_at(*parent, 0, *node);
    }

    fn insert_after_node(&mut self, parent: &HostId, previous: &HostId, node: &HostId) {
        self.detach(*node);
        let index = self
            .children(*parent)
            .iter()
            .position(|c| c == previous)
            .map_or(0, |i| i + 1);
        self.insert_at(*parent, index, *node);
    }

    fn set_attribute(&mut self, target: &HostId, name: &str, value: &Value) {
        if let Some(node) = self.nodes.get_mut(*target) {
            node.attributes.insert(Rc::from(name), value.clone());
        }
    }

    fn remove_attribute(&mut self, target: &HostId, name: &str) {
        if let Some(node) = self.nodes.get_mut(*target) {
            node.attributes.shift_remove(name);
        }
    }
}
