//! Sibling list - the host order of a native element's children.
//!
//! Each native element keeps its children in an id-linked list
//! (`NativeState::first`, `Element::previous` / `next`) that mirrors the order
//! the host holds them in, as of the instructions emitted so far. Placement
//! decisions read it; every placement instruction updates it.

use tracing::trace;

use crate::engine::{ElementId, Instruction, Root};

impl Root {
    fn first_child(&self, parent: ElementId) -> Option<ElementId> {
        self.get(parent).native().and_then(|native| native.first)
    }

    fn set_first_child(&mut self, parent: ElementId, first: Option<ElementId>) {
        match self.get_mut(parent).native_mut() {
            Some(native) => native.first = first,
            None => panic!("custom element {parent:?} has no child list"),
        }
    }

    /// Link `id` right after `after`, or first when `after` is `None`.
    pub(crate) fn link_after(&mut self, parent: ElementId, id: ElementId, after: Option<ElementId>) {
        let next = match after {
            Some(after) => self.get(after).next,
            None => self.first_child(parent),
        };

        let element = self.get_mut(id);
        element.previous = after;
        element.next = next;

        match after {
            Some(after) => self.get_mut(after).next = Some(id),
            None => self.set_first_child(parent, Some(id)),
        }
        if let Some(next) = next {
            self.get_mut(next).previous = Some(id);
        }
    }

    /// Take `id` out of the list. A no-op for an element that was never linked.
    pub(crate) fn unlink(&mut self, parent: ElementId, id: ElementId) {
        let element = self.get_mut(id);
        let previous = element.previous.take();
        let next = element.next.take();

        match previous {
            Some(previous) => self.get_mut(previous).next = next,
            None => {
                if self.first_child(parent) == Some(id) {
                    self.set_first_child(parent, next);
                }
            }
        }
        if let Some(next) = next {
            self.get_mut(next).previous = previous;
        }
    }

    /// `new` takes the list position of `old`.
    pub(crate) fn swap_sibling(&mut self, parent: ElementId, old: ElementId, new: ElementId) {
        let previous = self.get(old).previous;
        self.unlink(parent, old);
        self.link_after(parent, new, previous);
    }

    /// Make `id` follow `cursor`, emitting a placement only when its current
    /// predecessor on the host differs from the cursor.
    pub(crate) fn relocate(&mut self, parent: ElementId, id: ElementId, cursor: Option<ElementId>) {
        let previous = self.get(id).previous;
        if self.host_of(previous) == self.host_of(cursor) {
            return;
        }

        trace!(?id, ?cursor, "move");
        self.unlink(parent, id);
        self.link_after(parent, id, cursor);

        let instruction = Instruction::PreinsertNode {
            parent: self.host(parent),
            previous: self.host_of(cursor),
            node: self.host(id),
        };
        self.emit(instruction);
    }

    /// Children in host order.
    pub(crate) fn sibling_order(&self, parent: ElementId) -> Vec<ElementId> {
        let mut order = Vec::new();
        let mut current = self.first_child(parent);
        while let Some(id) = current {
            order.push(id);
            current = self.get(id).next;
        }
        order
    }
}
