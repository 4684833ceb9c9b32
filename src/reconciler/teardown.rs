//! Teardown - destroying retained subtrees.
//!
//! `teardown` is post-order: the output (custom) or children (native) go
//! first, then the element's own effect cleanups run in slot order, its
//! queued tasks are dequeued and it leaves the arena.
//!
//! Teardown never emits the RemoveNode / ReplaceNode for the position it
//! frees. Whoever decided to free it emits that instruction, once.

use std::mem;

use tracing::trace;

use crate::engine::{ElementId, ElementKind, ElementState, Root};
use crate::hooks::HookSlot;

impl Root {
    /// Tear down `id` and everything below it.
    pub(crate) fn teardown(&mut self, id: ElementId) {
        let Some(element) = self.elements.get_mut(id) else {
            return;
        };
        element.state = ElementState::Detached;
        let evaluation = element.evaluation.take();

        let (below, hooks): (Vec<ElementId>, Vec<HookSlot>) = match &mut element.kind {
            ElementKind::Custom(custom) => (
                custom.output.take().into_iter().collect(),
                mem::take(&mut custom.hooks),
            ),
            ElementKind::Native(native) => {
                native.first = None;
                let results = mem::take(&mut native.results);
                (results.into_values().map(|r| r.element).collect(), Vec::new())
            }
        };

        if let Some(task) = evaluation {
            self.queue.dequeue(task);
        }
        for child in below {
            self.teardown(child);
        }

        for (slot, hook) in hooks.into_iter().enumerate() {
            let HookSlot::Effect(effect) = hook else {
                continue;
            };
            if let Some(task) = effect.pending {
                self.queue.dequeue(task);
            }
            if effect.in_flight {
                trace!(?id, slot, "setup still in flight, cleanup runs on completion");
            }
            if let Some(cleanup) = effect.teardown {
                cleanup();
            }
        }

        self.elements.remove(id);
        trace!(?id, "torn down");
    }

    /// Free the tree position `id` stands in, as a Teardown task does.
    ///
    /// A custom element's output cannot be removed on its own: the request is
    /// promoted to the outermost custom element owning the same position.
    pub(crate) fn remove_position(&mut self, id: ElementId) {
        if !self.contains(id) {
            return;
        }

        let mut position = id;
        while let Some(parent) = self.get(position).parent {
            if !self.get(parent).is_custom() {
                break;
            }
            position = parent;
        }
        if position != id {
            trace!(?id, ?position, "teardown promoted to owning custom element");
        }

        let Some(parent) = self.get(position).parent else {
            self.teardown(position);
            return;
        };
        if let Some(native) = self.get_mut(parent).native_mut() {
            native.results.retain(|_, record| record.element != position);
        }
        self.remove_child(parent, position);
    }
}
