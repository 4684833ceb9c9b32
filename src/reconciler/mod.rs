//! Reconciler - turns seeds into instructions against the retained tree.
//!
//! `evaluate` is the recursive entry point. It dispatches on the element kind:
//!
//! - **Custom**: bail out when nothing changed, otherwise render and reconcile
//!   the single output element (mount / update in place / replace)
//! - **Native**: create the host node on first attach, diff attributes when the
//!   props changed, reconcile children when the child list changed
//!
//! Children reconciliation lives in `children`, the host-order sibling list
//! in `siblings`, subtree destruction in `teardown`.
//!
//! # Evaluation context
//!
//! Every evaluation names the parent it happens under. An element is bound to
//! the first parent that evaluates it and can never move to another one.

mod children;
mod siblings;
mod teardown;

use std::mem;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::trace;

use crate::engine::{
    CustomState, Element, ElementId, ElementState, Instruction, Root, Seed, SeedKind,
    same_children,
};
use crate::error::{Error, Result};
use crate::hooks::{EffectRequest, Scope};
use crate::scheduler::{Priority, Task};
use crate::types::{Props, Value};

impl Root {
    /// Re-evaluate an element in its own parent context.
    ///
    /// A custom element that is attached, clean, and whose seed did not change
    /// bails out without rendering. Unknown ids are ignored.
    pub fn evaluate(&mut self, id: ElementId) -> Result<()> {
        let Some(element) = self.elements.get(id) else {
            return Ok(());
        };
        if id == self.container() {
            return Ok(());
        }

        let parent = element.parent;
        self.evaluate_in(parent, id)?;
        self.propagate_host(id);
        Ok(())
    }

    /// Evaluate `id` under `parent`.
    pub(crate) fn evaluate_in(&mut self, parent: Option<ElementId>, id: ElementId) -> Result<()> {
        let Some(parent) = parent else {
            return Err(Error::InvalidEvaluation { element: id });
        };

        let element = self.get_mut(id);
        match element.parent {
            Some(owner) if owner != parent => {
                return Err(Error::InvalidMultimount { element: id, owner });
            }
            _ => element.parent = Some(parent),
        }
        if element.is_detached() {
            trace!(?id, "skip detached element");
            return Ok(());
        }

        if element.is_custom() {
            self.evaluate_custom(id)?;
        } else {
            self.evaluate_native(id)?;
        }

        let element = self.get_mut(id);
        element.props = Some(element.seed.props().clone());
        element.children = Some(element.seed.children().clone());
        element.state = ElementState::Attached;
        if let Some(task) = element.evaluation.take() {
            self.queue.dequeue(task);
        }
        Ok(())
    }

    pub(crate) fn create_element(&mut self, seed: Rc<Seed>) -> ElementId {
        self.elements.insert(Element::new(seed))
    }

    /// Host node of an evaluated element.
    pub(crate) fn host(&self, id: ElementId) -> ElementId {
        match self.get(id).host {
            Some(host) => host,
            None => panic!("element {id:?} has no host node"),
        }
    }

    /// A custom element stands for its output on the host. After the output
    /// of `id` changed outside a parent pass, refresh the custom ancestors
    /// that stand for it.
    pub(crate) fn propagate_host(&mut self, id: ElementId) {
        let host = self.get(id).host;
        let mut current = id;
        while let Some(parent) = self.get(current).parent {
            let parent_element = self.get_mut(parent);
            if !parent_element.is_custom() {
                break;
            }
            parent_element.host = host;
            current = parent;
        }
    }

    // =========================================================================
    // Custom
    // =========================================================================

    fn evaluate_custom(&mut self, id: ElementId) -> Result<()> {
        let element = self.get(id);
        let seed = element.seed.clone();
        let component = match seed.kind() {
            SeedKind::Custom(component) => component.clone(),
            SeedKind::Native(native_type) => {
                panic!("custom element {id:?} carries a {native_type} seed")
            }
        };

        let unchanged = element.state == ElementState::Attached
            && element.output().is_some()
            && element
                .props
                .as_ref()
                .is_some_and(|p| Rc::ptr_eq(p, seed.props()) || p.shallow_eq(seed.props()))
            && element
                .children
                .as_ref()
                .is_some_and(|c| same_children(c, seed.children()));
        if unchanged {
            trace!(?id, component = component.name(), "bail out");
            return Ok(());
        }

        // Render with the hook storage lent to the scope.
        let attached = element.is_attached();
        let mut hooks = mem::take(&mut self.custom_state(id).hooks);
        let (output, outcome) = {
            let mut scope = Scope::new(id, attached, &mut hooks, &self.inbox, &self.config);
            let output = component.render(&mut scope, seed.props(), seed.children());
            (output, scope.finish())
        };
        self.custom_state(id).hooks = hooks;
        trace!(?id, component = component.name(), "rendered");

        if let Some(error) = outcome.error {
            return Err(error);
        }

        let next = output.to_seed();
        let previous = self.custom_state(id).output;
        match previous {
            None => {
                let new = self.create_element(next);
                self.custom_state(id).output = Some(new);
                self.evaluate_in(Some(id), new)?;
            }
            Some(old) if self.get(old).is_detached() || !self.get(old).seed.same_type(&next) => {
                let new = self.create_element(next);
                self.custom_state(id).output = Some(new);
                self.evaluate_in(Some(id), new)?;

                let (old_host, new_host) = (self.host(old), self.host(new));
                self.teardown(old);
                self.emit(Instruction::ReplaceNode {
                    old: old_host,
                    new: new_host,
                });
            }
            Some(old) => {
                self.get_mut(old).seed = next;
                self.evaluate_in(Some(id), old)?;
            }
        }

        let output = self.custom_state(id).output;
        let host = self.host_of(output);
        self.get_mut(id).host = host;

        for request in outcome.requests {
            self.request_effect(id, request)?;
        }
        Ok(())
    }

    fn custom_state(&mut self, id: ElementId) -> &mut CustomState {
        match self.get_mut(id).custom_mut() {
            Some(custom) => custom,
            None => panic!("element {id:?} is not custom"),
        }
    }

    /// Hand a render's effect request to the scheduler.
    fn request_effect(&mut self, id: ElementId, request: EffectRequest) -> Result<()> {
        if request.priority == Priority::Disabled {
            return Ok(());
        }

        let EffectRequest {
            slot,
            priority,
            run,
        } = request;
        match self.effect_slot_mut(id, slot) {
            Some(effect) => effect.next_run = Some(run),
            None => return Ok(()),
        }
        self.schedule(Task::Effect { element: id, slot }, priority)?;
        Ok(())
    }

    // =========================================================================
    // Native
    // =========================================================================

    fn evaluate_native(&mut self, id: ElementId) -> Result<()> {
        let element = self.get_mut(id);
        let seed = element.seed.clone();

        if element.state == ElementState::Default {
            element.host = Some(id);
            let native_type = match seed.native_type() {
                Some(native_type) => native_type.clone(),
                None => panic!("native element {id:?} carries a custom seed"),
            };
            self.emit(Instruction::CreateNode {
                node: id,
                native_type,
            });
        }

        let element = self.get(id);
        if !element.props.as_ref().is_some_and(|p| Rc::ptr_eq(p, seed.props())) {
            self.diff_attributes(id, seed.props());
        }

        let element = self.get(id);
        if !element
            .children
            .as_ref()
            .is_some_and(|c| Rc::ptr_eq(c, seed.children()))
        {
            self.reconcile_children(id, seed.children())?;
        }
        Ok(())
    }

    /// Emit the attribute edits turning the cached attributes into `props`.
    fn diff_attributes(&mut self, id: ElementId, props: &Props) {
        let Some(native) = self.get_mut(id).native_mut() else {
            return;
        };

        let mut previous = mem::take(&mut native.attributes);
        let mut current: IndexMap<Rc<str>, Value> = IndexMap::with_capacity(props.len());
        let mut edits = Vec::new();

        for (name, value) in props.iter() {
            match previous.shift_remove(name) {
                Some(cached) if cached.same(value) => {}
                _ => edits.push(Instruction::SetAttribute {
                    target: id,
                    name: name.clone(),
                    value: value.clone(),
                }),
            }
            current.insert(name.clone(), value.clone());
        }
        for (name, _) in previous {
            edits.push(Instruction::RemoveAttribute { target: id, name });
        }

        native.attributes = current;
        for edit in edits {
            self.emit(edit);
        }
    }
}
