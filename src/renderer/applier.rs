//! Applier - drives a [`Renderer`] from a root's instructions.

use slotmap::SecondaryMap;
use tracing::trace;

use crate::engine::{ElementId, Instruction, Root};
use crate::error::ApplyError;

use super::Renderer;

/// Maps element ids to host handles and applies instructions in order.
pub struct Applier<R: Renderer> {
    renderer: R,
    handles: SecondaryMap<ElementId, R::Handle>,
}

impl<R: Renderer> Applier<R> {
    /// `container` (from [`Root::container`]) is bound to the host's mount
    /// point `mount`.
    pub fn new(renderer: R, container: ElementId, mount: R::Handle) -> Self {
        let mut handles = SecondaryMap::new();
        handles.insert(container, mount);
        Self { renderer, handles }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    /// Host handle of an element.
    pub fn handle(&self, id: ElementId) -> Option<&R::Handle> {
        self.handles.get(id)
    }

    fn resolve(&self, id: ElementId) -> Result<R::Handle, ApplyError> {
        self.handles.get(id).cloned().ok_or(ApplyError::UnknownElement(id))
    }

    /// Apply instructions in order. Returns how many were applied.
    ///
    /// Stops at the first instruction naming an element that was never
    /// created; the ones before it stay applied.
    pub fn apply<I>(&mut self, instructions: I) -> Result<usize, ApplyError>
    where
        I: IntoIterator<Item = Instruction>,
    {
        let mut applied = 0;
        for instruction in instructions {
            self.apply_one(&instruction)?;
            applied += 1;
        }
        Ok(applied)
    }

    pub fn apply_one(&mut self, instruction: &Instruction) -> Result<(), ApplyError> {
        trace!(?instruction, "apply");
        match instruction {
            Instruction::CreateNode { node, native_type } => {
                let handle = self.renderer.create_node(native_type);
                self.handles.insert(*node, handle);
            }
            Instruction::ReplaceNode { old, new } => {
                let (old_handle, new_handle) = (self.resolve(*old)?, self.resolve(*new)?);
                self.renderer.replace_node(&old_handle, &new_handle);
                self.handles.remove(*old);
            }
            Instruction::RemoveNode { old } => {
                let handle = self.resolve(*old)?;
                self.renderer.remove_node(&handle);
                self.handles.remove(*old);
            }
            Instruction::PreinsertNode {
                parent,
                previous,
                node,
            } => {
                let parent = self.resolve(*parent)?;
                let previous = previous.map(|id| self.resolve(id)).transpose()?;
                let node = self.resolve(*node)?;
                self.renderer.preinsert_node(&parent, previous.as_ref(), &node);
            }
            Instruction::SetAttribute {
                target,
                name,
                value,
            } => {
                let target = self.resolve(*target)?;
                self.renderer.set_attribute(&target, name, value);
            }
            Instruction::RemoveAttribute { target, name } => {
                let target = self.resolve(*target)?;
                self.renderer.remove_attribute(&target, name);
            }
        }
        Ok(())
    }

    /// Forget handles of elements `root` no longer retains (descendants of
    /// removed nodes). Returns how many were dropped.
    pub fn retain_live(&mut self, root: &Root) -> usize {
        let before = self.handles.len();
        self.handles.retain(|id, _| root.contains(id));
        before - self.handles.len()
    }

    /// Handles currently tracked, the container included.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
