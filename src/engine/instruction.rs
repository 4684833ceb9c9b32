//! Instructions - the ordered host edit log.
//!
//! The reconciler never talks to a host. It appends instructions to its
//! root's buffer; an [`Applier`](crate::renderer::Applier) later resolves the
//! element ids to host handles and drives a [`Renderer`](crate::Renderer).
//!
//! Every element id in an instruction names a native element: custom elements
//! are resolved to the native element that represents them before the
//! instruction is recorded. An instruction only references elements created by
//! earlier instructions (or the root container).

use std::rc::Rc;

use crate::types::{NativeType, Value};

use super::ElementId;

/// One host edit.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Create a host node for `node`.
    CreateNode { node: ElementId, native_type: NativeType },
    /// Put `new` where `old` is and drop `old`.
    ReplaceNode { old: ElementId, new: ElementId },
    /// Detach `old` from its parent and drop it.
    RemoveNode { old: ElementId },
    /// Place `node` right after `previous` in `parent`, or first when
    /// `previous` is `None`. Moves the node if it is already placed.
    PreinsertNode {
        parent: ElementId,
        previous: Option<ElementId>,
        node: ElementId,
    },
    SetAttribute {
        target: ElementId,
        name: Rc<str>,
        value: Value,
    },
    RemoveAttribute { target: ElementId, name: Rc<str> },
}

/// Discriminant of an [`Instruction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstructionKind {
    CreateNode,
    ReplaceNode,
    RemoveNode,
    PreinsertNode,
    SetAttribute,
    RemoveAttribute,
}

impl Instruction {
    pub fn kind(&self) -> InstructionKind {
        match self {
            Instruction::CreateNode { .. } => InstructionKind::CreateNode,
            Instruction::ReplaceNode { .. } => InstructionKind::ReplaceNode,
            Instruction::RemoveNode { .. } => InstructionKind::RemoveNode,
            Instruction::PreinsertNode { .. } => InstructionKind::PreinsertNode,
            Instruction::SetAttribute { .. } => InstructionKind::SetAttribute,
            Instruction::RemoveAttribute { .. } => InstructionKind::RemoveAttribute,
        }
    }
}

/// Count instructions of one kind.
pub fn count_kind(instructions: &[Instruction], kind: InstructionKind) -> usize {
    instructions.iter().filter(|i| i.kind() == kind).count()
}
