//! Scheduled units of work.

use crate::engine::ElementId;

slotmap::new_key_type! {
    /// Handle of a queued task. Stale once the task ran or was discarded.
    pub struct TaskId;
}

/// A unit of work tied to one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    /// Re-run the element against its current seed.
    Evaluation(ElementId),
    /// Remove the element's position and tear its subtree down.
    Teardown(ElementId),
    /// Run the pending setup of one effect call site.
    Effect { element: ElementId, slot: usize },
}

impl Task {
    pub fn element(&self) -> ElementId {
        match *self {
            Task::Evaluation(element) | Task::Teardown(element) => element,
            Task::Effect { element, .. } => element,
        }
    }

    pub fn is_evaluation(&self) -> bool {
        matches!(self, Task::Evaluation(_))
    }
}
